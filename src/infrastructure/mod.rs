// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod memory_store;
pub mod saved_objects_http;
