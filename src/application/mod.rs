// Application layer - Use cases over the object store
pub mod dashboard_service;
pub mod object_store;
