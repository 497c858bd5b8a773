// Domain layer - Dashboard documents and the panel grid
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod grid;
pub mod panel;
pub mod placement;
pub mod saved_object;
