// Client library for dashboard saved objects - grid layout, filters, tags and storage
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::dashboard_service::DashboardService;
pub use application::object_store::{find_pages, FindQuery, FindResponse, ObjectStore, StoreError, StoreResult};
pub use domain::dashboard::{Dashboard, NewPanel};
pub use domain::error::{DashboardError, DashboardResult};
pub use domain::filter::{FilterKind, FilterSpec};
pub use domain::grid::{GridMatrix, GRID_WIDTH, MAX_GRID_HEIGHT};
pub use domain::panel::Panel;
pub use domain::placement::{find_coordinates, ScanPolicy};
pub use domain::saved_object::{Reference, SavedObject};
pub use infrastructure::config::{load_client_config, ClientConfig};
pub use infrastructure::memory_store::InMemoryObjectStore;
pub use infrastructure::saved_objects_http::SavedObjectsHttpStore;
