// Object store trait - the saved object collaborator dashboards are loaded from and saved to
use crate::domain::saved_object::SavedObject;
use async_stream::try_stream;
use async_trait::async_trait;
use futures::stream::Stream;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_SPACE: &str = "default";
pub const DEFAULT_PER_PAGE: usize = 100;
pub const DEFAULT_MAX_PAGES: usize = 100;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("too many requests: {0}")]
    TooManyRequests(String),

    #[error("api error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl StoreError {
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }
}

/// Parameters of a paginated search. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindQuery {
    pub kind: Option<String>,
    pub search: Option<String>,
    pub search_fields: Vec<String>,
    pub sort_field: Option<String>,
    pub per_page: usize,
    pub page: usize,
}

impl FindQuery {
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }
}

impl Default for FindQuery {
    fn default() -> Self {
        Self {
            kind: None,
            search: None,
            search_fields: Vec::new(),
            sort_field: None,
            per_page: DEFAULT_PER_PAGE,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindResponse {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    #[serde(default)]
    pub saved_objects: Vec<SavedObject>,
}

/// Saved object persistence, scoped by space. `None` means the default space.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, space: Option<&str>, kind: &str, id: &str) -> StoreResult<SavedObject>;

    /// Creates `object`, generating an id when it has none. With `overwrite`
    /// an existing object with the same id is replaced instead of conflicting.
    async fn create(&self, space: Option<&str>, object: &SavedObject, overwrite: bool) -> StoreResult<SavedObject>;

    /// Replaces attributes and references of an existing object.
    async fn update(&self, space: Option<&str>, object: &SavedObject) -> StoreResult<SavedObject>;

    async fn delete(&self, space: Option<&str>, kind: &str, id: &str) -> StoreResult<()>;

    async fn find(&self, space: Option<&str>, query: &FindQuery) -> StoreResult<FindResponse>;

    async fn exists(&self, space: Option<&str>, kind: &str, id: &str) -> StoreResult<bool> {
        match self.get(space, kind, id).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Pages through `query` starting at page 1 until a page comes back empty or
/// `max_pages` pages were read.
pub fn find_pages(
    store: Arc<dyn ObjectStore>,
    space: Option<String>,
    query: FindQuery,
    max_pages: usize,
) -> impl Stream<Item = StoreResult<FindResponse>> {
    try_stream! {
        for page in 1..=max_pages {
            let request = FindQuery { page, ..query.clone() };
            let response = store.find(space.as_deref(), &request).await?;
            if response.saved_objects.is_empty() {
                break;
            }
            tracing::debug!("fetched page {} with {} objects of {}", page, response.saved_objects.len(), response.total);
            yield response;
        }
    }
}
