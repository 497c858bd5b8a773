// Dashboard domain errors
use thiserror::Error;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Unknown scan policy or filter type, zero-sized panel, wrongly shaped filter value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// One of the JSON-encoded string fields of the document did not parse.
    #[error("malformed {field}: {source}")]
    MalformedJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl DashboardError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn malformed(field: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::MalformedJson { field, source }
    }
}
