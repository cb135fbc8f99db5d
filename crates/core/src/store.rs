//! Errors surfaced by the persistence traits the db crate implements.

use restoboost_shared::AppError;
use thiserror::Error;

/// Failure reported by a datastore collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The datastore could not be reached or rejected the query.
    #[error("datastore unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// The venue quota trigger rejected the insert.
    #[error("venue quota exceeded: {0}")]
    QuotaViolation(String),
}

impl StoreError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::UpstreamUnavailable(msg),
            StoreError::UniqueViolation(msg) => Self::Conflict(msg),
            StoreError::QuotaViolation(msg) => Self::QuotaExceeded(msg),
        }
    }
}
