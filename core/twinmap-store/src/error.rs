//! Error types for the store boundary and the repository layer.

use thiserror::Error;
use twinmap_model::MappingError;

/// Result type for raw store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A failure reported by a twin store, shaped like an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct StoreError {
    pub status: u16,
    pub message: String,
}

impl StoreError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(409, message)
    }
}

/// Errors surfaced by [`TwinRepository`](crate::TwinRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The value could not be mapped to or from a property bag.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The store rejected a call. `operation` names the repository
    /// operation that issued it.
    #[error("{operation} failed: {status}: {message}")]
    StoreOperationFailed {
        operation: &'static str,
        status: u16,
        message: String,
    },

    /// A model document could not be read.
    #[error("invalid model document: {0}")]
    InvalidModel(String),
}

/// Wraps raw store failures with the repository operation that hit them.
pub(crate) trait StoreResultExt<T> {
    fn during(self, operation: &'static str) -> RepositoryResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn during(self, operation: &'static str) -> RepositoryResult<T> {
        self.map_err(|e| RepositoryError::StoreOperationFailed {
            operation,
            status: e.status,
            message: e.message,
        })
    }
}
