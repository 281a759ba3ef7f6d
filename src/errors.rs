use serde::Serialize;

/// Errors surfaced by the inventory services and stores.
///
/// The conversion and reconciliation core never produces one of these; stale
/// catalog references and unit drift are absorbed there as defined behavior.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl ServiceError {
    pub fn store_error<E: std::fmt::Display>(err: E) -> Self {
        ServiceError::StoreError(err.to_string())
    }

    /// Whether the failure was caused by caller-supplied data rather than
    /// the backing store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_)
                | ServiceError::ValidationError(_)
                | ServiceError::InvalidInput(_)
                | ServiceError::Conflict(_)
        )
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::StoreError(err.to_string())
    }
}
