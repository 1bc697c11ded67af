use crate::request::RequestStatus;
use thiserror::Error;

/// Unified error taxonomy for the engagement core.
///
/// Every operation checks its invariants before mutating anything, so a
/// returned error always means stored state is unchanged. Callers translate
/// these into user-facing messages; the core never downgrades an error into
/// a default value.
#[derive(Debug, Error)]
pub enum EngageError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation '{operation}' is not allowed while status is '{status}'")]
    InvalidState {
        operation: String,
        status: RequestStatus,
    },

    #[error("Confirmation token has expired")]
    ExpiredToken,

    #[error("Concurrent modification detected: {0}")]
    ConcurrencyConflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl EngageError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} '{id}'"))
    }

    pub fn invalid_state(operation: &str, status: RequestStatus) -> Self {
        Self::InvalidState {
            operation: operation.to_string(),
            status,
        }
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}
