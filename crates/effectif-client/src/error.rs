//! Backend client errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A by-key lookup, update or delete targeted a key the backend does not know
    #[error("{resource} '{key}' not found")]
    NotFound { resource: &'static str, key: String },

    /// Any other non-2xx response
    #[error("API error {status}")]
    Status { resource: &'static str, status: u16 },

    #[error("Failed to reach backend: {0}")]
    Transport(String),

    #[error("Invalid response from backend: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
