use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed collection file {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("Record '{key}' not found")]
    NotFound { key: String },

    #[error("Invalid record key: {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
