use effectif_client::ApiError;
use thiserror::Error;

/// Session persistence errors
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Failed to access session file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Corrupted session record: {0}")]
    Corrupted(String),

    #[error("Failed to locate home directory")]
    NoHomeDirectory,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected before any backend call
    #[error("An identifier is required")]
    MissingIdentifier,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Authentication failed: {0}")]
    Backend(#[source] ApiError),

    #[error(transparent)]
    Storage(#[from] SessionStoreError),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound { key, .. } => AuthError::UserNotFound(key),
            other => AuthError::Backend(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_user_not_found() {
        let err: AuthError = ApiError::NotFound {
            resource: "utilisateur",
            key: "EMP1".to_string(),
        }
        .into();
        assert!(matches!(err, AuthError::UserNotFound(ref m) if m == "EMP1"));
        assert_eq!(err.to_string(), "User not found: EMP1");
    }

    #[test]
    fn test_other_status_stays_backend_error() {
        let err: AuthError = ApiError::Status {
            resource: "utilisateur",
            status: 500,
        }
        .into();
        assert!(matches!(err, AuthError::Backend(_)));
        assert_eq!(err.to_string(), "Authentication failed: API error 500");
    }
}
