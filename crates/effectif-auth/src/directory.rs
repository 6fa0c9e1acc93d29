//! Lookup of authorization records

use async_trait::async_trait;
use effectif_client::{ApiError, UserService};
use effectif_proto::AuthorizedUser;

/// Source of authorization records keyed by matricule
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, matricule: &str) -> Result<AuthorizedUser, ApiError>;
}

#[async_trait]
impl UserDirectory for UserService {
    async fn find_user(&self, matricule: &str) -> Result<AuthorizedUser, ApiError> {
        self.get_authorization(matricule).await
    }
}
