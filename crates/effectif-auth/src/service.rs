use std::sync::Arc;

use effectif_proto::AuthorizedUser;
use tracing::{error, info, warn};

use crate::directory::UserDirectory;
use crate::error::AuthError;
use crate::session::Session;
use crate::storage::SessionStorage;

/// Authentication and session lifecycle
#[derive(Clone)]
pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    storage: Arc<dyn SessionStorage>,
}

impl AuthService {
    pub fn new(directory: Arc<dyn UserDirectory>, storage: Arc<dyn SessionStorage>) -> Self {
        Self { directory, storage }
    }

    /// Resolve a matricule into a session and persist it
    ///
    /// Blank identifiers are rejected without contacting the backend.
    pub async fn authenticate(&self, identifier: &str) -> Result<Session, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AuthError::MissingIdentifier);
        }

        let user = self.directory.find_user(identifier).await.map_err(|e| {
            let err = AuthError::from(e);
            match &err {
                AuthError::UserNotFound(_) => warn!("Login refused for {}: {}", identifier, err),
                _ => error!("Login failed for {}: {}", identifier, err),
            }
            err
        })?;

        let session = Session::new(user);
        self.storage.save(&session)?;

        info!("Authenticated {}", session.matricule());
        Ok(session)
    }

    /// True when a readable session is stored
    pub fn is_authenticated(&self) -> bool {
        match self.storage.load() {
            Ok(session) => session.is_some(),
            Err(e) => {
                warn!("Ignoring unreadable session: {}", e);
                false
            }
        }
    }

    pub fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.storage.load()?)
    }

    pub fn current_user(&self) -> Result<Option<AuthorizedUser>, AuthError> {
        Ok(self.current_session()?.map(|s| s.user().clone()))
    }

    /// End a session; the stored record is removed
    pub fn logout(&self, session: Session) -> Result<(), AuthError> {
        self.storage.clear()?;
        info!("Logged out {}", session.matricule());
        Ok(())
    }

    /// Remove whatever session is stored, even an unreadable one
    pub fn forget(&self) -> Result<(), AuthError> {
        self.storage.clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MockUserDirectory;
    use crate::storage::MemorySessionStorage;
    use effectif_client::ApiError;
    use effectif_proto::Habilitation;

    fn service(directory: MockUserDirectory) -> (AuthService, Arc<MemorySessionStorage>) {
        let storage = Arc::new(MemorySessionStorage::new());
        (
            AuthService::new(Arc::new(directory), storage.clone()),
            storage,
        )
    }

    #[tokio::test]
    async fn test_empty_identifier_never_reaches_backend() {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_user().times(0);
        let (auth, _) = service(directory);

        for input in ["", "   "] {
            let err = auth.authenticate(input).await.unwrap_err();
            assert!(matches!(err, AuthError::MissingIdentifier));
        }
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_successful_login_persists_session() {
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_user()
            .withf(|m| m.to_string() == "EMP12345")
            .times(1)
            .returning(|m| {
                Ok(AuthorizedUser {
                    matricule: m.to_string(),
                    habilitations: vec![Habilitation::new("ADMIN")],
                })
            });
        let (auth, storage) = service(directory);

        let session = auth.authenticate(" EMP12345 ").await.unwrap();
        assert_eq!(session.matricule(), "EMP12345");
        assert!(auth.is_authenticated());
        assert_eq!(storage.load().unwrap(), Some(session.clone()));
        assert!(auth.current_user().unwrap().unwrap().has_habilitation("ADMIN"));

        auth.logout(session).unwrap();
        assert!(!auth.is_authenticated());
        assert!(auth.current_user().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_user().times(1).returning(|m| {
            Err(ApiError::NotFound {
                resource: "utilisateur",
                key: m.to_string(),
            })
        });
        let (auth, _) = service(directory);

        let err = auth.authenticate("EMP00000").await.unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound(ref m) if m == "EMP00000"));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_backend_failure_stores_no_session() {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_user().returning(|_| {
            Err(ApiError::Status {
                resource: "utilisateur",
                status: 503,
            })
        });
        let (auth, _) = service(directory);

        let err = auth.authenticate("EMP12345").await.unwrap_err();
        assert!(matches!(err, AuthError::Backend(_)));
        assert!(auth.current_session().unwrap().is_none());
    }
}
