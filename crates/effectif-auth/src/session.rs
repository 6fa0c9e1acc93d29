use chrono::{DateTime, Utc};
use effectif_proto::AuthorizedUser;
use serde::{Deserialize, Serialize};

/// Authenticated session
///
/// Only [`crate::AuthService`] creates sessions; everyone else reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user: AuthorizedUser,
    authenticated_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(user: AuthorizedUser) -> Self {
        Self {
            user,
            authenticated_at: Utc::now(),
        }
    }

    pub fn user(&self) -> &AuthorizedUser {
        &self.user
    }

    pub fn matricule(&self) -> &str {
        &self.user.matricule
    }

    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }

    pub fn has_habilitation(&self, code: &str) -> bool {
        self.user.has_habilitation(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effectif_proto::Habilitation;

    #[test]
    fn test_session_serialization() {
        let session = Session::new(AuthorizedUser {
            matricule: "EMP12345".to_string(),
            habilitations: vec![Habilitation::new("ADMIN")],
        });

        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, session);
        assert_eq!(parsed.matricule(), "EMP12345");
        assert!(parsed.has_habilitation("ADMIN"));
    }
}
