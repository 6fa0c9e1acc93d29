//! User service
//!
//! A user is composed from two backend resources: `/utilisateurs` (matricule and
//! permission codes) and `/personnes` (the human name). Both are fetched and joined on
//! matricule == identifiant. Any failed fetch aborts the whole operation.

use effectif_proto::wire::{ApiPersonne, ApiUtilisateur, SaveUtilisateurBody};
use effectif_proto::{join_user, AuthorizedUser, User, WireMapping};
use reqwest::Method;
use tracing::{debug, info};

use crate::client::{report, ApiClient};
use crate::error::ApiError;

const RESOURCE: &str = "utilisateur";
const PERSONNE_RESOURCE: &str = "personne";

pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        let utilisateurs: Vec<ApiUtilisateur> = self
            .client
            .get_json(RESOURCE, &["utilisateurs"], None)
            .await
            .map_err(report("Failed to list utilisateurs".to_string()))?;

        let personnes: Vec<ApiPersonne> = self
            .client
            .get_json(PERSONNE_RESOURCE, &["personnes"], None)
            .await
            .map_err(report("Failed to list personnes for users".to_string()))?;

        Ok(utilisateurs
            .into_iter()
            .map(|u| join_user(u, &personnes))
            .collect())
    }

    /// Fetch one user; a missing personne yields placeholder names
    pub async fn get_by_key(&self, matricule: &str) -> Result<User, ApiError> {
        let utilisateur = self.fetch_utilisateur(matricule).await?;

        let personnes: Vec<ApiPersonne> = match self
            .client
            .get_json(
                PERSONNE_RESOURCE,
                &["personnes", matricule],
                Some(matricule),
            )
            .await
        {
            Ok(personne) => vec![personne],
            Err(err) if err.is_not_found() => {
                debug!("No personne for user {}", matricule);
                Vec::new()
            }
            Err(err) => {
                return Err(report(format!("Failed to fetch personne for user {}", matricule))(
                    err,
                ))
            }
        };

        Ok(join_user(utilisateur, &personnes))
    }

    /// Authorization record only (matricule + permissions)
    pub async fn get_authorization(&self, matricule: &str) -> Result<AuthorizedUser, ApiError> {
        let utilisateur = self.fetch_utilisateur(matricule).await?;
        Ok(AuthorizedUser::to_domain(utilisateur))
    }

    /// Create or update a user, then return the refreshed full list
    ///
    /// An existence probe decides between PUT and POST. Permissions are sent as codes.
    pub async fn save(&self, user: &User) -> Result<Vec<User>, ApiError> {
        let path = ["utilisateurs", user.matricule.as_str()];
        let probe: Result<ApiUtilisateur, ApiError> = self
            .client
            .get_json(RESOURCE, &path, Some(&user.matricule))
            .await;

        match probe {
            Ok(_) => {
                self.client
                    .send_json(
                        Method::PUT,
                        RESOURCE,
                        &path,
                        Some(&user.matricule),
                        &SaveUtilisateurBody::update(user),
                    )
                    .await
                    .map_err(report(format!("Failed to update user {}", user.matricule)))?;
                info!("Updated user {}", user.matricule);
            }
            Err(err) if err.is_not_found() => {
                self.client
                    .send_json(
                        Method::POST,
                        RESOURCE,
                        &["utilisateurs"],
                        None,
                        &SaveUtilisateurBody::create(user),
                    )
                    .await
                    .map_err(report(format!("Failed to create user {}", user.matricule)))?;
                info!("Created user {}", user.matricule);
            }
            Err(err) => {
                return Err(report(format!("Failed to check user {}", user.matricule))(
                    err,
                ))
            }
        }

        self.list().await
    }

    pub async fn delete(&self, matricule: &str) -> Result<(), ApiError> {
        self.client
            .delete(RESOURCE, &["utilisateurs", matricule], matricule)
            .await
            .map_err(report(format!("Failed to delete user {}", matricule)))?;

        info!("Deleted user {}", matricule);
        Ok(())
    }

    async fn fetch_utilisateur(&self, matricule: &str) -> Result<ApiUtilisateur, ApiError> {
        self.client
            .get_json(
                RESOURCE,
                &["utilisateurs", matricule],
                Some(matricule),
            )
            .await
            .map_err(report(format!("Failed to fetch user {}", matricule)))
    }
}
