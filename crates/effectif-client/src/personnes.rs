//! Personne (`/personnes`) service

use effectif_proto::wire::{ApiPersonne, CreatePersonneBody, UpdatePersonneBody};
use effectif_proto::{NewPersonne, Personne, PersonneUpdate, WireMapping};
use tracing::info;

use crate::client::{report, ApiClient};
use crate::error::ApiError;

const RESOURCE: &str = "personne";

pub struct PersonneService {
    client: ApiClient,
}

impl PersonneService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Personne>, ApiError> {
        let personnes: Vec<ApiPersonne> = self
            .client
            .get_json(RESOURCE, &["personnes"], None)
            .await
            .map_err(report("Failed to list personnes".to_string()))?;

        Ok(personnes.into_iter().map(Personne::to_domain).collect())
    }

    pub async fn get_by_key(&self, identifier: &str) -> Result<Personne, ApiError> {
        let personne: ApiPersonne = self
            .client
            .get_json(RESOURCE, &["personnes", identifier], Some(identifier))
            .await
            .map_err(report(format!("Failed to fetch personne {}", identifier)))?;

        Ok(Personne::to_domain(personne))
    }

    pub async fn create(&self, personne: &NewPersonne) -> Result<Personne, ApiError> {
        let body = CreatePersonneBody::from(personne);
        let created: ApiPersonne = self
            .client
            .post_json(RESOURCE, &["personnes"], &body)
            .await
            .map_err(report(format!(
                "Failed to create personne {}",
                personne.identifier
            )))?;

        info!("Created personne {}", created.identifiant);
        Ok(Personne::to_domain(created))
    }

    pub async fn update(
        &self,
        identifier: &str,
        update: &PersonneUpdate,
    ) -> Result<Personne, ApiError> {
        let body = UpdatePersonneBody::from(update);
        let updated: ApiPersonne = self
            .client
            .put_json(
                RESOURCE,
                &["personnes", identifier],
                identifier,
                &body,
            )
            .await
            .map_err(report(format!("Failed to update personne {}", identifier)))?;

        info!("Updated personne {}", identifier);
        Ok(Personne::to_domain(updated))
    }

    /// Delete a personne; team membership and matrix rows are not cascaded
    pub async fn delete(&self, identifier: &str) -> Result<(), ApiError> {
        self.client
            .delete(RESOURCE, &["personnes", identifier], identifier)
            .await
            .map_err(report(format!("Failed to delete personne {}", identifier)))?;

        info!("Deleted personne {}", identifier);
        Ok(())
    }
}
