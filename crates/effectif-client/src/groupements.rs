//! Groupement (`/groupements`) service

use effectif_proto::wire::{ApiGroupement, UpdateGroupementBody};
use effectif_proto::{Groupement, GroupementUpdate, WireMapping};
use tracing::info;

use crate::client::{report, ApiClient};
use crate::error::ApiError;

const RESOURCE: &str = "groupement";

pub struct GroupementService {
    client: ApiClient,
}

impl GroupementService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Groupement>, ApiError> {
        let groupements: Vec<ApiGroupement> = self
            .client
            .get_json(RESOURCE, &["groupements"], None)
            .await
            .map_err(report("Failed to list groupements".to_string()))?;

        Ok(groupements.into_iter().map(Groupement::to_domain).collect())
    }

    pub async fn get_by_key(&self, code: &str) -> Result<Groupement, ApiError> {
        let groupement: ApiGroupement = self
            .client
            .get_json(RESOURCE, &["groupements", code], Some(code))
            .await
            .map_err(report(format!("Failed to fetch groupement {}", code)))?;

        Ok(Groupement::to_domain(groupement))
    }

    pub async fn create(&self, groupement: &Groupement) -> Result<Groupement, ApiError> {
        let created: ApiGroupement = self
            .client
            .post_json(RESOURCE, &["groupements"], &groupement.to_wire())
            .await
            .map_err(report(format!(
                "Failed to create groupement {}",
                groupement.code
            )))?;

        info!("Created groupement {}", created.code);
        Ok(Groupement::to_domain(created))
    }

    /// Update label and direction; the code stays in the path only
    pub async fn update(
        &self,
        code: &str,
        update: &GroupementUpdate,
    ) -> Result<Groupement, ApiError> {
        let body = UpdateGroupementBody::from(update);
        let updated: ApiGroupement = self
            .client
            .put_json(RESOURCE, &["groupements", code], code, &body)
            .await
            .map_err(report(format!("Failed to update groupement {}", code)))?;

        info!("Updated groupement {}", code);
        Ok(Groupement::to_domain(updated))
    }

    pub async fn delete(&self, code: &str) -> Result<(), ApiError> {
        self.client
            .delete(RESOURCE, &["groupements", code], code)
            .await
            .map_err(report(format!("Failed to delete groupement {}", code)))?;

        info!("Deleted groupement {}", code);
        Ok(())
    }
}
