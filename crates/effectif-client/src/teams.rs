//! Team (`/equipes`) service

use effectif_proto::wire::{ApiEquipe, CreateEquipeBody, UpdateEquipeBody};
use effectif_proto::{
    available_members, Personne, PersonneUpdate, Team, TeamAssignment, TeamUpdate, WireMapping,
};
use tracing::info;

use crate::client::{report, ApiClient};
use crate::error::ApiError;
use crate::personnes::PersonneService;

const RESOURCE: &str = "equipe";

pub struct TeamService {
    client: ApiClient,
}

impl TeamService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Team>, ApiError> {
        let equipes: Vec<ApiEquipe> = self
            .client
            .get_json(RESOURCE, &["equipes"], None)
            .await
            .map_err(report("Failed to list teams".to_string()))?;

        Ok(equipes.into_iter().map(Team::to_domain).collect())
    }

    pub async fn get_by_key(&self, code: &str) -> Result<Team, ApiError> {
        let equipe: ApiEquipe = self
            .client
            .get_json(RESOURCE, &["equipes", code], Some(code))
            .await
            .map_err(report(format!("Failed to fetch team {}", code)))?;

        Ok(Team::to_domain(equipe))
    }

    /// Create a team; the groupement is sent as a code reference
    pub async fn create(&self, team: &Team) -> Result<Team, ApiError> {
        let body = CreateEquipeBody::from(team);
        let created: ApiEquipe = self
            .client
            .post_json(RESOURCE, &["equipes"], &body)
            .await
            .map_err(report(format!("Failed to create team {}", team.code)))?;

        info!("Created team {}", created.code);
        Ok(Team::to_domain(created))
    }

    pub async fn update(&self, code: &str, update: &TeamUpdate) -> Result<Team, ApiError> {
        let body = UpdateEquipeBody::from(update);
        let updated: ApiEquipe = self
            .client
            .put_json(RESOURCE, &["equipes", code], code, &body)
            .await
            .map_err(report(format!("Failed to update team {}", code)))?;

        info!("Updated team {}", code);
        Ok(Team::to_domain(updated))
    }

    /// Delete a team; personnes referencing it are left untouched
    pub async fn delete(&self, code: &str) -> Result<(), ApiError> {
        self.client
            .delete(RESOURCE, &["equipes", code], code)
            .await
            .map_err(report(format!("Failed to delete team {}", code)))?;

        info!("Deleted team {}", code);
        Ok(())
    }

    /// Assign a personne to the team
    pub async fn add_member(&self, code: &str, identifier: &str) -> Result<Personne, ApiError> {
        self.assign(identifier, TeamAssignment::Assigned(code.to_string()))
            .await
    }

    /// Detach a personne from whatever team it belongs to
    pub async fn remove_member(&self, identifier: &str) -> Result<Personne, ApiError> {
        self.assign(identifier, TeamAssignment::Cleared).await
    }

    /// Personnes not yet members of the team
    pub async fn available_members(&self, code: &str) -> Result<Vec<Personne>, ApiError> {
        let team = self.get_by_key(code).await?;
        let personnes = PersonneService::new(self.client.clone()).list().await?;
        Ok(available_members(&team, personnes))
    }

    async fn assign(&self, identifier: &str, team: TeamAssignment) -> Result<Personne, ApiError> {
        let update = PersonneUpdate {
            team,
            ..Default::default()
        };
        PersonneService::new(self.client.clone())
            .update(identifier, &update)
            .await
    }
}
