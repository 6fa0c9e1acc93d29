//! Backend wire records
//!
//! Field names follow the backend JSON exactly. Optional fields are skipped when absent so
//! that write bodies only carry what the backend accepts.

use serde::{Deserialize, Serialize};

/// `groupement` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiGroupement {
    pub code: String,
    pub libelle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Team reference nested in a personne
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEquipeRef {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
}

/// `personne` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiPersonne {
    pub identifiant: String,
    pub nom: String,
    pub prenom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipe: Option<ApiEquipeRef>,
}

/// `equipe` resource, with its groupement and members resolved by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEquipe {
    pub code: String,
    pub nom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groupement: Option<ApiGroupement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membres: Option<Vec<ApiPersonne>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHabilitation {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `utilisateur` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUtilisateur {
    pub matricule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habilitations: Option<Vec<ApiHabilitation>>,
}

/// Body of `POST /equipes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEquipeBody {
    pub code: String,
    pub nom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groupement_code: Option<String>,
}

/// Body of `PUT /equipes/{code}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEquipeBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groupement_code: Option<String>,
}

/// Body of `PUT /groupements/{code}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateGroupementBody {
    pub libelle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Body of `POST /personnes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonneBody {
    pub identifiant: String,
    pub nom: String,
    pub prenom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipe_id: Option<String>,
}

/// Body of `PUT /personnes/{identifiant}`; an empty `equipeId` clears the team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonneBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipe_id: Option<String>,
}

/// Body of `POST /utilisateurs` and `PUT /utilisateurs/{matricule}`
///
/// Permissions are sent as a flat list of codes. The matricule is only present on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveUtilisateurBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matricule: Option<String>,
    #[serde(default)]
    pub habilitations_ids: Vec<String>,
}
