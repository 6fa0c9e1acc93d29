use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use effectif_proto::wire::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::{BackendState, StoredEquipe, StoredPersonne};

/// Error body returned by every failing handler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type HandlerError = (StatusCode, Json<ErrorResponse>);
pub type HandlerResult<T> = Result<T, HandlerError>;

fn fail(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn not_found(resource: &str, key: &str) -> HandlerError {
    fail(
        StatusCode::NOT_FOUND,
        format!("{} '{}' not found", resource, key),
    )
}

/// Empty codes mean "no reference"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ---- groupements ----

pub async fn list_groupements(State(state): State<Arc<BackendState>>) -> Json<Vec<ApiGroupement>> {
    let data = state.data();
    Json(data.groupements.values().cloned().collect())
}

pub async fn get_groupement(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
) -> HandlerResult<Json<ApiGroupement>> {
    let data = state.data();
    data.groupements
        .get(&code)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("groupement", &code))
}

pub async fn create_groupement(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<ApiGroupement>,
) -> HandlerResult<(StatusCode, Json<ApiGroupement>)> {
    let mut data = state.data();
    if data.groupements.contains_key(&body.code) {
        return Err(fail(StatusCode::CONFLICT, "groupement already exists"));
    }
    debug!("Creating groupement {}", body.code);
    data.groupements.insert(body.code.clone(), body.clone());
    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn update_groupement(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
    Json(body): Json<UpdateGroupementBody>,
) -> HandlerResult<Json<ApiGroupement>> {
    let mut data = state.data();
    let groupement = data
        .groupements
        .get_mut(&code)
        .ok_or_else(|| not_found("groupement", &code))?;
    groupement.libelle = body.libelle;
    groupement.direction = body.direction;
    Ok(Json(groupement.clone()))
}

pub async fn delete_groupement(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
) -> HandlerResult<StatusCode> {
    let mut data = state.data();
    data.groupements
        .remove(&code)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found("groupement", &code))
}

// ---- equipes ----

pub async fn list_equipes(State(state): State<Arc<BackendState>>) -> Json<Vec<ApiEquipe>> {
    let data = state.data();
    Json(data.equipes.values().map(|e| data.equipe_view(e)).collect())
}

pub async fn get_equipe(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
) -> HandlerResult<Json<ApiEquipe>> {
    let data = state.data();
    data.equipes
        .get(&code)
        .map(|e| Json(data.equipe_view(e)))
        .ok_or_else(|| not_found("equipe", &code))
}

pub async fn create_equipe(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<CreateEquipeBody>,
) -> HandlerResult<(StatusCode, Json<ApiEquipe>)> {
    let mut data = state.data();
    if data.equipes.contains_key(&body.code) {
        return Err(fail(StatusCode::CONFLICT, "equipe already exists"));
    }
    let groupement_code = non_empty(body.groupement_code);
    if let Some(code) = &groupement_code {
        if !data.groupements.contains_key(code) {
            return Err(fail(StatusCode::BAD_REQUEST, "unknown groupement"));
        }
    }

    let equipe = StoredEquipe {
        code: body.code,
        nom: body.nom,
        description: body.description,
        groupement_code,
    };
    debug!("Creating equipe {}", equipe.code);
    let view = data.equipe_view(&equipe);
    data.equipes.insert(equipe.code.clone(), equipe);
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_equipe(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
    Json(body): Json<UpdateEquipeBody>,
) -> HandlerResult<Json<ApiEquipe>> {
    let mut data = state.data();
    if let Some(groupement) = body.groupement_code.as_deref().filter(|c| !c.is_empty()) {
        if !data.groupements.contains_key(groupement) {
            return Err(fail(StatusCode::BAD_REQUEST, "unknown groupement"));
        }
    }

    let equipe = data
        .equipes
        .get_mut(&code)
        .ok_or_else(|| not_found("equipe", &code))?;
    if let Some(nom) = body.nom {
        equipe.nom = nom;
    }
    if let Some(description) = body.description {
        equipe.description = Some(description);
    }
    if let Some(groupement_code) = body.groupement_code {
        equipe.groupement_code = non_empty(Some(groupement_code));
    }
    let equipe = equipe.clone();
    Ok(Json(data.equipe_view(&equipe)))
}

pub async fn delete_equipe(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
) -> HandlerResult<StatusCode> {
    let mut data = state.data();
    data.equipes
        .remove(&code)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found("equipe", &code))
}

// ---- personnes ----

pub async fn list_personnes(State(state): State<Arc<BackendState>>) -> Json<Vec<ApiPersonne>> {
    let data = state.data();
    Json(data.personnes.values().map(|p| data.personne_view(p)).collect())
}

pub async fn get_personne(
    State(state): State<Arc<BackendState>>,
    Path(identifiant): Path<String>,
) -> HandlerResult<Json<ApiPersonne>> {
    let data = state.data();
    data.personnes
        .get(&identifiant)
        .map(|p| Json(data.personne_view(p)))
        .ok_or_else(|| not_found("personne", &identifiant))
}

pub async fn create_personne(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<CreatePersonneBody>,
) -> HandlerResult<(StatusCode, Json<ApiPersonne>)> {
    let mut data = state.data();
    if data.personnes.contains_key(&body.identifiant) {
        return Err(fail(StatusCode::CONFLICT, "personne already exists"));
    }
    let equipe_code = non_empty(body.equipe_id);
    if let Some(code) = &equipe_code {
        if !data.equipes.contains_key(code) {
            return Err(fail(StatusCode::BAD_REQUEST, "unknown equipe"));
        }
    }

    let personne = StoredPersonne {
        identifiant: body.identifiant,
        nom: body.nom,
        prenom: body.prenom,
        poste: body.poste,
        equipe_code,
    };
    debug!("Creating personne {}", personne.identifiant);
    let view = data.personne_view(&personne);
    data.personnes.insert(personne.identifiant.clone(), personne);
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_personne(
    State(state): State<Arc<BackendState>>,
    Path(identifiant): Path<String>,
    Json(body): Json<UpdatePersonneBody>,
) -> HandlerResult<Json<ApiPersonne>> {
    let mut data = state.data();
    if let Some(code) = body.equipe_id.as_deref().filter(|c| !c.is_empty()) {
        if !data.equipes.contains_key(code) {
            return Err(fail(StatusCode::BAD_REQUEST, "unknown equipe"));
        }
    }

    let personne = data
        .personnes
        .get_mut(&identifiant)
        .ok_or_else(|| not_found("personne", &identifiant))?;
    if let Some(nom) = body.nom {
        personne.nom = nom;
    }
    if let Some(prenom) = body.prenom {
        personne.prenom = prenom;
    }
    if let Some(poste) = body.poste {
        personne.poste = Some(poste);
    }
    if let Some(equipe_id) = body.equipe_id {
        personne.equipe_code = non_empty(Some(equipe_id));
    }
    let personne = personne.clone();
    Ok(Json(data.personne_view(&personne)))
}

pub async fn delete_personne(
    State(state): State<Arc<BackendState>>,
    Path(identifiant): Path<String>,
) -> HandlerResult<StatusCode> {
    let mut data = state.data();
    data.personnes
        .remove(&identifiant)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found("personne", &identifiant))
}

// ---- utilisateurs ----

pub async fn list_utilisateurs(
    State(state): State<Arc<BackendState>>,
) -> Json<Vec<ApiUtilisateur>> {
    let data = state.data();
    Json(
        data.utilisateurs
            .iter()
            .map(|(matricule, codes)| data.utilisateur_view(matricule, codes))
            .collect(),
    )
}

pub async fn get_utilisateur(
    State(state): State<Arc<BackendState>>,
    Path(matricule): Path<String>,
) -> HandlerResult<Json<ApiUtilisateur>> {
    let data = state.data();
    data.utilisateurs
        .get(&matricule)
        .map(|codes| Json(data.utilisateur_view(&matricule, codes)))
        .ok_or_else(|| not_found("utilisateur", &matricule))
}

pub async fn create_utilisateur(
    State(state): State<Arc<BackendState>>,
    Json(body): Json<SaveUtilisateurBody>,
) -> HandlerResult<(StatusCode, Json<ApiUtilisateur>)> {
    let matricule = non_empty(body.matricule)
        .ok_or_else(|| fail(StatusCode::BAD_REQUEST, "matricule is required"))?;
    let mut data = state.data();
    if data.utilisateurs.contains_key(&matricule) {
        return Err(fail(StatusCode::CONFLICT, "utilisateur already exists"));
    }
    debug!("Creating utilisateur {}", matricule);
    let view = data.utilisateur_view(&matricule, &body.habilitations_ids);
    data.utilisateurs.insert(matricule, body.habilitations_ids);
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn update_utilisateur(
    State(state): State<Arc<BackendState>>,
    Path(matricule): Path<String>,
    Json(body): Json<SaveUtilisateurBody>,
) -> HandlerResult<Json<ApiUtilisateur>> {
    let mut data = state.data();
    let codes = data
        .utilisateurs
        .get_mut(&matricule)
        .ok_or_else(|| not_found("utilisateur", &matricule))?;
    *codes = body.habilitations_ids;
    let codes = codes.clone();
    Ok(Json(data.utilisateur_view(&matricule, &codes)))
}

pub async fn delete_utilisateur(
    State(state): State<Arc<BackendState>>,
    Path(matricule): Path<String>,
) -> HandlerResult<StatusCode> {
    let mut data = state.data();
    data.utilisateurs
        .remove(&matricule)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found("utilisateur", &matricule))
}
