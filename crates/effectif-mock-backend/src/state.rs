//! In-memory backend data

use std::collections::BTreeMap;
use std::sync::Mutex;

use effectif_proto::wire::*;
use serde::{Deserialize, Serialize};

/// Request as received by the mock backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredEquipe {
    pub code: String,
    pub nom: String,
    pub description: Option<String>,
    pub groupement_code: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredPersonne {
    pub identifiant: String,
    pub nom: String,
    pub prenom: String,
    pub poste: Option<String>,
    pub equipe_code: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct BackendData {
    pub groupements: BTreeMap<String, ApiGroupement>,
    pub equipes: BTreeMap<String, StoredEquipe>,
    pub personnes: BTreeMap<String, StoredPersonne>,
    pub utilisateurs: BTreeMap<String, Vec<String>>,
    /// Known habilitation descriptions
    pub habilitations: BTreeMap<String, String>,
}

impl BackendData {
    pub fn equipe_view(&self, equipe: &StoredEquipe) -> ApiEquipe {
        ApiEquipe {
            code: equipe.code.clone(),
            nom: equipe.nom.clone(),
            description: equipe.description.clone(),
            groupement: equipe
                .groupement_code
                .as_ref()
                .and_then(|code| self.groupements.get(code))
                .cloned(),
            membres: Some(
                self.personnes
                    .values()
                    .filter(|p| p.equipe_code.as_deref() == Some(equipe.code.as_str()))
                    .map(|p| ApiPersonne {
                        identifiant: p.identifiant.clone(),
                        nom: p.nom.clone(),
                        prenom: p.prenom.clone(),
                        poste: p.poste.clone(),
                        equipe: None,
                    })
                    .collect(),
            ),
        }
    }

    pub fn personne_view(&self, personne: &StoredPersonne) -> ApiPersonne {
        ApiPersonne {
            identifiant: personne.identifiant.clone(),
            nom: personne.nom.clone(),
            prenom: personne.prenom.clone(),
            poste: personne.poste.clone(),
            equipe: personne.equipe_code.as_ref().map(|code| ApiEquipeRef {
                code: code.clone(),
                nom: self.equipes.get(code).map(|e| e.nom.clone()),
            }),
        }
    }

    pub fn utilisateur_view(&self, matricule: &str, codes: &[String]) -> ApiUtilisateur {
        ApiUtilisateur {
            matricule: matricule.to_string(),
            habilitations: Some(
                codes
                    .iter()
                    .map(|code| ApiHabilitation {
                        code: code.clone(),
                        description: self.habilitations.get(code).cloned(),
                    })
                    .collect(),
            ),
        }
    }
}

/// Shared state behind the router
#[derive(Debug, Default)]
pub struct BackendState {
    pub(crate) data: Mutex<BackendData>,
    requests: Mutex<Vec<RecordedRequest>>,
    forced_status: Mutex<Option<u16>>,
    path_failures: Mutex<BTreeMap<String, u16>>,
}

impl BackendState {
    pub(crate) fn data(&self) -> std::sync::MutexGuard<'_, BackendData> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn record(&self, request: RecordedRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear_requests(&self) {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn forced_status(&self) -> Option<u16> {
        *self
            .forced_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_forced_status(&self, status: Option<u16>) {
        *self
            .forced_status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }

    /// Status to answer for `path`: the global one wins over a per-path one
    pub fn status_for(&self, path: &str) -> Option<u16> {
        self.forced_status().or_else(|| {
            self.path_failures
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .get(path)
                .copied()
        })
    }

    pub fn set_path_failure(&self, path: &str, status: Option<u16>) {
        let mut failures = self
            .path_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match status {
            Some(status) => failures.insert(path.to_string(), status),
            None => failures.remove(path),
        };
    }
}
