//! Field mapping between backend wire records and domain records
//!
//! Every entity goes through exactly one `WireMapping` implementation, so the
//! backend/domain renaming lives in a single place:
//!
//! | backend       | domain                 |
//! |---------------|------------------------|
//! | `identifiant` | `identifier`/`matricule` |
//! | `nom`         | `name`                 |
//! | `prenom`      | `surname`              |
//! | `poste`       | `role`                 |
//! | `libelle`     | `label` (`name` for refs) |
//! | `equipe`      | `team`                 |
//! | `membres`     | `members`              |

use crate::model::*;
use crate::wire::*;

/// Placeholder shown when a user has no matching personne
pub const UNKNOWN_NAME: &str = "Nom inconnu";
pub const UNKNOWN_SURNAME: &str = "Prénom inconnu";

/// Pure conversion pair between a domain record and its wire form
pub trait WireMapping: Sized {
    type Wire;

    fn to_domain(wire: Self::Wire) -> Self;

    fn to_wire(&self) -> Self::Wire;
}

impl WireMapping for Groupement {
    type Wire = ApiGroupement;

    fn to_domain(wire: ApiGroupement) -> Self {
        Self {
            code: wire.code,
            label: wire.libelle,
            direction: wire.direction,
        }
    }

    fn to_wire(&self) -> ApiGroupement {
        ApiGroupement {
            code: self.code.clone(),
            libelle: self.label.clone(),
            direction: self.direction.clone(),
        }
    }
}

impl WireMapping for PersonneSummary {
    type Wire = ApiPersonne;

    fn to_domain(wire: ApiPersonne) -> Self {
        Self {
            matricule: wire.identifiant,
            name: wire.nom,
            surname: wire.prenom,
        }
    }

    fn to_wire(&self) -> ApiPersonne {
        ApiPersonne {
            identifiant: self.matricule.clone(),
            nom: self.name.clone(),
            prenom: self.surname.clone(),
            poste: None,
            equipe: None,
        }
    }
}

impl WireMapping for Team {
    type Wire = ApiEquipe;

    fn to_domain(wire: ApiEquipe) -> Self {
        Self {
            code: wire.code,
            name: wire.nom,
            description: wire.description.unwrap_or_default(),
            groupement: wire.groupement.map(|g| GroupementRef {
                id: g.code,
                name: g.libelle,
            }),
            members: wire
                .membres
                .unwrap_or_default()
                .into_iter()
                .map(PersonneSummary::to_domain)
                .collect(),
        }
    }

    fn to_wire(&self) -> ApiEquipe {
        ApiEquipe {
            code: self.code.clone(),
            nom: self.name.clone(),
            description: Some(self.description.clone()),
            groupement: self.groupement.as_ref().map(|g| ApiGroupement {
                code: g.id.clone(),
                libelle: g.name.clone(),
                direction: None,
            }),
            membres: Some(self.members.iter().map(|m| m.to_wire()).collect()),
        }
    }
}

impl WireMapping for Personne {
    type Wire = ApiPersonne;

    fn to_domain(wire: ApiPersonne) -> Self {
        Self {
            identifier: wire.identifiant,
            name: wire.nom,
            surname: wire.prenom,
            role: wire.poste,
            team: wire.equipe.map(|e| TeamRef {
                code: e.code,
                name: e.nom,
            }),
        }
    }

    fn to_wire(&self) -> ApiPersonne {
        ApiPersonne {
            identifiant: self.identifier.clone(),
            nom: self.name.clone(),
            prenom: self.surname.clone(),
            poste: self.role.clone(),
            equipe: self.team.as_ref().map(|t| ApiEquipeRef {
                code: t.code.clone(),
                nom: t.name.clone(),
            }),
        }
    }
}

impl WireMapping for Habilitation {
    type Wire = ApiHabilitation;

    fn to_domain(wire: ApiHabilitation) -> Self {
        Self {
            code: wire.code,
            description: wire.description,
        }
    }

    fn to_wire(&self) -> ApiHabilitation {
        ApiHabilitation {
            code: self.code.clone(),
            description: self.description.clone(),
        }
    }
}

impl WireMapping for AuthorizedUser {
    type Wire = ApiUtilisateur;

    fn to_domain(wire: ApiUtilisateur) -> Self {
        Self {
            matricule: wire.matricule,
            habilitations: wire
                .habilitations
                .unwrap_or_default()
                .into_iter()
                .map(Habilitation::to_domain)
                .collect(),
        }
    }

    fn to_wire(&self) -> ApiUtilisateur {
        ApiUtilisateur {
            matricule: self.matricule.clone(),
            habilitations: Some(self.habilitations.iter().map(|h| h.to_wire()).collect()),
        }
    }
}

/// Join an authorization record with the personne sharing its matricule
///
/// A missing personne yields the "unknown" placeholders instead of an error.
pub fn join_user(utilisateur: ApiUtilisateur, personnes: &[ApiPersonne]) -> User {
    let personne = personnes
        .iter()
        .find(|p| p.identifiant == utilisateur.matricule);
    let authorized = AuthorizedUser::to_domain(utilisateur);

    User {
        name: personne
            .map(|p| p.nom.clone())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        surname: personne
            .map(|p| p.prenom.clone())
            .unwrap_or_else(|| UNKNOWN_SURNAME.to_string()),
        matricule: authorized.matricule,
        habilitations: authorized.habilitations,
    }
}

impl From<&Team> for CreateEquipeBody {
    fn from(team: &Team) -> Self {
        Self {
            code: team.code.clone(),
            nom: team.name.clone(),
            description: Some(team.description.clone()),
            groupement_code: team.groupement_code().map(str::to_string),
        }
    }
}

impl From<&TeamUpdate> for UpdateEquipeBody {
    fn from(update: &TeamUpdate) -> Self {
        Self {
            nom: update.name.clone(),
            description: update.description.clone(),
            groupement_code: update.groupement_code.clone(),
        }
    }
}

impl From<&GroupementUpdate> for UpdateGroupementBody {
    fn from(update: &GroupementUpdate) -> Self {
        Self {
            libelle: update.label.clone(),
            direction: update.direction.clone(),
        }
    }
}

impl From<&NewPersonne> for CreatePersonneBody {
    fn from(personne: &NewPersonne) -> Self {
        Self {
            identifiant: personne.identifier.clone(),
            nom: personne.name.clone(),
            prenom: personne.surname.clone(),
            poste: personne.role.clone(),
            equipe_id: personne.team_code.clone(),
        }
    }
}

impl From<&PersonneUpdate> for UpdatePersonneBody {
    fn from(update: &PersonneUpdate) -> Self {
        Self {
            nom: update.name.clone(),
            prenom: update.surname.clone(),
            poste: update.role.clone(),
            equipe_id: match &update.team {
                TeamAssignment::Unchanged => None,
                TeamAssignment::Cleared => Some(String::new()),
                TeamAssignment::Assigned(code) => Some(code.clone()),
            },
        }
    }
}

impl SaveUtilisateurBody {
    /// Body for creating a user: matricule plus permission codes
    pub fn create(user: &User) -> Self {
        Self {
            matricule: Some(user.matricule.clone()),
            habilitations_ids: user.habilitation_codes(),
        }
    }

    /// Body for updating a user: permission codes only
    pub fn update(user: &User) -> Self {
        Self {
            matricule: None,
            habilitations_ids: user.habilitation_codes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_personne(id: &str, nom: &str, prenom: &str) -> ApiPersonne {
        ApiPersonne {
            identifiant: id.to_string(),
            nom: nom.to_string(),
            prenom: prenom.to_string(),
            poste: None,
            equipe: None,
        }
    }

    #[test]
    fn test_team_to_domain_flattens_groupement_and_members() {
        let wire = ApiEquipe {
            code: "EQ001".to_string(),
            nom: "Dev".to_string(),
            description: None,
            groupement: Some(ApiGroupement {
                code: "G1".to_string(),
                libelle: "Groupement 1".to_string(),
                direction: Some("DSI".to_string()),
            }),
            membres: Some(vec![api_personne("EMP1", "Doe", "John")]),
        };

        let team = Team::to_domain(wire);
        assert_eq!(team.description, "");
        assert_eq!(
            team.groupement,
            Some(GroupementRef {
                id: "G1".to_string(),
                name: "Groupement 1".to_string()
            })
        );
        assert_eq!(team.members[0].matricule, "EMP1");
        assert_eq!(team.members[0].name, "Doe");
        assert_eq!(team.members[0].surname, "John");
    }

    #[test]
    fn test_team_without_members_gets_empty_list() {
        let wire = ApiEquipe {
            code: "EQ002".to_string(),
            nom: "Ops".to_string(),
            description: Some("Run".to_string()),
            groupement: None,
            membres: None,
        };
        let team = Team::to_domain(wire);
        assert!(team.members.is_empty());
        assert!(team.groupement.is_none());
    }

    #[test]
    fn test_personne_mapping_is_reversible() {
        let personne = Personne {
            identifier: "EMP1".to_string(),
            name: "Doe".to_string(),
            surname: "John".to_string(),
            role: Some("Développeur".to_string()),
            team: Some(TeamRef {
                code: "EQ001".to_string(),
                name: Some("Dev".to_string()),
            }),
        };
        assert_eq!(Personne::to_domain(personne.to_wire()), personne);
    }

    #[test]
    fn test_join_user_uses_placeholders_for_unknown_personne() {
        let utilisateur = ApiUtilisateur {
            matricule: "EMP9".to_string(),
            habilitations: Some(vec![ApiHabilitation {
                code: "ADMIN".to_string(),
                description: None,
            }]),
        };
        let user = join_user(utilisateur, &[api_personne("EMP1", "Doe", "John")]);
        assert_eq!(user.name, UNKNOWN_NAME);
        assert_eq!(user.surname, UNKNOWN_SURNAME);
        assert_eq!(user.habilitation_codes(), vec!["ADMIN".to_string()]);
    }

    #[test]
    fn test_join_user_matches_on_identifier() {
        let utilisateur = ApiUtilisateur {
            matricule: "EMP1".to_string(),
            habilitations: None,
        };
        let user = join_user(utilisateur, &[api_personne("EMP1", "Doe", "John")]);
        assert_eq!(user.name, "Doe");
        assert_eq!(user.surname, "John");
        assert!(user.habilitations.is_empty());
    }

    #[test]
    fn test_personne_update_body_never_carries_identifier() {
        let update = PersonneUpdate {
            name: Some("Smith".to_string()),
            team: TeamAssignment::Cleared,
            ..Default::default()
        };
        let value = serde_json::to_value(UpdatePersonneBody::from(&update)).unwrap();
        assert!(value.get("identifiant").is_none());
        assert_eq!(value["equipeId"], "");
        assert_eq!(value["nom"], "Smith");
    }

    #[test]
    fn test_create_equipe_body_sends_groupement_code() {
        let team = Team::new("EQ010", "QA").with_groupement("G1");
        let body = CreateEquipeBody::from(&team);
        assert_eq!(body.groupement_code.as_deref(), Some("G1"));
    }
}
