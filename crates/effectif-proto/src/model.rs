//! Domain records as presented to staff

use serde::{Deserialize, Serialize};

/// Organizational unit grouping teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groupement {
    /// Unique, immutable code
    pub code: String,
    pub label: String,
    /// Parent direction (free text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Mutable groupement fields; the code is never part of an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupementUpdate {
    pub label: String,
    pub direction: Option<String>,
}

/// Flattened groupement reference carried by a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupementRef {
    /// Groupement code
    pub id: String,
    pub name: String,
}

/// Person summary used for team members and matrix rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonneSummary {
    pub matricule: String,
    pub name: String,
    pub surname: String,
}

/// Team of personnes, optionally attached to a groupement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique, immutable code
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groupement: Option<GroupementRef>,
    /// Denormalized at read time; a team does not own its members
    #[serde(default)]
    pub members: Vec<PersonneSummary>,
}

impl Team {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            groupement: None,
            members: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach the team to a groupement by code (the label is resolved by the backend)
    pub fn with_groupement(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.groupement = Some(GroupementRef {
            name: code.clone(),
            id: code,
        });
        self
    }

    pub fn groupement_code(&self) -> Option<&str> {
        self.groupement.as_ref().map(|g| g.id.as_str())
    }

    pub fn has_member(&self, matricule: &str) -> bool {
        self.members.iter().any(|m| m.matricule == matricule)
    }
}

/// Mutable team fields; the code is never part of an update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub groupement_code: Option<String>,
}

/// Team reference held by a personne
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A person record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personne {
    /// Unique, immutable identifier (same space as a user matricule)
    pub identifier: String,
    pub name: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamRef>,
}

impl Personne {
    pub fn summary(&self) -> PersonneSummary {
        PersonneSummary {
            matricule: self.identifier.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
        }
    }

    pub fn team_code(&self) -> Option<&str> {
        self.team.as_ref().map(|t| t.code.as_str())
    }
}

/// Fields accepted when creating a personne
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPersonne {
    pub identifier: String,
    pub name: String,
    pub surname: String,
    pub role: Option<String>,
    pub team_code: Option<String>,
}

/// Team assignment carried by a personne update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TeamAssignment {
    #[default]
    Unchanged,
    Cleared,
    Assigned(String),
}

impl TeamAssignment {
    /// Interpret a form value where `"none"` or an empty string means no team
    pub fn from_form(value: Option<&str>) -> Self {
        match value {
            None => TeamAssignment::Unchanged,
            Some("") | Some("none") => TeamAssignment::Cleared,
            Some(code) => TeamAssignment::Assigned(code.to_string()),
        }
    }
}

/// Mutable personne fields; the identifier is never part of an update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonneUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub role: Option<String>,
    pub team: TeamAssignment,
}

/// Permission granted to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habilitation {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Habilitation {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: None,
        }
    }
}

/// Authorization record as held by the backend `utilisateur` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub matricule: String,
    #[serde(default)]
    pub habilitations: Vec<Habilitation>,
}

impl AuthorizedUser {
    pub fn has_habilitation(&self, code: &str) -> bool {
        self.habilitations.iter().any(|h| h.code == code)
    }
}

/// Authorization record joined with the matching personne for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub matricule: String,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub habilitations: Vec<Habilitation>,
}

impl User {
    pub fn habilitation_codes(&self) -> Vec<String> {
        self.habilitations.iter().map(|h| h.code.clone()).collect()
    }
}

/// Labelled skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competence {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Ordinal skill level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub value: u8,
    pub label: String,
}

impl Note {
    pub fn new(id: impl Into<String>, value: u8, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value,
            label: label.into(),
        }
    }

    /// The four-level scale used across the matrix
    pub fn scale() -> Vec<Note> {
        vec![
            Note::new("N1", 1, "Débutant"),
            Note::new("N2", 2, "Intermédiaire"),
            Note::new("N3", 3, "Avancé"),
            Note::new("N4", 4, "Expert"),
        ]
    }

    /// Look up a level of the standard scale by value
    pub fn from_value(value: u8) -> Option<Note> {
        Self::scale().into_iter().find(|n| n.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_assignment_from_form() {
        assert_eq!(TeamAssignment::from_form(None), TeamAssignment::Unchanged);
        assert_eq!(TeamAssignment::from_form(Some("none")), TeamAssignment::Cleared);
        assert_eq!(TeamAssignment::from_form(Some("")), TeamAssignment::Cleared);
        assert_eq!(
            TeamAssignment::from_form(Some("EQ001")),
            TeamAssignment::Assigned("EQ001".to_string())
        );
    }

    #[test]
    fn test_note_scale() {
        let scale = Note::scale();
        assert_eq!(scale.len(), 4);
        assert_eq!(Note::from_value(3).unwrap().label, "Avancé");
        assert!(Note::from_value(5).is_none());
    }

    #[test]
    fn test_team_builder() {
        let team = Team::new("EQ010", "QA")
            .with_description("Qualité")
            .with_groupement("G1");
        assert_eq!(team.groupement_code(), Some("G1"));
        assert!(team.members.is_empty());
        assert!(!team.has_member("EMP1"));
    }
}
