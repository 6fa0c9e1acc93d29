//! Competence matrix state
//!
//! Holds (personne, competence, note) assignments with at most one note per
//! (matricule, competence id) pair. The matrix is a local draft: nothing here talks
//! to the backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Competence, Note, PersonneSummary};

/// Category used for competences without one
pub const DEFAULT_CATEGORY: &str = "Autres";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub personne: PersonneSummary,
    pub competence: Competence,
    pub note: Note,
}

impl MatrixEntry {
    fn same_pair(&self, matricule: &str, competence_id: &str) -> bool {
        self.personne.matricule == matricule && self.competence.id == competence_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetenceMatrix {
    entries: Vec<MatrixEntry>,
}

impl CompetenceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matrix from existing entries, later duplicates replacing earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = MatrixEntry>) -> Self {
        let mut matrix = Self::new();
        for entry in entries {
            matrix.upsert(entry);
        }
        matrix
    }

    /// Replace the entry for the same (personne, competence) pair, or append
    pub fn upsert(&mut self, entry: MatrixEntry) {
        let existing = self
            .entries
            .iter_mut()
            .find(|e| e.same_pair(&entry.personne.matricule, &entry.competence.id));

        match existing {
            Some(slot) => {
                debug!(
                    "Replacing note for {} / {}",
                    entry.personne.matricule, entry.competence.id
                );
                *slot = entry;
            }
            None => {
                debug!(
                    "Adding note for {} / {}",
                    entry.personne.matricule, entry.competence.id
                );
                self.entries.push(entry);
            }
        }
    }

    /// Note held by a personne for a competence
    pub fn level(&self, matricule: &str, competence_id: &str) -> Option<&Note> {
        self.entries
            .iter()
            .find(|e| e.same_pair(matricule, competence_id))
            .map(|e| &e.note)
    }

    /// Remove the entry for a pair, returning it if present
    pub fn remove(&mut self, matricule: &str, competence_id: &str) -> Option<MatrixEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.same_pair(matricule, competence_id))?;
        Some(self.entries.remove(index))
    }

    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct personnes and competences, in first-seen order
    pub fn personnes(&self) -> Vec<&PersonneSummary> {
        let mut seen: Vec<&PersonneSummary> = Vec::new();
        for entry in &self.entries {
            if !seen.iter().any(|p| p.matricule == entry.personne.matricule) {
                seen.push(&entry.personne);
            }
        }
        seen
    }

    pub fn competences(&self) -> Vec<&Competence> {
        let mut seen: Vec<&Competence> = Vec::new();
        for entry in &self.entries {
            if !seen.iter().any(|c| c.id == entry.competence.id) {
                seen.push(&entry.competence);
            }
        }
        seen
    }
}

/// Group competences by category
pub fn by_category<'a>(
    competences: impl IntoIterator<Item = &'a Competence>,
) -> BTreeMap<String, Vec<&'a Competence>> {
    let mut groups: BTreeMap<String, Vec<&Competence>> = BTreeMap::new();
    for competence in competences {
        let category = competence
            .category
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        groups.entry(category).or_default().push(competence);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personne(matricule: &str) -> PersonneSummary {
        PersonneSummary {
            matricule: matricule.to_string(),
            name: "Doe".to_string(),
            surname: "John".to_string(),
        }
    }

    fn competence(id: &str, category: Option<&str>) -> Competence {
        Competence {
            id: id.to_string(),
            label: id.to_lowercase(),
            description: None,
            category: category.map(str::to_string),
        }
    }

    fn entry(matricule: &str, competence_id: &str, value: u8) -> MatrixEntry {
        MatrixEntry {
            personne: personne(matricule),
            competence: competence(competence_id, Some("Frontend")),
            note: Note::from_value(value).unwrap(),
        }
    }

    #[test]
    fn test_upsert_keeps_one_entry_per_pair() {
        let mut matrix = CompetenceMatrix::new();
        matrix.upsert(entry("EMP1", "COMP001", 1));
        matrix.upsert(entry("EMP1", "COMP001", 3));
        matrix.upsert(entry("EMP1", "COMP001", 4));

        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.level("EMP1", "COMP001").unwrap().value, 4);
    }

    #[test]
    fn test_upsert_appends_distinct_pairs() {
        let mut matrix = CompetenceMatrix::new();
        matrix.upsert(entry("EMP1", "COMP001", 1));
        matrix.upsert(entry("EMP1", "COMP002", 2));
        matrix.upsert(entry("EMP2", "COMP001", 3));

        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.personnes().len(), 2);
        assert_eq!(matrix.competences().len(), 2);
        assert!(matrix.level("EMP2", "COMP002").is_none());
    }

    #[test]
    fn test_from_entries_deduplicates() {
        let matrix = CompetenceMatrix::from_entries(vec![
            entry("EMP1", "COMP001", 1),
            entry("EMP1", "COMP001", 2),
        ]);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix.level("EMP1", "COMP001").unwrap().id, "N2");
    }

    #[test]
    fn test_remove() {
        let mut matrix = CompetenceMatrix::from_entries(vec![entry("EMP1", "COMP001", 1)]);
        assert!(matrix.remove("EMP1", "COMP002").is_none());
        assert!(matrix.remove("EMP1", "COMP001").is_some());
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_by_category_defaults_to_autres() {
        let competences = vec![
            competence("COMP001", Some("Frontend")),
            competence("COMP002", None),
            competence("COMP003", Some("Frontend")),
        ];
        let groups = by_category(&competences);
        assert_eq!(groups["Frontend"].len(), 2);
        assert_eq!(groups[DEFAULT_CATEGORY][0].id, "COMP002");
    }
}
