//! Competence matrix drafts
//!
//! The matrix is never sent to the backend; the CLI keeps it in ~/.effectif/matrix.json

use anyhow::{Context, Result};
use effectif_proto::CompetenceMatrix;
use std::fs;
use std::path::{Path, PathBuf};

pub struct MatrixDraft {
    path: PathBuf,
}

impl MatrixDraft {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(Self::new(home.join(".effectif").join("matrix.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the draft; an absent file is an empty matrix
    pub fn load(&self) -> Result<CompetenceMatrix> {
        if !self.path.exists() {
            return Ok(CompetenceMatrix::new());
        }

        let json = fs::read_to_string(&self.path)
            .context(format!("Failed to read matrix draft: {:?}", self.path))?;
        serde_json::from_str(&json).context(format!("Failed to parse matrix draft: {:?}", self.path))
    }

    pub fn save(&self, matrix: &CompetenceMatrix) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(matrix).context("Failed to serialize matrix")?;
        fs::write(&self.path, json)
            .context(format!("Failed to write matrix draft: {:?}", self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effectif_proto::{Competence, MatrixEntry, Note, PersonneSummary};
    use tempfile::TempDir;

    #[test]
    fn test_missing_draft_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let draft = MatrixDraft::new(temp_dir.path().join("matrix.json"));
        assert!(draft.load().unwrap().is_empty());
    }

    #[test]
    fn test_draft_persists_upserts() {
        let temp_dir = TempDir::new().unwrap();
        let draft = MatrixDraft::new(temp_dir.path().join("matrix.json"));

        let mut matrix = draft.load().unwrap();
        matrix.upsert(MatrixEntry {
            personne: PersonneSummary {
                matricule: "EMP12345".to_string(),
                name: "Doe".to_string(),
                surname: "John".to_string(),
            },
            competence: Competence {
                id: "RUST".to_string(),
                label: "Rust".to_string(),
                description: None,
                category: Some("Langages".to_string()),
            },
            note: Note::new("N3", 3, "Avancé"),
        });
        draft.save(&matrix).unwrap();

        let reloaded = draft.load().unwrap();
        assert_eq!(reloaded, matrix);
        assert_eq!(reloaded.level("EMP12345", "RUST").unwrap().value, 3);
    }
}
