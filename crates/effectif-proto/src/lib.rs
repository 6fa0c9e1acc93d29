//! Effectif data definitions
//!
//! This crate defines the domain records shown to staff, the wire records exchanged
//! with the personnel backend, the mapping between the two, and the in-memory
//! competence matrix.

pub mod filter;
pub mod mapping;
pub mod matrix;
pub mod model;
pub mod wire;

pub use filter::{available_members, search_members, search_personnes};
pub use mapping::{join_user, WireMapping, UNKNOWN_NAME, UNKNOWN_SURNAME};
pub use matrix::{by_category, CompetenceMatrix, MatrixEntry, DEFAULT_CATEGORY};
pub use model::*;

/// Default backend origin
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Records identified by a natural key (code, identifiant or matricule)
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Team {
    fn key(&self) -> &str {
        &self.code
    }
}

impl Keyed for Groupement {
    fn key(&self) -> &str {
        &self.code
    }
}

impl Keyed for Personne {
    fn key(&self) -> &str {
        &self.identifier
    }
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.matricule
    }
}
