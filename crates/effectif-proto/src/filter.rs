//! Case-insensitive search helpers for list views

use crate::model::{Personne, PersonneSummary, Team};

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Filter personnes on identifier, name, surname, role or team name
///
/// An empty query keeps every personne.
pub fn search_personnes<'a>(personnes: &'a [Personne], query: &str) -> Vec<&'a Personne> {
    let needle = query.trim().to_lowercase();
    personnes
        .iter()
        .filter(|p| {
            needle.is_empty()
                || contains(&p.identifier, &needle)
                || contains(&p.name, &needle)
                || contains(&p.surname, &needle)
                || p.role.as_deref().is_some_and(|r| contains(r, &needle))
                || p
                    .team
                    .as_ref()
                    .and_then(|t| t.name.as_deref())
                    .is_some_and(|n| contains(n, &needle))
        })
        .collect()
}

/// Personnes that can still be added to `team`
pub fn available_members(team: &Team, personnes: Vec<Personne>) -> Vec<Personne> {
    personnes
        .into_iter()
        .filter(|p| !team.has_member(&p.identifier))
        .collect()
}

/// Filter candidate members on name, surname, identifier or role
pub fn search_members<'a>(candidates: &'a [Personne], query: &str) -> Vec<&'a Personne> {
    let needle = query.trim().to_lowercase();
    candidates
        .iter()
        .filter(|p| {
            needle.is_empty()
                || contains(&p.name, &needle)
                || contains(&p.surname, &needle)
                || contains(&p.identifier, &needle)
                || p.role.as_deref().is_some_and(|r| contains(r, &needle))
        })
        .collect()
}

impl PersonneSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}
