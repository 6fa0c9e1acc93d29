//! Local JSON datastore
//!
//! Teams, users and groupements can be kept in a data directory instead of the remote
//! backend. Each collection is a single file (`teams.json`, `users.json`,
//! `groupements.json`) holding a JSON array of records in their domain shape.
//!
//! Writes are serialized per file within a process. Separate processes sharing a data
//! directory can still overwrite each other's changes.

pub mod error;
pub mod json_store;
mod lock;

use std::fs;
use std::path::{Path, PathBuf};

use effectif_proto::{Groupement, Team, User};
use tracing::info;

pub use error::StoreError;
pub use json_store::JsonStore;

pub const TEAMS_FILE: &str = "teams.json";
pub const USERS_FILE: &str = "users.json";
pub const GROUPEMENTS_FILE: &str = "groupements.json";

/// The three collections of a data directory
pub struct LocalStore {
    data_dir: PathBuf,
    pub teams: JsonStore<Team>,
    pub users: JsonStore<User>,
    pub groupements: JsonStore<Groupement>,
}

impl LocalStore {
    /// Open a data directory, creating it if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| StoreError::Io {
            path: data_dir.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            teams: JsonStore::new(data_dir.join(TEAMS_FILE)),
            users: JsonStore::new(data_dir.join(USERS_FILE)),
            groupements: JsonStore::new(data_dir.join(GROUPEMENTS_FILE)),
            data_dir,
        })
    }

    /// Default data directory (~/.effectif/data)
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".effectif").join("data"))
    }

    /// Create empty collection files where missing
    pub fn init(&self) -> Result<(), StoreError> {
        self.teams.init()?;
        self.users.init()?;
        self.groupements.init()?;
        info!("Data directory ready at {:?}", self.data_dir);
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
