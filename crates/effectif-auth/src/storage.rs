//! Session persistence
//!
//! The CLI keeps its session in ~/.effectif/session.json

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::SessionStoreError;
use crate::session::Session;

/// Where the current session lives between invocations
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionStoreError>;
    fn save(&self, session: &Session) -> Result<(), SessionStoreError>;
    fn clear(&self) -> Result<(), SessionStoreError>;
}

fn io_error(path: &Path, err: std::io::Error) -> SessionStoreError {
    SessionStoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// JSON file holding the serialized session
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Session file under the user's home directory
    pub fn default_location() -> Result<Self, SessionStoreError> {
        let home = dirs::home_dir().ok_or(SessionStoreError::NoHomeDirectory)?;
        Ok(Self::new(home.join(".effectif").join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        // No file means no session
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        let session = serde_json::from_str(&json)
            .map_err(|e| SessionStoreError::Corrupted(e.to_string()))?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| SessionStoreError::Corrupted(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| io_error(&self.path, e))?;

        debug!("Session saved to {:?}", self.path);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.path, e)),
        }
    }
}

/// Session kept in memory only
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(self.slot().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effectif_proto::{AuthorizedUser, Habilitation};
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(AuthorizedUser {
            matricule: "EMP12345".to_string(),
            habilitations: vec![Habilitation::new("READ")],
        })
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.json"));

        assert!(storage.load().unwrap().is_none());

        let session = session();
        storage.save(&session).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // Clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn test_corrupted_session_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert!(matches!(
            storage.load(),
            Err(SessionStoreError::Corrupted(_))
        ));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemorySessionStorage::new();
        storage.save(&session()).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().matricule(), "EMP12345");
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
