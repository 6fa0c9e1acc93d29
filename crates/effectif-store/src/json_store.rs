//! One JSON array per collection file

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use effectif_proto::Keyed;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::lock::lock_for;

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Collection of records stored as a pretty-printed JSON array
///
/// Every read-modify-write cycle holds the file's guard, and the new content replaces
/// the file through a rename, so writers in this process never lose updates.
pub struct JsonStore<T> {
    path: PathBuf,
    guard: Arc<Mutex<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Keyed + Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let guard = lock_for(&path);
        Self {
            path,
            guard,
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with an empty collection unless it already exists
    pub fn init(&self) -> Result<(), StoreError> {
        let _guard = self.lock();
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        self.write(&[])?;
        info!("Initialized {:?}", self.path);
        Ok(())
    }

    /// All records; a missing or malformed file is an error
    pub fn list(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.lock();
        self.read()
    }

    pub fn get(&self, key: &str) -> Result<T, StoreError> {
        validate_key(key)?;
        self.list()?
            .into_iter()
            .find(|r| r.key() == key)
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    /// Replace the record with the same key, or append it; returns the new collection
    pub fn save(&self, record: T) -> Result<Vec<T>, StoreError> {
        validate_key(record.key())?;
        let _guard = self.lock();

        let mut records = self.read()?;
        let key = record.key().to_string();
        match records.iter().position(|r| r.key() == key) {
            Some(index) => {
                debug!("Replacing '{}' in {:?}", key, self.path);
                records[index] = record;
            }
            None => {
                debug!("Appending '{}' to {:?}", key, self.path);
                records.push(record);
            }
        }

        self.write(&records)?;
        info!("Saved '{}' to {:?}", key, self.path);
        Ok(records)
    }

    /// Remove a record; an unknown key leaves the file untouched
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let _guard = self.lock();

        let mut records = self.read()?;
        let index = records
            .iter()
            .position(|r| r.key() == key)
            .ok_or_else(|| {
                warn!("Cannot delete '{}': not in {:?}", key, self.path);
                StoreError::NotFound {
                    key: key.to_string(),
                }
            })?;
        records.remove(index);

        self.write(&records)?;
        info!("Deleted '{}' from {:?}", key, self.path);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> Result<Vec<T>, StoreError> {
        let json = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, e))?;
        serde_json::from_str(&json).map_err(|e| StoreError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }

    fn write(&self, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records).map_err(|e| StoreError::Malformed {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use effectif_proto::Groupement;
    use tempfile::TempDir;

    fn groupement(code: &str, label: &str) -> Groupement {
        Groupement {
            code: code.to_string(),
            label: label.to_string(),
            direction: None,
        }
    }

    fn create_test_store() -> (JsonStore<Groupement>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::new(temp_dir.path().join("groupements.json"));
        store.init().unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store: JsonStore<Groupement> = JsonStore::new(temp_dir.path().join("absent.json"));
        assert!(matches!(store.list(), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let (store, _dir) = create_test_store();
        fs::write(store.path(), "{ not an array").unwrap();
        assert!(matches!(store.list(), Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_save_appends_then_replaces() {
        let (store, _dir) = create_test_store();

        store.save(groupement("G1", "Nord")).unwrap();
        store.save(groupement("G2", "Sud")).unwrap();
        let records = store.save(groupement("G1", "Nord-Est")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, "Nord-Est");
        assert_eq!(store.list().unwrap(), records);
        assert_eq!(store.get("G2").unwrap().label, "Sud");
    }

    #[test]
    fn test_delete_unknown_key_leaves_file_unchanged() {
        let (store, _dir) = create_test_store();
        store.save(groupement("G1", "Nord")).unwrap();
        let before = fs::read(store.path()).unwrap();

        let err = store.delete("G9").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(fs::read(store.path()).unwrap(), before);
    }

    #[test]
    fn test_delete_removes_record() {
        let (store, _dir) = create_test_store();
        store.save(groupement("G1", "Nord")).unwrap();
        store.save(groupement("G2", "Sud")).unwrap();

        store.delete("G1").unwrap();
        let codes: Vec<_> = store.list().unwrap().into_iter().map(|g| g.code).collect();
        assert_eq!(codes, vec!["G2"]);
    }

    #[test]
    fn test_blank_key_rejected() {
        let (store, _dir) = create_test_store();
        assert!(matches!(
            store.save(groupement(" ", "Blank")),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_init_keeps_existing_records() {
        let (store, _dir) = create_test_store();
        store.save(groupement("G1", "Nord")).unwrap();
        store.init().unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_file_is_pretty_json_array() {
        let (store, _dir) = create_test_store();
        store.save(groupement("G1", "Nord")).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.starts_with("[\n"));
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value[0]["code"], "G1");
    }
}
