//! Process-wide write guards, one per collection file

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

static FILE_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

/// Canonical form of a collection path
///
/// The deepest existing ancestor is resolved on disk and the rest is appended
/// lexically, so the key is the same before and after missing directories are created.
pub(crate) fn canonical_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let components: Vec<Component> = absolute.components().collect();
    for split in (1..=components.len()).rev() {
        let existing: PathBuf = components[..split].iter().collect();
        if let Ok(mut resolved) = existing.canonicalize() {
            for component in &components[split..] {
                match component {
                    Component::CurDir => {}
                    Component::ParentDir => {
                        resolved.pop();
                    }
                    other => resolved.push(other),
                }
            }
            return resolved;
        }
    }
    absolute
}

/// Guard shared by every store opened on the same file
pub(crate) fn lock_for(path: &Path) -> Arc<Mutex<()>> {
    let registry = FILE_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut locks = registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    locks
        .entry(canonical_path(path))
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_same_file_shares_lock() {
        let dir = TempDir::new().unwrap();
        let direct = dir.path().join("teams.json");
        let indirect = dir.path().join(".").join("teams.json");

        assert!(Arc::ptr_eq(&lock_for(&direct), &lock_for(&indirect)));
        assert!(!Arc::ptr_eq(
            &lock_for(&direct),
            &lock_for(&dir.path().join("users.json"))
        ));
    }

    #[test]
    fn test_lock_is_stable_across_directory_creation() {
        let dir = TempDir::new().unwrap();
        let before = lock_for(&dir.path().join("data").join(".").join("teams.json"));

        std::fs::create_dir(dir.path().join("data")).unwrap();
        let after = lock_for(&dir.path().join("data").join("teams.json"));
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_missing_directory_shares_lock() {
        let dir = TempDir::new().unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(dir.path(), &link).unwrap();

        let through_link = lock_for(&link.join("data").join("users.json"));
        std::fs::create_dir(dir.path().join("data")).unwrap();
        let direct = lock_for(&dir.path().join("data").join("users.json"));
        assert!(Arc::ptr_eq(&through_link, &direct));
    }
}
