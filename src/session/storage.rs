//! Durable key/value persistence for the client session. The manager is the
//! only writer; implementations need no locking beyond what keeps a single
//! `set` or `remove` from tearing.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use thiserror::Error;
use ulid::Ulid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait SessionStorage: Send + Sync {
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns an error if the value could not be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Stores all keys in one JSON object file.
///
/// Every write replaces the file through a sibling temp file and a rename, so
/// readers see either the old or the new object.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension(format!("{}.tmp", Ulid::new()));
        let contents = serde_json::to_string_pretty(entries)?;

        if let Err(e) = write_private(&tmp, &contents).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        Ok(())
    }
}

/// Creates `path`, readable and writable by the owner only on Unix.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.load() {
            Ok(mut entries) => {
                if entries.remove(key).is_some() {
                    self.save(&entries)?;
                }
                Ok(())
            }
            // an unreadable file holds nothing worth keeping
            Err(StorageError::Corrupt(_)) => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("bondy-login-{}", Ulid::new()))
            .join("session.json")
    }

    #[test]
    fn memory_storage_round_trips_and_removes() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("authToken").expect("get"), None);

        storage.set("authToken", "abc").expect("set");
        assert_eq!(storage.get("authToken").expect("get"), Some("abc".to_string()));

        storage.remove("authToken").expect("remove");
        storage.remove("authToken").expect("second remove");
        assert_eq!(storage.get("authToken").expect("get"), None);
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let path = temp_path();

        FileStorage::new(&path).set("authToken", "abc").expect("set");
        FileStorage::new(&path).set("userData", "{}").expect("set");

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("authToken").expect("get"), Some("abc".to_string()));
        assert_eq!(reopened.get("userData").expect("get"), Some("{}".to_string()));

        reopened.remove("authToken").expect("remove");
        assert_eq!(reopened.get("authToken").expect("get"), None);
        assert_eq!(reopened.get("userData").expect("get"), Some("{}".to_string()));

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let storage = FileStorage::new(temp_path());
        assert_eq!(storage.get("authToken").expect("get"), None);
        storage.remove("authToken").expect("remove");
    }

    #[test]
    fn corrupt_file_is_reported_and_removable() {
        let path = temp_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("mkdir");
        }
        fs::write(&path, "{not json").expect("write");

        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get("authToken"), Err(StorageError::Corrupt(_))));

        storage.remove("authToken").expect("remove");
        assert!(!path.exists());

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_path();
        let storage = FileStorage::new(&path);
        storage.set("authToken", "abc").expect("set");
        storage.set("userData", "{}").expect("set");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        if let Some(dir) = path.parent() {
            let leftovers = fs::read_dir(dir).expect("read dir").count();
            assert_eq!(leftovers, 1);
            let _ = fs::remove_dir_all(dir);
        }
    }
}
