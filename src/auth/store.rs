//! Durable credential storage.
//!
//! Storage is modeled as a flat map of named string slots. The contract has
//! no error surface: storage is assumed available, and backend failures are
//! logged and swallowed so that session maintenance can never crash a caller.
//! Callers must not assume entries are encrypted or size-unlimited.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use keyring::Entry;
use tracing::warn;

/// Directory name under the platform data dir for the default file store
const APP_DIR: &str = "sessionkit";

/// File name of the default file store
const STORE_FILE: &str = "credentials.json";

/// Durable mapping of named keys to string values, surviving process
/// restarts. No transactional guarantee is provided across keys; overlapping
/// writes are last-write-wins.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// File-backed store: a single JSON object on disk, re-read on every access
/// so concurrent clients observe each other's writes.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default store location under the platform data directory.
    pub fn default_path() -> Option<PathBuf> {
        Some(dirs::data_dir()?.join(APP_DIR).join(STORE_FILE))
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return BTreeMap::new(), // missing file is an empty store
        };
        match serde_json::from_str(&contents) {
            Ok(map) => map,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "Unreadable credential file, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if let Err(error) = std::fs::create_dir_all(parent) {
                warn!(path = %self.path.display(), %error, "Failed to create credential directory");
                return;
            }
        }
        let contents = match serde_json::to_string_pretty(map) {
            Ok(contents) => contents,
            Err(error) => {
                warn!(%error, "Failed to serialize credential map");
                return;
            }
        };
        if let Err(error) = std::fs::write(&self.path, contents) {
            warn!(path = %self.path.display(), %error, "Failed to write credential file");
        }
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map);
    }

    fn remove(&self, key: &str) {
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            self.write_map(&map);
        }
    }
}

/// OS-keychain store: each key becomes a keyring entry under a fixed
/// service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Option<Entry> {
        match Entry::new(&self.service, key) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(key, %error, "Failed to create keyring entry");
                None
            }
        }
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entry(key)?.get_password().ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(entry) = self.entry(key) {
            if let Err(error) = entry.set_password(value) {
                warn!(key, %error, "Failed to store credential in keychain");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(entry) = self.entry(key) {
            match entry.delete_credential() {
                // Missing entries are fine; removal is idempotent
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(error) => warn!(key, %error, "Failed to delete credential from keychain"),
            }
        }
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.map.lock() {
            map.remove(key);
        }
    }
}
