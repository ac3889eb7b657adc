//! Persistent credential slots.
//!
//! DESIGN
//! ======
//! Two independent string values, `access_token` and `refresh_token`, in a
//! key-value store that outlives the process. A missing key is a normal,
//! meaningful state. [`FileStore`] keeps them as one JSON object on disk and
//! rewrites it through a temp file + rename so a crash never leaves half a
//! file behind. [`MemoryStore`] backs tests and throwaway sessions.

use std::collections::BTreeMap;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The two credential slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
}

impl CredentialKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// Errors produced by credential store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential file I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("credential file {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value storage for the credential slots.
pub trait CredentialStore: Send + Sync {
    /// Read a slot; `Ok(None)` when it was never written or was removed.
    ///
    /// # Errors
    ///
    /// Backend failure (I/O, corrupt data).
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;

    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Backend failure (I/O, corrupt data).
    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;

    /// Remove a slot. Removing an absent slot succeeds.
    ///
    /// # Errors
    ///
    /// Backend failure (I/O, corrupt data).
    fn remove(&self, key: CredentialKey) -> Result<(), StoreError>;
}

// =============================================================================
// MEMORY
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<BTreeMap<CredentialKey, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the given slots.
    #[must_use]
    pub fn with(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut slots = BTreeMap::new();
        if let Some(access) = access {
            slots.insert(CredentialKey::AccessToken, access.to_owned());
        }
        if let Some(refresh) = refresh {
            slots.insert(CredentialKey::RefreshToken, refresh.to_owned());
        }
        Self { slots: Mutex::new(slots) }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, BTreeMap<CredentialKey, String>> {
        self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.slots().get(&key).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.slots().insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.slots().remove(&key);
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// JSON-file store: `{"access_token": "...", "refresh_token": "..."}`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })
    }

    fn save(&self, slots: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(slots)
            .map_err(|source| StoreError::Corrupt { path: self.path.clone(), source })?;
        let tmp = self.path.with_extension("json.tmp");
        write_private(&tmp, &json).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }

    fn update<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.write_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut slots = self.load()?;
        if mutate(&mut slots) {
            self.save(&slots)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key.as_str()))
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.update(|slots| {
            slots.insert(key.as_str().to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: CredentialKey) -> Result<(), StoreError> {
        self.update(|slots| slots.remove(key.as_str()).is_some())
    }
}

/// Write `contents` to `path` readable by the owner only.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path)?;
    // `mode` only applies on creation; a stale temp file keeps its old bits.
    #[cfg(unix)]
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
