//! Persistent credential storage.
//!
//! The credential lives under a single fixed key. Absence means anonymous;
//! logout removes the key and leaves any other entries untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::session::{Credential, Session};

/// Storage key holding the bearer credential.
pub const CREDENTIAL_KEY: &str = "bookstore.token";

/// Errors raised by credential stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the backing file failed.
    #[error("failed to read credential store")]
    Read {
        /// Path of the backing file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Writing the backing file failed.
    #[error("failed to write credential store")]
    Write {
        /// Path of the backing file.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The backing file was not a JSON object.
    #[error("credential store is corrupt")]
    Corrupt {
        /// Path of the backing file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

/// Client-side persistent storage for the bearer credential.
pub trait CredentialStore {
    /// Load the stored credential, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be read.
    fn load(&self) -> Result<Option<Credential>, StoreError>;

    /// Persist a credential, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be written.
    fn save(&self, credential: &Credential) -> Result<(), StoreError>;

    /// Remove the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be written.
    fn clear(&self) -> Result<(), StoreError>;

    /// Build the page-load session from the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing storage cannot be read.
    fn session(&self) -> Result<Session, StoreError> {
        Ok(self
            .load()?
            .map_or_else(Session::anonymous, Session::with_credential))
    }
}

/// JSON-file backed store, one object keyed by entry name.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the file at `path`; the file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        serde_json::from_slice::<Map<String, Value>>(&bytes).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let body = serde_json::to_vec_pretty(entries)
            .map_err(|err| write_err(io::Error::new(io::ErrorKind::InvalidData, err)))?;
        write_private(&self.path, &body).map_err(write_err)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .and_then(Credential::new))
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(
            CREDENTIAL_KEY.to_string(),
            Value::String(credential.expose().to_string()),
        );
        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), "credential stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), "credential cleared");
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, body: &[u8]) -> io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files that already existed.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(body)
}

#[cfg(not(unix))]
fn write_private(path: &Path, body: &[u8]) -> io::Result<()> {
    fs::write(path, body)
}

/// In-memory store for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    /// Store pre-populated with `credential`.
    #[must_use]
    pub const fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
