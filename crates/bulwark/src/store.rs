//! Persistence of known accounts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bulwark_common::{AccountRecord, BulwarkError};
use serde::Serialize;

/// Username -> account record
pub type Users = BTreeMap<String, AccountRecord>;

/// Key-value store holding every known account.
///
/// The engine loads it once at construction and rewrites it in full after
/// every mutating verification.
pub trait UserStore {
    /// A store that does not exist yet loads as empty
    fn load(&self) -> Result<Users, BulwarkError>;

    fn save(&self, users: &Users) -> Result<(), BulwarkError>;
}

/// JSON file store (`users.json`), pretty-printed with a 4-space indent
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserStore for JsonFileStore {
    fn load(&self) -> Result<Users, BulwarkError> {
        if !self.path.exists() {
            return Ok(Users::new());
        }

        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            BulwarkError::Store(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&data).map_err(|e| {
            BulwarkError::Store(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, users: &Users) -> Result<(), BulwarkError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        users
            .serialize(&mut ser)
            .map_err(|e| BulwarkError::Store(format!("failed to encode users: {}", e)))?;

        std::fs::write(&self.path, buf).map_err(|e| {
            BulwarkError::Store(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
pub use memory::{FailingStore, MemoryStore};
