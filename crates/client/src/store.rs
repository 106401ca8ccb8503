//! Local subscription store.
//!
//! Submissions are kept locally before (or instead of) reaching the backend.
//! Each record lives under its own `subscription:{uuid}` key in a simple
//! string key-value backend, the way a browser keeps entries in local
//! storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use coffee_box_core::SubscriptionSubmission;

const KEY_PREFIX: &str = "subscription:";

/// Errors from local storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid stored data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A string key-value backend.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Remove `key`; returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;

    /// All keys, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Backend persisted as a single JSON object on disk.
///
/// The whole file is rewritten on every change via a temporary file and a
/// rename, so a crash never leaves a half-written store behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(body) => serde_json::from_str(&body)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// A submission kept in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubscription {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub submission: SubscriptionSubmission,
}

/// Subscription records on top of a [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct LocalSubscriptionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> LocalSubscriptionStore<S> {
    #[must_use]
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Store a submission under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    pub fn save(
        &mut self,
        submission: SubscriptionSubmission,
    ) -> Result<StoredSubscription, StoreError> {
        let record = StoredSubscription {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            submission,
        };
        self.backend
            .set(&key_for(record.id), serde_json::to_string(&record)?)?;
        tracing::debug!(local_id = %record.id, "Subscription stored locally");
        Ok(record)
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or the record is corrupt.
    pub fn get(&self, id: Uuid) -> Result<Option<StoredSubscription>, StoreError> {
        self.backend
            .get(&key_for(id))?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StoreError::from)
    }

    /// All records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or a record is corrupt.
    pub fn list(&self) -> Result<Vec<StoredSubscription>, StoreError> {
        let mut records = Vec::new();
        for key in self.backend.keys()? {
            if !key.starts_with(KEY_PREFIX) {
                continue;
            }
            if let Some(raw) = self.backend.get(&key)? {
                records.push(serde_json::from_str::<StoredSubscription>(&raw)?);
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Delete a record; returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    pub fn remove(&mut self, id: Uuid) -> Result<bool, StoreError> {
        self.backend.remove(&key_for(id))
    }

    /// The underlying backend.
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }
}

fn key_for(id: Uuid) -> String {
    format!("{KEY_PREFIX}{id}")
}
