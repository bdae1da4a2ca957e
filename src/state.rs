use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage key holding the viewed story ids.
pub const VIEWED_KEY: &str = "viewedStories";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable string key/value storage.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Keys and values kept as one JSON object on disk. Every `set` rewrites the file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "state file unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    fn save(&self) -> Result<(), StorageError> {
        let data = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        self.save()
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Set of story ids that remembers insertion order. Ids are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ViewedSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl ViewedSet {
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if !self.members.insert(id.to_string()) {
            return false;
        }
        self.order.push(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

impl From<Vec<String>> for ViewedSet {
    fn from(ids: Vec<String>) -> Self {
        let mut set = ViewedSet::default();
        for id in &ids {
            set.insert(id);
        }
        set
    }
}

impl From<ViewedSet> for Vec<String> {
    fn from(set: ViewedSet) -> Self {
        set.order
    }
}

/// Viewed-story tracking backed by durable storage.
#[derive(Debug)]
pub struct ViewedStore<S: Storage> {
    storage: S,
    viewed: ViewedSet,
}

impl<S: Storage> ViewedStore<S> {
    pub fn load(storage: S) -> Self {
        let viewed = storage
            .get(VIEWED_KEY)
            .and_then(|raw| match serde_json::from_str::<ViewedSet>(&raw) {
                Ok(set) => Some(set),
                Err(e) => {
                    tracing::debug!(error = %e, "stored viewed set malformed, starting empty");
                    None
                }
            })
            .unwrap_or_default();
        tracing::debug!(count = viewed.len(), "viewed set loaded");
        Self { storage, viewed }
    }

    pub fn has(&self, id: &str) -> bool {
        self.viewed.contains(id)
    }

    pub fn viewed(&self) -> &ViewedSet {
        &self.viewed
    }

    /// Records `id` and persists the whole set. Returns false (and writes nothing)
    /// when the id was already viewed. Write failures are logged only.
    pub fn mark_viewed(&mut self, id: &str) -> bool {
        if !self.viewed.insert(id) {
            return false;
        }
        match serde_json::to_string(&self.viewed) {
            Ok(data) => {
                if let Err(e) = self.storage.set(VIEWED_KEY, data) {
                    tracing::warn!(story = id, error = %e, "failed to persist viewed stories");
                }
            }
            Err(e) => tracing::warn!(story = id, error = %e, "failed to encode viewed stories"),
        }
        true
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[cfg(test)]
    pub fn into_storage(self) -> S {
        self.storage
    }
}
