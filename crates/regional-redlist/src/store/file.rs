use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;

use super::{Collections, KeyValueStore, StoreError};

/// Store persisted as one JSON document. Every save rewrites the file through a
/// temporary sibling so readers never observe a half-written document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    collections: Mutex<Collections>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collections = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Collections::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Collections::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(path = %path.display(), collections = collections.len(), "opened json store");
        Ok(Self {
            path,
            collections: Mutex::new(collections),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, collections: &Collections) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let body = serde_json::to_vec_pretty(collections)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "flushed json store");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard
            .get(collection)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn save(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let mut guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        let previous = guard
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value);

        if let Err(err) = self.flush(&guard) {
            let entries = guard.entry(collection.to_string()).or_default();
            match previous {
                Some(previous) => {
                    entries.insert(key.to_string(), previous);
                }
                None => {
                    entries.remove(key);
                }
            }
            return Err(err);
        }

        Ok(())
    }

    fn entries(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard
            .get(collection)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
