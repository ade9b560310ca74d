use std::sync::Mutex;

use serde_json::Value;

use super::{Collections, KeyValueStore, StoreError};

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
}

impl KeyValueStore for MemoryStore {
    fn load(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        let guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard
            .get(collection)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    fn save(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let mut guard = self.collections.lock().map_err(|_| StoreError::Poisoned)?;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), value);
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_keys_load_as_none() {
        let store = MemoryStore::default();
        assert!(store.load("assessments", "missing").expect("load").is_none());
        assert!(store.entries("assessments").expect("entries").is_empty());
    }

    #[test]
    fn last_write_wins() {
        let store = MemoryStore::default();
        store
            .save("assessments", "a-1", json!({ "version": 1 }))
            .expect("save");
        store
            .save("assessments", "a-1", json!({ "version": 2 }))
            .expect("save");

        let value = store.load("assessments", "a-1").expect("load");
        assert_eq!(value, Some(json!({ "version": 2 })));
        assert_eq!(store.entries("assessments").expect("entries").len(), 1);
    }
}
