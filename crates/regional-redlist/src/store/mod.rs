//! Key-value persistence for assessment records and learner progress.

mod file;
mod memory;
mod progress;
mod repository;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use progress::{ModuleProgress, ProgressTracker, RegionReview};
pub use repository::KeyValueAssessmentRepository;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

pub const ASSESSMENTS: &str = "assessments";
pub const MODULE_PROGRESS: &str = "module-progress";
pub const REVIEWED_REGIONS: &str = "reviewed-regions";

/// Collection name to keyed JSON documents.
pub(crate) type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// Plain structured-data store keyed by collection and entry key.
pub trait KeyValueStore: Send + Sync {
    fn load(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;
    fn save(&self, collection: &str, key: &str, value: Value) -> Result<(), StoreError>;
    fn entries(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}
