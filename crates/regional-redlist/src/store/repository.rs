use std::sync::Arc;

use tracing::warn;

use crate::workflows::assessment::{
    AssessmentId, AssessmentRecord, AssessmentRepository, RepositoryError,
};

use super::{KeyValueStore, StoreError, ASSESSMENTS};

/// Assessment repository over the `assessments` collection of any key-value store.
#[derive(Clone)]
pub struct KeyValueAssessmentRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KeyValueAssessmentRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl From<StoreError> for RepositoryError {
    fn from(value: StoreError) -> Self {
        RepositoryError::Unavailable(value.to_string())
    }
}

fn decode(key: &str, value: serde_json::Value) -> Result<AssessmentRecord, RepositoryError> {
    serde_json::from_value(value).map_err(|err| RepositoryError::Corrupt {
        id: key.to_string(),
        reason: err.to_string(),
    })
}

impl AssessmentRepository for KeyValueAssessmentRepository {
    fn get(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        match self.store.load(ASSESSMENTS, id.as_str())? {
            Some(value) => Ok(Some(decode(id.as_str(), value)?)),
            None => Ok(None),
        }
    }

    fn upsert(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(&record).map_err(|err| RepositoryError::Corrupt {
            id: record.id.0.clone(),
            reason: err.to_string(),
        })?;
        self.store.save(ASSESSMENTS, record.id.as_str(), value)?;
        Ok(())
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let mut records: Vec<AssessmentRecord> = self
            .store
            .entries(ASSESSMENTS)?
            .into_iter()
            .filter_map(|(key, value)| match decode(&key, value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(assessment_id = %key, error = %err, "skipping unreadable assessment");
                    None
                }
            })
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }
}
