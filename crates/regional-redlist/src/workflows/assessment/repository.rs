use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{AssessmentId, AssessmentRecord, Stage};

/// Storage abstraction so the workflow service never touches a concrete store.
pub trait AssessmentRepository: Send + Sync {
    fn get(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError>;
    fn upsert(&self, record: AssessmentRecord) -> Result<(), RepositoryError>;
    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored assessment {id} could not be decoded: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Outbound notifications for progress badges, toasts, and similar listeners.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: AssessmentEvent) -> Result<(), EventError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssessmentEventKind {
    StageCompleted { stage: Stage },
    AssessmentCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentEvent {
    pub kind: AssessmentEventKind,
    pub assessment_id: AssessmentId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}
