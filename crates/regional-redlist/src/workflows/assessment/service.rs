use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{AssessmentId, AssessmentRecord, AssessmentStatus, Stage};
use super::repository::{
    AssessmentEvent, AssessmentEventKind, AssessmentRepository, EventError, EventPublisher,
    RepositoryError,
};
use super::summary::AssessmentSummary;
use super::workflow::{
    AssessmentWorkflow, StageDraft, StagePreview, Transition, WorkflowError, WorkflowSnapshot,
};

/// Metadata supplied when starting an assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssessment {
    #[serde(default)]
    pub taxon_name: String,
    #[serde(default)]
    pub scientific_name: String,
}

/// Service composing the repository, event publisher, and per-assessment workflow sessions.
///
/// Each open session holds the in-progress drafts for one assessment. Confirmed data only
/// reaches the repository through forward transitions and the terminal action.
pub struct AssessmentService<R, P> {
    repository: Arc<R>,
    events: Arc<P>,
    sessions: Mutex<HashMap<AssessmentId, AssessmentWorkflow>>,
}

static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_assessment_id() -> AssessmentId {
    let sequence = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AssessmentId(format!(
        "assessment-{}-{sequence:04}",
        Utc::now().format("%Y%m%d%H%M%S")
    ))
}

impl<R, P> AssessmentService<R, P>
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    pub fn new(repository: Arc<R>, events: Arc<P>) -> Self {
        Self {
            repository,
            events,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create and persist a fresh draft, opening a session on it.
    pub fn create(
        &self,
        request: NewAssessment,
    ) -> Result<AssessmentRecord, AssessmentServiceError> {
        let record = AssessmentRecord::new_draft(
            next_assessment_id(),
            request.taxon_name.trim(),
            request.scientific_name.trim(),
            Utc::now(),
        );
        self.repository.upsert(record.clone())?;
        info!(assessment_id = %record.id, taxon = %record.taxon_name, "assessment created");

        let mut sessions = self.lock_sessions()?;
        sessions.insert(record.id.clone(), AssessmentWorkflow::resume(record.clone()));
        Ok(record)
    }

    /// Open (or resume) the session for `id`. An unknown id starts a new draft.
    pub fn open(&self, id: &AssessmentId) -> Result<WorkflowSnapshot, AssessmentServiceError> {
        self.with_session(id, |workflow| Ok(workflow.snapshot()))
    }

    pub fn snapshot(&self, id: &AssessmentId) -> Result<WorkflowSnapshot, AssessmentServiceError> {
        self.open(id)
    }

    pub fn update_draft(
        &self,
        id: &AssessmentId,
        draft: StageDraft,
    ) -> Result<StagePreview, AssessmentServiceError> {
        self.with_session(id, |workflow| Ok(workflow.update_draft(draft)?))
    }

    pub fn advance(&self, id: &AssessmentId) -> Result<Transition, AssessmentServiceError> {
        self.with_session(id, |workflow| {
            let checkpoint = workflow.clone();
            let transition = workflow.advance(Utc::now());
            match &transition {
                Transition::Advanced { from, to } => {
                    if let Err(err) = self.repository.upsert(workflow.record().clone()) {
                        *workflow = checkpoint;
                        return Err(err.into());
                    }
                    info!(
                        assessment_id = %id,
                        from = from.number(),
                        to = to.number(),
                        status = workflow.record().status.label(),
                        "assessment stage confirmed"
                    );
                    self.publish_stage_completed(workflow.record(), *from, *to)?;
                }
                Transition::Held { stage, blockers } => {
                    debug!(
                        assessment_id = %id,
                        stage = stage.number(),
                        ?blockers,
                        "assessment stage held"
                    );
                }
            }
            Ok(transition)
        })
    }

    pub fn back(&self, id: &AssessmentId) -> Result<Stage, AssessmentServiceError> {
        self.with_session(id, |workflow| Ok(workflow.back()))
    }

    /// Run the terminal action, persist the frozen summary, and announce completion.
    ///
    /// The session is released once the completed record is stored; later calls reload the
    /// frozen record from the repository.
    pub fn complete(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentSummary, AssessmentServiceError> {
        let summary = self.complete_session(id)?;
        self.lock_sessions()?.remove(id);
        debug!(assessment_id = %id, "completed assessment session released");
        Ok(summary)
    }

    fn complete_session(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentSummary, AssessmentServiceError> {
        self.with_session(id, |workflow| {
            let checkpoint = workflow.clone();
            let summary = workflow.complete(Utc::now())?;
            if let Err(err) = self.repository.upsert(workflow.record().clone()) {
                *workflow = checkpoint;
                return Err(err.into());
            }
            info!(
                assessment_id = %id,
                category = %summary.display_category(),
                "assessment completed"
            );

            let mut details = BTreeMap::new();
            details.insert(
                "final_category".to_string(),
                summary.final_category.code().to_string(),
            );
            details.insert("criteria_met".to_string(), summary.criteria_met.clone());
            details.insert(
                "adjustment_steps".to_string(),
                summary.adjustment_steps.to_string(),
            );
            self.events.publish(AssessmentEvent {
                kind: AssessmentEventKind::AssessmentCompleted,
                assessment_id: id.clone(),
                details,
            })?;

            Ok(summary)
        })
    }

    /// Drop the in-memory session without merging its drafts.
    pub fn discard(&self, id: &AssessmentId) -> Result<bool, AssessmentServiceError> {
        let mut sessions = self.lock_sessions()?;
        let discarded = sessions.remove(id).is_some();
        if discarded {
            debug!(assessment_id = %id, "assessment session discarded");
        }
        Ok(discarded)
    }

    pub fn get(
        &self,
        id: &AssessmentId,
    ) -> Result<Option<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.get(id)?)
    }

    pub fn list(&self) -> Result<Vec<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.repository.list()?)
    }

    /// Frozen export summary of a completed assessment.
    pub fn summary(
        &self,
        id: &AssessmentId,
    ) -> Result<AssessmentSummary, AssessmentServiceError> {
        let record = self
            .repository
            .get(id)?
            .ok_or_else(|| AssessmentServiceError::NotFound(id.clone()))?;

        match (record.status, record.summary) {
            (AssessmentStatus::Completed, Some(summary)) => Ok(summary),
            (status, _) => Err(AssessmentServiceError::NotCompleted {
                id: id.clone(),
                status: status.label(),
            }),
        }
    }

    fn with_session<T>(
        &self,
        id: &AssessmentId,
        action: impl FnOnce(&mut AssessmentWorkflow) -> Result<T, AssessmentServiceError>,
    ) -> Result<T, AssessmentServiceError> {
        let mut sessions = self.lock_sessions()?;
        if !sessions.contains_key(id) {
            let workflow = self.load_workflow(id)?;
            sessions.insert(id.clone(), workflow);
        }

        match sessions.get_mut(id) {
            Some(workflow) => action(workflow),
            None => Err(AssessmentServiceError::SessionUnavailable),
        }
    }

    fn load_workflow(&self, id: &AssessmentId) -> Result<AssessmentWorkflow, AssessmentServiceError> {
        let record = match self.repository.get(id)? {
            Some(record) => record,
            None => {
                let record = AssessmentRecord::new_draft(id.clone(), "", "", Utc::now());
                self.repository.upsert(record.clone())?;
                info!(assessment_id = %id, "no stored assessment, started new draft");
                record
            }
        };

        Ok(AssessmentWorkflow::resume(record))
    }

    fn lock_sessions(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<AssessmentId, AssessmentWorkflow>>, AssessmentServiceError>
    {
        self.sessions
            .lock()
            .map_err(|_| AssessmentServiceError::SessionUnavailable)
    }

    fn publish_stage_completed(
        &self,
        record: &AssessmentRecord,
        from: Stage,
        to: Stage,
    ) -> Result<(), EventError> {
        let mut details = BTreeMap::new();
        details.insert("stage".to_string(), from.label().to_string());
        details.insert("next_stage".to_string(), to.label().to_string());
        details.insert("status".to_string(), record.status.label().to_string());

        self.events.publish(AssessmentEvent {
            kind: AssessmentEventKind::StageCompleted { stage: from },
            assessment_id: record.id.clone(),
            details,
        })
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("assessment {0} not found")]
    NotFound(AssessmentId),
    #[error("assessment {id} is {status}, not completed")]
    NotCompleted { id: AssessmentId, status: &'static str },
    #[error("assessment sessions are unavailable")]
    SessionUnavailable,
}
