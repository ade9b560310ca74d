use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::assessment::domain::{
    Answer, AssessmentId, AssessmentRecord, EligibilityAnswers, PopulationTrend,
    RegionalMetrics, RescueAnswers, RescueEffect,
};
use crate::workflows::assessment::repository::{
    AssessmentEvent, AssessmentRepository, EventError, EventPublisher, RepositoryError,
};
use crate::workflows::assessment::workflow::{EligibilityDraft, RescueDraft};
use crate::workflows::assessment::{assessment_router, AssessmentService};

pub(super) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn draft_record(id: &str) -> AssessmentRecord {
    AssessmentRecord::new_draft(
        AssessmentId(id.to_string()),
        "Iberian lynx",
        "Lynx pardinus",
        at(8),
    )
}

pub(super) fn eligible_answers() -> EligibilityAnswers {
    EligibilityAnswers {
        is_native: Answer::Yes,
        has_breeding: Answer::Yes,
        has_visiting: Answer::Unanswered,
        is_vagrant: Answer::No,
    }
}

pub(super) fn eligibility_draft() -> EligibilityDraft {
    EligibilityDraft {
        answers: eligible_answers(),
        rationale: "Resident breeding population confirmed by regional surveys.".to_string(),
    }
}

/// Metrics that trip every sub-criterion at the CR tier.
pub(super) fn critical_metrics() -> RegionalMetrics {
    RegionalMetrics {
        population_size: Some(200.0),
        population_trend: PopulationTrend::Declining,
        decline_percent: Some(85.0),
        eoo: Some(50.0),
        aoo: None,
        locations: Some(1),
        severely_fragmented: true,
        threats: "Habitat loss, road mortality, and prey depletion across the range."
            .to_string(),
    }
}

/// Metrics that trip nothing; decline is varied by the caller.
pub(super) fn quiet_metrics(decline_percent: f64) -> RegionalMetrics {
    RegionalMetrics {
        population_size: Some(50_000.0),
        population_trend: PopulationTrend::Stable,
        decline_percent: Some(decline_percent),
        eoo: Some(50_000.0),
        aoo: Some(3_000.0),
        locations: Some(20),
        severely_fragmented: false,
        threats: "Localized grazing pressure.".to_string(),
    }
}

pub(super) fn rescue_answers() -> RescueAnswers {
    RescueAnswers {
        rescue_effect: RescueEffect::Yes,
        immigration_likely: Answer::Yes,
        source_stable: Answer::Yes,
        is_sink: Answer::No,
    }
}

pub(super) fn rescue_draft() -> RescueDraft {
    RescueDraft {
        answers: rescue_answers(),
        rationale: "Connected to a stable neighbouring population.".to_string(),
    }
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryRepository, RecordingEvents>,
    Arc<MemoryRepository>,
    Arc<RecordingEvents>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let events = Arc::new(RecordingEvents::default());
    let service = AssessmentService::new(repository.clone(), events.clone());
    (service, repository, events)
}

pub(super) fn router_with_service(
    service: AssessmentService<MemoryRepository, RecordingEvents>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &AssessmentId) -> Option<AssessmentRecord> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl AssessmentRepository for MemoryRepository {
    fn get(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn upsert(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
        Ok(())
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let mut records: Vec<_> = self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .values()
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingEvents {
    events: Arc<Mutex<Vec<AssessmentEvent>>>,
}

impl RecordingEvents {
    pub(super) fn events(&self) -> Vec<AssessmentEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl EventPublisher for RecordingEvents {
    fn publish(&self, event: AssessmentEvent) -> Result<(), EventError> {
        self.events.lock().expect("event mutex poisoned").push(event);
        Ok(())
    }
}

/// Reads succeed until `fail_writes` is flipped; afterwards every upsert is rejected.
#[derive(Default)]
pub(super) struct FlakyRepository {
    pub(super) inner: MemoryRepository,
    pub(super) fail_writes: Mutex<bool>,
}

impl FlakyRepository {
    pub(super) fn fail_from_now_on(&self) {
        *self.fail_writes.lock().expect("flag mutex poisoned") = true;
    }
}

impl AssessmentRepository for FlakyRepository {
    fn get(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        self.inner.get(id)
    }

    fn upsert(&self, record: AssessmentRecord) -> Result<(), RepositoryError> {
        if *self.fail_writes.lock().expect("flag mutex poisoned") {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        self.inner.upsert(record)
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        self.inner.list()
    }
}

pub(super) struct UnavailableRepository;

impl AssessmentRepository for UnavailableRepository {
    fn get(&self, _id: &AssessmentId) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn upsert(&self, _record: AssessmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
