//! Persistence round-trips through the JSON file store.

use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use regional_redlist::store::{
    JsonFileStore, KeyValueAssessmentRepository, KeyValueStore, ProgressTracker, StoreError,
};
use serde_json::json;
use tempfile::TempDir;
use regional_redlist::workflows::assessment::{
    Answer, AssessmentEvent, AssessmentService, EligibilityAnswers, EligibilityDraft, EventError,
    EventPublisher, NewAssessment, RegionalMetrics, Stage, StageDraft,
};

struct Discard;

impl EventPublisher for Discard {
    fn publish(&self, _event: AssessmentEvent) -> Result<(), EventError> {
        Ok(())
    }
}

fn open_service(path: &Path) -> AssessmentService<KeyValueAssessmentRepository, Discard> {
    let store = JsonFileStore::open(path).expect("store opens");
    AssessmentService::new(
        Arc::new(KeyValueAssessmentRepository::new(Arc::new(store))),
        Arc::new(Discard),
    )
}

#[test]
fn record_saved_after_stage_two_reloads_on_stage_three() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("assessments.json");
    let service = open_service(&path);
    let id = service
        .create(NewAssessment {
            taxon_name: "Alpine ibex".to_string(),
            scientific_name: "Capra ibex".to_string(),
        })
        .expect("create")
        .id;

    service
        .update_draft(
            &id,
            StageDraft::Eligibility(EligibilityDraft {
                answers: EligibilityAnswers {
                    is_native: Answer::Yes,
                    has_breeding: Answer::Yes,
                    has_visiting: Answer::No,
                    is_vagrant: Answer::No,
                },
                rationale: "Reintroduced and now self-sustaining.".to_string(),
            }),
        )
        .expect("draft");
    service.advance(&id).expect("advance");
    service
        .update_draft(
            &id,
            StageDraft::PreliminaryCategory(RegionalMetrics {
                population_size: Some(1_800.0),
                decline_percent: Some(30.0),
                eoo: Some(12_000.0),
                aoo: Some(600.0),
                locations: Some(8),
                threats: "Disease outbreaks and hybridisation".to_string(),
                ..RegionalMetrics::default()
            }),
        )
        .expect("draft");
    service.advance(&id).expect("advance");
    let before = service.get(&id).expect("get").expect("stored");

    let reopened = open_service(&path);
    let snapshot = reopened.open(&id).expect("reopen");
    assert_eq!(snapshot.open_stage, Stage::RegionalAdjustment);
    assert_eq!(snapshot.assessment.current_stage, Stage::RegionalAdjustment);
    assert_eq!(snapshot.assessment.step1, before.step1);
    assert_eq!(snapshot.assessment.step2, before.step2);
    assert_eq!(reopened.list().expect("list").len(), 1);
}

#[test]
fn progress_entries_share_the_document_with_assessments() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("progress.json");
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&path).expect("open"));
    let tracker = ProgressTracker::new(store);
    let now = Utc.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).unwrap();

    tracker
        .record_page("regional-guidelines", 1, 1, now)
        .expect("record page");
    tracker
        .mark_region_reviewed("alps", now)
        .expect("mark region");

    let reopened = ProgressTracker::new(Arc::new(JsonFileStore::open(&path).expect("reopen")));
    let progress = reopened
        .module_progress("regional-guidelines")
        .expect("load")
        .expect("present");
    assert!(progress.completed);
    assert_eq!(reopened.reviewed_regions().expect("regions").len(), 1);

    let raw = std::fs::read_to_string(&path).expect("document written");
    let document: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert!(document.get("module-progress").is_some());
    assert!(document.get("reviewed-regions").is_some());
}

#[test]
fn failed_flush_keeps_the_previous_value() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let store = JsonFileStore::open(&path).expect("open");
    store
        .save("assessments", "a-1", json!({ "version": 1 }))
        .expect("first save");

    // A directory squatting on the staging file makes the next write fail.
    std::fs::create_dir(path.with_extension("json.tmp")).expect("block staging file");

    let err = store
        .save("assessments", "a-1", json!({ "version": 2 }))
        .expect_err("flush fails");
    assert!(matches!(err, StoreError::Io { .. }));
    let err = store
        .save("assessments", "a-2", json!({ "version": 1 }))
        .expect_err("flush fails");
    assert!(matches!(err, StoreError::Io { .. }));

    assert_eq!(
        store.load("assessments", "a-1").expect("load"),
        Some(json!({ "version": 1 }))
    );
    assert!(store.load("assessments", "a-2").expect("load").is_none());

    let reopened = JsonFileStore::open(&path).expect("reopen");
    assert_eq!(
        reopened.load("assessments", "a-1").expect("load"),
        Some(json!({ "version": 1 }))
    );
}
