use metrics_exporter_prometheus::PrometheusHandle;
use regional_redlist::config::StorageConfig;
use regional_redlist::error::AppError;
use regional_redlist::store::{
    JsonFileStore, KeyValueAssessmentRepository, KeyValueStore, MemoryStore, ProgressTracker,
};
use regional_redlist::workflows::assessment::{
    AssessmentEvent, AssessmentEventKind, AssessmentService, EventError, EventPublisher,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type ApiAssessmentService =
    AssessmentService<KeyValueAssessmentRepository, TracingEventPublisher>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) progress: ProgressTracker,
}

/// Publishes assessment events to the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: AssessmentEvent) -> Result<(), EventError> {
        match event.kind {
            AssessmentEventKind::StageCompleted { stage } => info!(
                assessment_id = %event.assessment_id,
                stage = stage.number(),
                details = ?event.details,
                "stage completed"
            ),
            AssessmentEventKind::AssessmentCompleted => info!(
                assessment_id = %event.assessment_id,
                details = ?event.details,
                "assessment completed"
            ),
        }
        Ok(())
    }
}

/// JSON file store when a data file is configured, otherwise a process-local store.
pub(crate) fn open_store(storage: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, AppError> {
    match &storage.data_file {
        Some(path) => {
            let store = JsonFileStore::open(path.clone())?;
            info!(path = %store.path().display(), "using json file store");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::default())),
    }
}

pub(crate) fn assessment_service(store: Arc<dyn KeyValueStore>) -> ApiAssessmentService {
    AssessmentService::new(
        Arc::new(KeyValueAssessmentRepository::new(store)),
        Arc::new(TracingEventPublisher),
    )
}
