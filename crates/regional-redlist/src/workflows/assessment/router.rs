use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::category::RedListCategory;
use super::domain::{AssessmentId, EligibilityAnswers, RegionalMetrics, RescueAnswers};
use super::evaluation::{
    adjust_category, confidence_score, evaluate_eligibility, evaluate_preliminary,
    AdjustmentInputs,
};
use super::repository::{AssessmentRepository, EventPublisher};
use super::service::{AssessmentService, AssessmentServiceError, NewAssessment};
use super::summary::AssessmentStatusView;
use super::workflow::StageDraft;

/// Router builder exposing the assessment workflow and the stateless evaluators.
pub fn assessment_router<R, P>(service: Arc<AssessmentService<R, P>>) -> Router
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessments",
            post(create_handler::<R, P>).get(list_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id",
            get(record_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/session",
            post(open_handler::<R, P>).delete(discard_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/draft",
            put(draft_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/continue",
            post(continue_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/back",
            post(back_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/complete",
            post(complete_handler::<R, P>),
        )
        .route(
            "/api/v1/assessments/:assessment_id/summary",
            get(summary_handler::<R, P>),
        )
        .route("/api/v1/evaluate/eligibility", post(eligibility_handler))
        .route("/api/v1/evaluate/preliminary", post(preliminary_handler))
        .route("/api/v1/evaluate/adjustment", post(adjustment_handler))
        .with_state(service)
}

pub(crate) async fn create_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Json(request): Json<NewAssessment>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.create(request) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.list() {
        Ok(records) => {
            let views: Vec<AssessmentStatusView> =
                records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn record_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.get(&id) {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => error_response(AssessmentServiceError::NotFound(id)),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn open_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.open(&AssessmentId(assessment_id)) {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn discard_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.discard(&AssessmentId(assessment_id)) {
        Ok(discarded) => (StatusCode::OK, Json(json!({ "discarded": discarded }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn draft_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
    Json(draft): Json<StageDraft>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.update_draft(&AssessmentId(assessment_id), draft) {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn continue_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.advance(&AssessmentId(assessment_id)) {
        Ok(transition) => (StatusCode::OK, Json(transition)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn back_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.back(&AssessmentId(assessment_id)) {
        Ok(stage) => (StatusCode::OK, Json(json!({ "open_stage": stage }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn complete_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.complete(&AssessmentId(assessment_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<R, P>(
    State(service): State<Arc<AssessmentService<R, P>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    match service.summary(&AssessmentId(assessment_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn eligibility_handler(Json(answers): Json<EligibilityAnswers>) -> Response {
    (StatusCode::OK, Json(evaluate_eligibility(&answers))).into_response()
}

pub(crate) async fn preliminary_handler(Json(metrics): Json<RegionalMetrics>) -> Response {
    let assessment = evaluate_preliminary(&metrics);
    let payload = json!({
        "category": assessment.category,
        "criteria_met": assessment.criteria_met,
        "findings": assessment.findings,
        "confidence": confidence_score(&metrics),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdjustmentRequest {
    pub(crate) preliminary_category: String,
    #[serde(default)]
    pub(crate) answers: RescueAnswers,
    /// Evaluate the raw answers without applying question gating.
    #[serde(default)]
    pub(crate) ungated: bool,
}

pub(crate) async fn adjustment_handler(Json(request): Json<AdjustmentRequest>) -> Response {
    let preliminary = match request.preliminary_category.parse::<RedListCategory>() {
        Ok(category) => category,
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    let inputs = if request.ungated {
        AdjustmentInputs {
            preliminary,
            immigration_likely: request.answers.immigration_likely,
            source_stable: request.answers.source_stable,
            is_sink: request.answers.is_sink,
        }
    } else {
        AdjustmentInputs::gated(preliminary, &request.answers)
    };

    (StatusCode::OK, Json(adjust_category(&inputs))).into_response()
}

fn error_response(err: AssessmentServiceError) -> Response {
    AppError::from(err).into_response()
}
