use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Extension;
use axum::Json;
use chrono::Utc;
use regional_redlist::error::AppError;
use regional_redlist::store::{ModuleProgress, RegionReview};
use regional_redlist::workflows::assessment::{
    assessment_router, AssessmentRepository, AssessmentService, EventPublisher,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct PageProgressRequest {
    pub(crate) page: u32,
    pub(crate) total_pages: u32,
}

pub(crate) fn with_api_routes<R, P>(service: Arc<AssessmentService<R, P>>) -> axum::Router
where
    R: AssessmentRepository + 'static,
    P: EventPublisher + 'static,
{
    assessment_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/modules/:module_id/progress",
            put(module_progress_endpoint),
        )
        .route("/api/v1/modules/progress", get(all_module_progress_endpoint))
        .route(
            "/api/v1/regions/:region/reviewed",
            post(region_reviewed_endpoint),
        )
        .route("/api/v1/regions/reviewed", get(reviewed_regions_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn module_progress_endpoint(
    Extension(state): Extension<AppState>,
    Path(module_id): Path<String>,
    Json(request): Json<PageProgressRequest>,
) -> Result<Json<ModuleProgress>, AppError> {
    let progress = state.progress.record_page(
        &module_id,
        request.page,
        request.total_pages,
        Utc::now(),
    )?;
    Ok(Json(progress))
}

pub(crate) async fn all_module_progress_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<ModuleProgress>>, AppError> {
    Ok(Json(state.progress.all_module_progress()?))
}

pub(crate) async fn region_reviewed_endpoint(
    Extension(state): Extension<AppState>,
    Path(region): Path<String>,
) -> Result<Json<RegionReview>, AppError> {
    Ok(Json(state.progress.mark_region_reviewed(&region, Utc::now())?))
}

pub(crate) async fn reviewed_regions_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<RegionReview>>, AppError> {
    Ok(Json(state.progress.reviewed_regions()?))
}
