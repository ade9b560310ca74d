use crate::cli::ServeArgs;
use crate::infra::{assessment_service, open_store, AppState};
use crate::routes::with_api_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use regional_redlist::config::AppConfig;
use regional_redlist::error::AppError;
use regional_redlist::store::ProgressTracker;
use regional_redlist::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store = open_store(&config.storage)?;
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        progress: ProgressTracker::new(store.clone()),
    };

    let service = Arc::new(assessment_service(store));
    let app = with_api_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        persistent = config.storage.data_file.is_some(),
        "regional red-list service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
