use crate::infra::{AppState, WorkshopServices};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use workshop_flow::config::SchedulingConfig;
use workshop_flow::workflows::schedule::schedule_router;
use workshop_flow::workflows::store::workflow_router;

/// Calendar, inspection and appointment routes plus the operational endpoints.
pub(crate) fn with_workshop_routes(
    services: &WorkshopServices,
    scheduling: SchedulingConfig,
) -> axum::Router {
    schedule_router(services.schedule.clone(), scheduling)
        .merge(workflow_router(services.workflow.clone()))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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
