use crate::cli::ServeArgs;
use crate::infra::{AppState, WorkshopServices};
use crate::routes::with_workshop_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use workshop_flow::config::AppConfig;
use workshop_flow::error::AppError;
use workshop_flow::telemetry;
use workshop_flow::workflows::SystemClock;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = WorkshopServices::in_memory(Arc::new(SystemClock));
    if args.sample_fleet {
        services.register_sample_fleet();
        info!("sample fleet registered in the vehicle directory");
    }

    let app = with_workshop_routes(&services, config.scheduling)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        default_slot_capacity = config.scheduling.default_slot_capacity,
        "workshop service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
