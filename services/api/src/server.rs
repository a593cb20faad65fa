use crate::cli::ServeArgs;
use crate::infra::{AppState, LabServices};
use crate::routes::with_lab_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kura_workspace::config::AppConfig;
use kura_workspace::error::AppError;
use kura_workspace::lab::InMemoryLabStore;
use kura_workspace::telemetry;
use std::sync::atomic::Ordering;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryLabStore::seeded());
    let services = LabServices::new(store, &config.lab);

    let app = with_lab_routes(&services, config.lab.max_upload_bytes)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        lab = %config.lab.lab_name,
        "kura workspace api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
