use crate::infra::{AppState, LabServices, LabStore};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use chrono::Local;
use kura_workspace::lab::catalog::catalog_router;
use kura_workspace::lab::dashboard_router;
use kura_workspace::lab::inventory::inventory_router;
use kura_workspace::lab::orders::order_router;
use kura_workspace::lab::patients::patient_router;
use kura_workspace::lab::results::results_router;
use serde_json::json;

pub(crate) fn with_lab_routes<S: LabStore>(
    services: &LabServices<S>,
    max_upload_bytes: usize,
) -> axum::Router {
    catalog_router(services.catalog.clone())
        .merge(order_router(services.orders.clone()))
        .merge(results_router(services.results.clone(), max_upload_bytes))
        .merge(patient_router(services.patients.clone(), max_upload_bytes))
        .merge(inventory_router(services.inventory.clone()))
        .merge(dashboard_router(services.dashboard.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/ping", get(ping))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn ping() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Local::now().to_rfc3339(),
    }))
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use kura_workspace::config::LabConfig;
    use kura_workspace::lab::InMemoryLabStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let lab = LabConfig::default();
        let services = LabServices::new(Arc::new(InMemoryLabStore::seeded()), &lab);
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_lab_routes(&services, lab.max_upload_bytes).layer(Extension(state))
    }

    async fn get_json(router: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json"))
    }

    #[tokio::test]
    async fn ping_reports_status_and_timestamp() {
        let Json(body) = ping().await;
        assert_eq!(body["status"], json!("ok"));
        let timestamp = body["timestamp"].as_str().expect("timestamp string");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (status, body) = get_json(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], json!("initializing"));

        let (status, body) = get_json(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ready"));
    }

    #[tokio::test]
    async fn every_area_is_mounted() {
        for uri in [
            "/health",
            "/api/v1/ping",
            "/api/v1/dashboard",
            "/api/v1/catalog/services?type=BUNDLE",
            "/api/v1/commerce/orders?q=00142",
            "/api/v1/results?by=patient&q=pat-002",
            "/api/v1/patients",
            "/api/v1/inventory",
        ] {
            let (status, _) = get_json(app(true), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn metrics_are_plain_text() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );
    }
}
