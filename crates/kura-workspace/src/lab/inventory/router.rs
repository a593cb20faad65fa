use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::InventoryQuery;
use super::service::InventoryService;
use crate::lab::repository::InventoryRepository;

pub fn inventory_router<R>(service: Arc<InventoryService<R>>) -> Router
where
    R: InventoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/inventory", get(list_handler::<R>))
        .with_state(service)
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<InventoryService<R>>>,
    Query(query): Query<InventoryQuery>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    match service.list(&query) {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(err) => {
            error!(error = %err, "inventory listing failed");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
