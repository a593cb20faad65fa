use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CatalogQuery, LabService, NewOffering, NewService, ServiceType, ServiceView};
use super::service::{CatalogError, CatalogService};
use crate::lab::repository::CatalogRepository;

/// Router exposing catalog search, creation, and offerings.
pub fn catalog_router<R>(service: Arc<CatalogService<R>>) -> Router
where
    R: CatalogRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/catalog/services",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/catalog/services/search", get(search_handler::<R>))
        .route(
            "/api/v1/catalog/services/type/:service_type",
            get(by_type_handler::<R>),
        )
        .route("/api/v1/catalog/services/:code", get(get_handler::<R>))
        .route(
            "/api/v1/catalog/services/:code/offerings",
            get(offerings_handler::<R>),
        )
        .route("/api/v1/catalog/offerings", post(create_offering_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    limit: Option<usize>,
}

fn views(services: Vec<LabService>) -> Vec<ServiceView> {
    services.iter().map(LabService::view).collect()
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(query): Query<CatalogQuery>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.list_services(&query) {
        Ok(services) => (StatusCode::OK, Json(views(services))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.search_services(&params.q, params.limit) {
        Ok(services) => (StatusCode::OK, Json(views(services))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_type_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(service_type): Path<String>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    let service_type = match service_type.parse::<ServiceType>() {
        Ok(value) => value,
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.services_by_type(service_type) {
        Ok(services) => (StatusCode::OK, Json(views(services))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(code): Path<String>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.get_service(&code) {
        Ok(found) => (StatusCode::OK, Json(found.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Json(draft): Json<NewService>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.create_service(draft) {
        Ok(created) => (StatusCode::CREATED, Json(created.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn offerings_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(code): Path<String>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.offerings_for(&code) {
        Ok(offerings) => (StatusCode::OK, Json(offerings)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_offering_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    Json(draft): Json<NewOffering>,
) -> Response
where
    R: CatalogRepository + 'static,
{
    match service.create_offering(draft) {
        Ok(offering) => (StatusCode::CREATED, Json(offering)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(error: CatalogError) -> Response {
    let status = match &error {
        CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Conflict(_) => StatusCode::CONFLICT,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
