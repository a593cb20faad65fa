use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::domain::{Order, OrderView};
use super::service::{OrderError, OrderService};
use crate::lab::repository::OrderRepository;

pub fn order_router<R>(service: Arc<OrderService<R>>) -> Router
where
    R: OrderRepository + 'static,
{
    Router::new()
        .route("/api/v1/commerce/orders", get(search_handler::<R>))
        .route(
            "/api/v1/commerce/orders/user/:user_id",
            get(by_user_handler::<R>),
        )
        .route(
            "/api/v1/commerce/orders/:order_number",
            get(get_handler::<R>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrderSearch {
    #[serde(default)]
    q: String,
}

fn views(orders: Vec<Order>) -> Vec<OrderView> {
    let now = Local::now().naive_local();
    orders.iter().map(|order| order.view(now)).collect()
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<OrderService<R>>>,
    Query(search): Query<OrderSearch>,
) -> Response
where
    R: OrderRepository + 'static,
{
    match service.search_orders(&search.q) {
        Ok(orders) => (StatusCode::OK, Json(views(orders))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_user_handler<R>(
    State(service): State<Arc<OrderService<R>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: OrderRepository + 'static,
{
    match service.orders_by_user(&user_id) {
        Ok(orders) => (StatusCode::OK, Json(views(orders))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<OrderService<R>>>,
    Path(order_number): Path<String>,
) -> Response
where
    R: OrderRepository + 'static,
{
    match service.get_order(&order_number) {
        Ok(order) => {
            let view = order.view(Local::now().naive_local());
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(error: OrderError) -> Response {
    let status = match &error {
        OrderError::NotFound(_) => StatusCode::NOT_FOUND,
        OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
