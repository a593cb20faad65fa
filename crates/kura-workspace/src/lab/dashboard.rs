//! Landing-page summary: headline counters and the latest orders.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use super::catalog::{CatalogError, CatalogService};
use super::format::{format_cop, format_optional_datetime};
use super::inventory::InventoryService;
use super::orders::{Order, OrderError, OrderService, OrderStatus};
use super::patients::PatientId;
use super::repository::{
    CatalogRepository, InventoryRepository, OrderRepository, PatientRepository, RepositoryError,
};

pub const RECENT_ORDERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub order_number: String,
    pub patient: String,
    pub date: String,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub total: u64,
    pub formatted_total: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub lab_name: String,
    pub stats: Vec<StatCard>,
    pub recent_orders: Vec<RecentOrder>,
}

pub struct DashboardService<S> {
    store: Arc<S>,
    orders: OrderService<S>,
    catalog: CatalogService<S>,
    inventory: InventoryService<S>,
    lab_name: String,
}

impl<S> DashboardService<S>
where
    S: OrderRepository + CatalogRepository + InventoryRepository + PatientRepository + 'static,
{
    pub fn new(store: Arc<S>, lab_name: impl Into<String>) -> Self {
        Self {
            orders: OrderService::new(Arc::clone(&store)),
            catalog: CatalogService::new(Arc::clone(&store)),
            inventory: InventoryService::new(Arc::clone(&store)),
            store,
            lab_name: lab_name.into(),
        }
    }

    pub fn summary(&self) -> Result<DashboardSummary, DashboardError> {
        let orders = self.orders.search_orders("")?;
        let pending = orders
            .iter()
            .filter(|order| order.status == OrderStatus::Pending)
            .count();
        let active_services = self.catalog.active_count()?;
        let low_stock = self.inventory.low_stock_count()?;

        let stats = vec![
            StatCard {
                title: "Total Órdenes",
                value: orders.len().to_string(),
                alert: false,
            },
            StatCard {
                title: "Órdenes Pendientes",
                value: pending.to_string(),
                alert: false,
            },
            StatCard {
                title: "Servicios Activos",
                value: active_services.to_string(),
                alert: false,
            },
            StatCard {
                title: "Inventario Bajo",
                value: low_stock.to_string(),
                alert: low_stock > 0,
            },
        ];

        let names: HashMap<PatientId, String> = PatientRepository::patients(self.store.as_ref())?
            .into_iter()
            .map(|patient| (patient.id, patient.full_name))
            .collect();
        let recent_orders = orders
            .iter()
            .take(RECENT_ORDERS)
            .map(|order| recent_row(order, &names))
            .collect();

        Ok(DashboardSummary {
            lab_name: self.lab_name.clone(),
            stats,
            recent_orders,
        })
    }
}

fn recent_row(order: &Order, names: &HashMap<PatientId, String>) -> RecentOrder {
    let patient = match &order.patient_id {
        Some(id) => names.get(id).cloned().unwrap_or_else(|| id.to_string()),
        None => "N/A".to_string(),
    };
    RecentOrder {
        order_number: order.order_number.clone(),
        patient,
        date: format_optional_datetime(order.created_at),
        status: order.status,
        status_label: order.status.label(),
        total: order.total,
        formatted_total: format_cop(order.total),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Orders(#[from] OrderError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub fn dashboard_router<S>(service: Arc<DashboardService<S>>) -> Router
where
    S: OrderRepository + CatalogRepository + InventoryRepository + PatientRepository + 'static,
{
    Router::new()
        .route("/api/v1/dashboard", get(summary_handler::<S>))
        .with_state(service)
}

pub(crate) async fn summary_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
) -> Response
where
    S: OrderRepository + CatalogRepository + InventoryRepository + PatientRepository + 'static,
{
    match service.summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => {
            error!(error = %err, "dashboard summary failed");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
