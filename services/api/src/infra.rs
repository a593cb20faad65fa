use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use kura_workspace::config::LabConfig;
use kura_workspace::lab::catalog::CatalogService;
use kura_workspace::lab::inventory::InventoryService;
use kura_workspace::lab::orders::OrderService;
use kura_workspace::lab::patients::{PatientField, PatientImportService};
use kura_workspace::lab::repository::{
    CatalogRepository, InventoryRepository, MediaStore, OrderRepository, PatientRepository,
    ResultRepository,
};
use kura_workspace::lab::results::ResultService;
use kura_workspace::lab::DashboardService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// A store that can back every workspace area at once.
pub(crate) trait LabStore:
    CatalogRepository
    + OrderRepository
    + ResultRepository
    + MediaStore
    + PatientRepository
    + InventoryRepository
    + 'static
{
}

impl<T> LabStore for T where
    T: CatalogRepository
        + OrderRepository
        + ResultRepository
        + MediaStore
        + PatientRepository
        + InventoryRepository
        + 'static
{
}

/// One service per workspace area, all sharing a single store.
pub(crate) struct LabServices<S> {
    pub(crate) catalog: Arc<CatalogService<S>>,
    pub(crate) orders: Arc<OrderService<S>>,
    pub(crate) results: Arc<ResultService<S, S>>,
    pub(crate) patients: Arc<PatientImportService<S>>,
    pub(crate) inventory: Arc<InventoryService<S>>,
    pub(crate) dashboard: Arc<DashboardService<S>>,
}

impl<S: LabStore> LabServices<S> {
    pub(crate) fn new(store: Arc<S>, lab: &LabConfig) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(Arc::clone(&store))),
            orders: Arc::new(OrderService::new(Arc::clone(&store))),
            results: Arc::new(ResultService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                lab.public_base_url.clone(),
            )),
            patients: Arc::new(PatientImportService::new(Arc::clone(&store))),
            inventory: Arc::new(InventoryService::new(Arc::clone(&store))),
            dashboard: Arc::new(DashboardService::new(store, lab.lab_name.clone())),
        }
    }
}

/// Parses a `--mapping` argument of the form `header=field`.
pub(crate) fn parse_mapping_pair(raw: &str) -> Result<(String, PatientField), String> {
    let (header, field) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected HEADER=FIELD, got '{raw}'"))?;
    let header = header.trim();
    if header.is_empty() {
        return Err(format!("missing CSV header in '{raw}'"));
    }
    let field = field.parse::<PatientField>()?;
    Ok((header.to_string(), field))
}
