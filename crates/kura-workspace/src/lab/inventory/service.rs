use std::sync::Arc;

use super::domain::{InventoryItem, InventoryQuery, InventoryView, StockStatus};
use crate::lab::format::matches_query;
use crate::lab::repository::{InventoryRepository, RepositoryError};

/// Read-only stock listing with the critical/low classifier applied.
pub struct InventoryService<R> {
    repository: Arc<R>,
}

impl<R> InventoryService<R>
where
    R: InventoryRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Items matching the query on name, SKU or category, most urgent first.
    pub fn list(&self, query: &InventoryQuery) -> Result<Vec<InventoryView>, RepositoryError> {
        let needle = query.q.as_deref().unwrap_or_default();
        let mut views: Vec<InventoryView> = self
            .repository
            .items()?
            .iter()
            .filter(|item| matches_query(needle, &[&item.name, &item.sku, &item.category]))
            .map(InventoryItem::view)
            .filter(|view| query.status.map_or(true, |status| view.status == status))
            .collect();
        views.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then_with(|| a.item.name.cmp(&b.item.name))
        });
        Ok(views)
    }

    /// Items that are critical or low.
    pub fn low_stock_count(&self) -> Result<usize, RepositoryError> {
        Ok(self
            .repository
            .items()?
            .iter()
            .filter(|item| item.status() != StockStatus::Ok)
            .count())
    }
}
