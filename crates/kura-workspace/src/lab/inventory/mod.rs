//! Reagent and supply stock with critical/low classification.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{InventoryItem, InventoryQuery, InventoryView, StockStatus};
pub use router::inventory_router;
pub use service::InventoryService;
