//! Laboratory workspace areas. Each area owns its domain types, a service
//! over a repository seam, and an axum router mounted under `/api/v1`.

pub mod catalog;
pub mod dashboard;
pub mod format;
pub mod inventory;
pub mod memory;
pub mod orders;
pub mod patients;
pub mod repository;
pub mod results;
pub mod seed;

pub use dashboard::{dashboard_router, DashboardService, DashboardSummary};
pub use memory::InMemoryLabStore;
