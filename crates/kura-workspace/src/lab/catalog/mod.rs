//! Catalog of laboratory services and their point-of-sale offerings.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    normalize_service_code, CatalogQuery, LabService, NewOffering, NewService, Offering,
    ServiceId, ServiceType, ServiceView,
};
pub use router::catalog_router;
pub use service::{CatalogError, CatalogService};
