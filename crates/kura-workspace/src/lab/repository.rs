//! Storage seams for each workspace area. The service runs against the
//! in-memory store; the traits keep the services testable in isolation.

use super::catalog::{LabService, Offering, ServiceId};
use super::inventory::InventoryItem;
use super::orders::Order;
use super::patients::{Patient, PatientId};
use super::results::{AudioClip, LabResult, ResultId};

pub trait CatalogRepository: Send + Sync {
    /// Fails with `Conflict` when the code is already taken.
    fn insert_service(&self, service: LabService) -> Result<LabService, RepositoryError>;
    fn service_by_code(&self, code: &str) -> Result<Option<LabService>, RepositoryError>;
    fn service_by_id(&self, id: &ServiceId) -> Result<Option<LabService>, RepositoryError>;
    fn services(&self) -> Result<Vec<LabService>, RepositoryError>;
    fn insert_offering(&self, offering: Offering) -> Result<Offering, RepositoryError>;
    fn offerings_for(&self, service_id: &ServiceId) -> Result<Vec<Offering>, RepositoryError>;
}

pub trait OrderRepository: Send + Sync {
    fn orders(&self) -> Result<Vec<Order>, RepositoryError>;
    fn order_by_number(&self, order_number: &str) -> Result<Option<Order>, RepositoryError>;
}

pub trait ResultRepository: Send + Sync {
    fn results(&self) -> Result<Vec<LabResult>, RepositoryError>;
    fn fetch(&self, id: &ResultId) -> Result<Option<LabResult>, RepositoryError>;
    /// Applies `change` to the stored result while holding the store lock.
    /// The record is only replaced when `change` succeeds; `Ok(None)` means
    /// no result has that id.
    fn modify<T, E, F>(&self, id: &ResultId, change: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut LabResult) -> Result<T, E>,
        E: From<RepositoryError>;
    fn result_by_share_uuid(&self, share_uuid: &str) -> Result<Option<LabResult>, RepositoryError>;
}

pub trait MediaStore: Send + Sync {
    fn put_audio(&self, clip: AudioClip) -> Result<(), RepositoryError>;
    fn audio(&self, key: &str) -> Result<Option<AudioClip>, RepositoryError>;
    /// Removing a missing key is not an error.
    fn remove_audio(&self, key: &str) -> Result<(), RepositoryError>;
}

pub trait PatientRepository: Send + Sync {
    /// Inserts or replaces the patient sharing `document_id`; an existing
    /// record keeps its id.
    fn upsert(&self, patient: Patient) -> Result<UpsertOutcome, RepositoryError>;
    fn patient(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError>;
    fn patients(&self) -> Result<Vec<Patient>, RepositoryError>;
}

pub trait InventoryRepository: Send + Sync {
    fn items(&self) -> Result<Vec<InventoryItem>, RepositoryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
