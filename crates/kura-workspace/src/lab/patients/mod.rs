//! Patient registry and CSV import with column-mapping suggestions.

pub mod domain;
mod mapping;
mod normalizer;
mod parser;
pub mod router;
pub mod service;

pub use domain::{ColumnMapping, ImportPreview, ImportResult, Patient, PatientField, PatientId};
pub use router::patient_router;
pub use service::{parse_mapping_json, ImportError, PatientImportService};

/// Suggested header -> field mapping for a set of CSV headers.
pub fn suggest_mapping(headers: &[String]) -> ColumnMapping {
    mapping::suggest_mapping(headers)
}
