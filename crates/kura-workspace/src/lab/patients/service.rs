use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{
    ColumnMapping, ImportPreview, ImportResult, Patient, PatientField, PatientId,
};
use super::mapping::{missing_required, suggest_mapping};
use super::normalizer::normalize_header;
use super::parser::{read_table, CsvRow};
use crate::lab::repository::{PatientRepository, RepositoryError, UpsertOutcome};

const PREVIEW_ROWS: usize = 5;
const MIN_PHONE_DIGITS: usize = 7;

/// Imports patient rows from CSV exports into the patient registry.
pub struct PatientImportService<R> {
    repository: Arc<R>,
}

impl<R> PatientImportService<R>
where
    R: PatientRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn patients(&self) -> Result<Vec<Patient>, ImportError> {
        let mut patients = self.repository.patients()?;
        patients.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(patients)
    }

    pub fn patient(&self, id: &PatientId) -> Result<Option<Patient>, ImportError> {
        Ok(self.repository.patient(id)?)
    }

    /// Headers, the guessed mapping, and the first few rows of a file.
    pub fn preview<Rd: Read>(&self, reader: Rd) -> Result<ImportPreview, ImportError> {
        let table = read_table(reader)?;
        if table.headers.iter().all(|header| header.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let suggested_mapping = suggest_mapping(&table.headers);
        let missing_required = missing_required(&suggested_mapping);
        let sample_rows = table
            .rows
            .into_iter()
            .filter(|row| !row.is_blank())
            .filter_map(|row| row.outcome.ok())
            .take(PREVIEW_ROWS)
            .collect();

        Ok(ImportPreview {
            headers: table.headers,
            suggested_mapping,
            missing_required,
            sample_rows,
        })
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
        mapping: Option<ColumnMapping>,
    ) -> Result<ImportResult, ImportError> {
        let file = std::fs::File::open(path)?;
        self.import(file, mapping)
    }

    /// Upserts every valid row keyed by document id. Invalid rows are counted
    /// and described in `details` without stopping the import.
    pub fn import<Rd: Read>(
        &self,
        reader: Rd,
        mapping: Option<ColumnMapping>,
    ) -> Result<ImportResult, ImportError> {
        let table = read_table(reader)?;
        if table.headers.iter().all(|header| header.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let mapping = mapping.unwrap_or_else(|| suggest_mapping(&table.headers));
        let columns = resolve_columns(&table.headers, &mapping)?;

        let mut outcome = ImportResult::default();
        for row in table.rows.iter().filter(|row| !row.is_blank()) {
            match patient_from_row(row, &columns) {
                Ok(patient) => match self.repository.upsert(patient)? {
                    UpsertOutcome::Inserted => outcome.imported += 1,
                    UpsertOutcome::Updated => outcome.updated += 1,
                },
                Err(reason) => {
                    outcome.errors += 1;
                    outcome.details.push(format!("row {}: {}", row.line, reason));
                }
            }
        }

        if outcome.errors > 0 {
            warn!(errors = outcome.errors, "patient import finished with rejected rows");
        }
        info!(
            imported = outcome.imported,
            updated = outcome.updated,
            errors = outcome.errors,
            "patient import finished"
        );
        Ok(outcome)
    }
}

/// Maps each field to its column index, checking the mapping against the file.
fn resolve_columns(
    headers: &[String],
    mapping: &ColumnMapping,
) -> Result<HashMap<PatientField, usize>, ImportError> {
    let mut columns = HashMap::new();

    for (header, field) in mapping {
        let wanted = normalize_header(header);
        let index = headers
            .iter()
            .position(|candidate| normalize_header(candidate) == wanted)
            .ok_or_else(|| ImportError::UnknownColumn(header.clone()))?;
        if columns.insert(*field, index).is_some() {
            return Err(ImportError::DuplicateField(*field));
        }
    }

    let missing = missing_required(mapping);
    if !missing.is_empty() {
        return Err(ImportError::MissingRequiredColumns(missing));
    }

    Ok(columns)
}

fn patient_from_row(
    row: &CsvRow,
    columns: &HashMap<PatientField, usize>,
) -> Result<Patient, String> {
    let values = row.outcome.as_ref().map_err(Clone::clone)?;
    let cell = |field: PatientField| {
        columns
            .get(&field)
            .and_then(|index| values.get(*index))
            .map(|value| value.trim())
            .unwrap_or_default()
    };

    let document_id: String = cell(PatientField::DocumentId)
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '.')
        .collect();
    if document_id.is_empty() {
        return Err("document id is required".to_string());
    }

    let full_name = cell(PatientField::FullName)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if full_name.is_empty() {
        return Err("full name is required".to_string());
    }

    let email = optional(cell(PatientField::Email))
        .map(validate_email)
        .transpose()?;
    let phone = optional(cell(PatientField::Phone))
        .map(validate_phone)
        .transpose()?;

    Ok(Patient {
        id: PatientId(format!("pat-{}", Uuid::new_v4())),
        document_id,
        full_name,
        email,
        phone,
    })
}

fn optional(value: &str) -> Option<&str> {
    Some(value).filter(|value| !value.is_empty())
}

fn validate_email(value: &str) -> Result<String, String> {
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(value.to_lowercase())
        }
        _ => Err(format!("invalid email '{value}'")),
    }
}

/// Keeps digits, `+`, spaces and `-`; the rest of the input is dropped.
fn validate_phone(value: &str) -> Result<String, String> {
    let kept: String = value
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, '+' | ' ' | '-'))
        .collect();
    let kept = kept.trim();
    let digits = kept.chars().filter(char::is_ascii_digit).count();
    if digits >= MIN_PHONE_DIGITS {
        Ok(kept.to_string())
    } else {
        Err(format!("invalid phone '{value}'"))
    }
}

/// Accepts a mapping in either direction, `{"Cédula": "documentId"}` or
/// `{"documentId": "Cédula"}`. Empty targets leave a column unmapped.
pub fn parse_mapping_json(raw: &str) -> Result<ColumnMapping, ImportError> {
    let entries: BTreeMap<String, String> = serde_json::from_str(raw)
        .map_err(|err| ImportError::InvalidMapping(err.to_string()))?;

    let mut mapping = ColumnMapping::new();
    for (key, value) in entries {
        if value.trim().is_empty() || key.trim().is_empty() {
            continue;
        }
        if let Ok(field) = value.parse::<PatientField>() {
            mapping.insert(key, field);
        } else if let Ok(field) = key.parse::<PatientField>() {
            mapping.insert(value, field);
        } else {
            return Err(ImportError::InvalidMapping(format!(
                "neither '{key}' nor '{value}' names a patient field"
            )));
        }
    }
    Ok(mapping)
}

fn join_fields(fields: &[PatientField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read patient file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid patient CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("patient CSV has no header row")]
    MissingHeader,
    #[error("column '{0}' is not present in the file")]
    UnknownColumn(String),
    #[error("field {0} is mapped to more than one column")]
    DuplicateField(PatientField),
    #[error("column mapping must cover: {}", join_fields(.0))]
    MissingRequiredColumns(Vec<PatientField>),
    #[error("invalid column mapping: {0}")]
    InvalidMapping(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
