use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(pub String);

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: PatientId,
    pub document_id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// The four columns a patient import can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PatientField {
    DocumentId,
    FullName,
    Email,
    Phone,
}

impl PatientField {
    pub const fn ordered() -> [Self; 4] {
        [Self::DocumentId, Self::FullName, Self::Email, Self::Phone]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DocumentId => "documentId",
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    pub const fn required(self) -> bool {
        matches!(self, Self::DocumentId | Self::FullName)
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ordered()
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown patient field '{wanted}'"))
    }
}

/// CSV header -> target field.
pub type ColumnMapping = BTreeMap<String, PatientField>;

/// Counters reported back to the import page once a file is processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub imported: usize,
    pub updated: usize,
    pub errors: usize,
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub headers: Vec<String>,
    pub suggested_mapping: ColumnMapping,
    pub missing_required: Vec<PatientField>,
    pub sample_rows: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip_through_mapping_json() {
        let mapping: ColumnMapping =
            serde_json::from_str(r#"{"Cédula":"documentId","Nombre":"fullName"}"#)
                .expect("mapping decodes");
        assert_eq!(mapping.get("Cédula"), Some(&PatientField::DocumentId));
        assert_eq!("FULLNAME".parse::<PatientField>(), Ok(PatientField::FullName));
        assert!("birthDate".parse::<PatientField>().is_err());
    }
}
