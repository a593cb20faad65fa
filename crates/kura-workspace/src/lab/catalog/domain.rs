use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lab::format::format_cop;

/// Identifier wrapper for catalog entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub String);

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Single,
    Bundle,
}

impl ServiceType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "Individual",
            Self::Bundle => "Paquete",
        }
    }
}

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SINGLE" => Ok(Self::Single),
            "BUNDLE" => Ok(Self::Bundle),
            _ => Err(UnknownServiceType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service type '{0}', expected SINGLE or BUNDLE")]
pub struct UnknownServiceType(pub String);

/// A catalog entry: either a single assay or a bundle of single assays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabService {
    pub id: ServiceId,
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub base_price: u64,
    pub service_type: ServiceType,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub child_service_ids: Vec<ServiceId>,
}

impl LabService {
    pub fn view(&self) -> ServiceView {
        ServiceView {
            service: self.clone(),
            service_type_label: self.service_type.label(),
            formatted_price: format_cop(self.base_price),
        }
    }
}

/// Catalog entry decorated with the display fields the list page renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    #[serde(flatten)]
    pub service: LabService,
    pub service_type_label: &'static str,
    pub formatted_price: String,
}

/// Payload accepted by the create form. Prices arrive signed so a negative
/// amount is reported as a validation error instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub base_price: i64,
    pub service_type: ServiceType,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub child_service_ids: Vec<ServiceId>,
}

/// Binds a service to a point of sale with its own price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offering {
    pub id: String,
    pub service_id: ServiceId,
    pub pos_id: String,
    pub price: u64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffering {
    pub service_id: ServiceId,
    pub pos_id: String,
    pub price: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Filters accepted by the catalog list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "type")]
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub limit: Option<usize>,
}

static SERVICE_CODE: OnceLock<Regex> = OnceLock::new();

fn service_code_pattern() -> &'static Regex {
    SERVICE_CODE.get_or_init(|| {
        Regex::new(r"^[A-Z]{2,6}-[0-9]{3,}$").expect("service code pattern compiles")
    })
}

/// Trims and upper-cases a code, returning it only when it fits `LAB-001` style.
pub fn normalize_service_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    service_code_pattern().is_match(&code).then_some(code)
}
