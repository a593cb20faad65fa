use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::lab::format::format_optional_datetime;
use crate::lab::patients::PatientId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(pub String);

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a single service result. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Pending,
    SampleTaken,
    InProgress,
    Completed,
}

impl ResultStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendiente",
            Self::SampleTaken => "Muestra Tomada",
            Self::InProgress => "En Proceso",
            Self::Completed => "Completado",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::SampleTaken => "SAMPLE_TAKEN",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether `action` is allowed from this status.
    pub const fn permits(self, action: ResultAction) -> bool {
        match action {
            ResultAction::MarkSampleTaken => matches!(self, Self::Pending),
            ResultAction::StartProcessing => matches!(self, Self::SampleTaken),
            ResultAction::Complete => matches!(self, Self::SampleTaken | Self::InProgress),
            ResultAction::Share => matches!(self, Self::Completed),
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultAction {
    MarkSampleTaken,
    StartProcessing,
    Complete,
    Share,
}

impl fmt::Display for ResultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MarkSampleTaken => "mark sample taken",
            Self::StartProcessing => "start processing",
            Self::Complete => "complete",
            Self::Share => "share",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    pub id: ResultId,
    pub order_id: String,
    pub patient_id: PatientId,
    /// Catalog code of the service this result belongs to.
    pub service_id: String,
    pub service_name: String,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_taken_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_uuid: Option<String>,
}

impl LabResult {
    pub fn view(&self) -> ResultView {
        ResultView {
            result: self.clone(),
            status_label: self.status.label(),
            formatted_sample_taken_at: format_optional_datetime(self.sample_taken_at),
            formatted_completed_at: format_optional_datetime(self.completed_at),
        }
    }

    /// Public projection served behind a share link; omits patient identifiers.
    pub fn shared_view(&self) -> SharedResultView {
        SharedResultView {
            service_id: self.service_id.clone(),
            service_name: self.service_name.clone(),
            status: self.status,
            status_label: self.status.label(),
            completed_at: self.completed_at,
            result_data: self.result_data.clone(),
            audio_url: self.audio_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(flatten)]
    pub result: LabResult,
    pub status_label: &'static str,
    pub formatted_sample_taken_at: String,
    pub formatted_completed_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedResultView {
    pub service_id: String,
    pub service_name: String,
    pub status: ResultStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBy {
    #[default]
    Order,
    Patient,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSearch {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub by: SearchBy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResultRequest {
    pub result_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub share_uuid: String,
    pub share_link: String,
}

/// Uploaded audio note kept by the media store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub key: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
