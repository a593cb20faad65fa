//! Per-service results: lifecycle transitions, audio notes, and share links.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    AudioClip, CompleteResultRequest, LabResult, ResultAction, ResultId, ResultSearch,
    ResultStatus, ResultView, SearchBy, ShareLink, SharedResultView,
};
pub use router::results_router;
pub use service::{ResultError, ResultService, AUDIO_ROUTE_PREFIX};
