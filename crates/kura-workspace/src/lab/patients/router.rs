use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::service::{parse_mapping_json, ImportError, PatientImportService};
use crate::lab::repository::PatientRepository;

pub fn patient_router<R>(
    service: Arc<PatientImportService<R>>,
    max_upload_bytes: usize,
) -> Router
where
    R: PatientRepository + 'static,
{
    Router::new()
        .route("/api/v1/patients", get(list_handler::<R>))
        .route("/api/v1/import/patients", post(import_handler::<R>))
        .route(
            "/api/v1/import/patients/preview",
            post(preview_handler::<R>),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Parts of the import form: the CSV file and an optional JSON column mapping.
#[derive(Debug, Default)]
pub(crate) struct ImportUpload {
    pub(crate) file: Option<Vec<u8>>,
    pub(crate) column_mapping: Option<String>,
}

pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<ImportUpload, String> {
    let mut upload = ImportUpload::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| format!("invalid multipart body: {err}"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| format!("could not read uploaded file: {err}"))?;
                upload.file = Some(bytes.to_vec());
            }
            Some("columnMapping") => {
                let text = field
                    .text()
                    .await
                    .map_err(|err| format!("could not read columnMapping: {err}"))?;
                upload.column_mapping = Some(text).filter(|text| !text.trim().is_empty());
            }
            _ => {}
        }
    }
    Ok(upload)
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<PatientImportService<R>>>,
) -> Response
where
    R: PatientRepository + 'static,
{
    match service.patients() {
        Ok(patients) => (StatusCode::OK, Json(patients)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<PatientImportService<R>>>,
    multipart: Multipart,
) -> Response
where
    R: PatientRepository + 'static,
{
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => return bad_request(message),
    };
    let Some(file) = upload.file else {
        return bad_request("multipart field 'file' is required".to_string());
    };

    let mapping = match upload.column_mapping.as_deref().map(parse_mapping_json) {
        Some(Ok(mapping)) => Some(mapping),
        Some(Err(err)) => return error_response(err),
        None => None,
    };

    match service.import(Cursor::new(file), mapping) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn preview_handler<R>(
    State(service): State<Arc<PatientImportService<R>>>,
    multipart: Multipart,
) -> Response
where
    R: PatientRepository + 'static,
{
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => return bad_request(message),
    };
    let Some(file) = upload.file else {
        return bad_request("multipart field 'file' is required".to_string());
    };

    match service.preview(Cursor::new(file)) {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(err) => error_response(err),
    }
}

fn bad_request(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn error_response(error: ImportError) -> Response {
    let status = match &error {
        ImportError::Csv(_) | ImportError::MissingHeader | ImportError::InvalidMapping(_) => {
            StatusCode::BAD_REQUEST
        }
        ImportError::UnknownColumn(_)
        | ImportError::DuplicateField(_)
        | ImportError::MissingRequiredColumns(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ImportError::Io(_) | ImportError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
