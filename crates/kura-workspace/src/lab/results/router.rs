use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{CompleteResultRequest, LabResult, ResultId, ResultSearch, ResultView};
use super::service::{ResultError, ResultService};
use crate::lab::repository::{MediaStore, ResultRepository};

/// Router for the results page, share links, and stored audio notes.
pub fn results_router<R, M>(
    service: Arc<ResultService<R, M>>,
    max_upload_bytes: usize,
) -> Router
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    Router::new()
        .route("/api/v1/results", get(search_handler::<R, M>))
        .route(
            "/api/v1/results/order/:order_id",
            get(by_order_handler::<R, M>),
        )
        .route(
            "/api/v1/results/patient/:patient_id",
            get(by_patient_handler::<R, M>),
        )
        .route("/api/v1/results/:result_id", get(get_handler::<R, M>))
        .route(
            "/api/v1/results/:result_id/sample-taken",
            post(sample_taken_handler::<R, M>),
        )
        .route(
            "/api/v1/results/:result_id/in-progress",
            post(in_progress_handler::<R, M>),
        )
        .route(
            "/api/v1/results/:result_id/complete",
            post(complete_handler::<R, M>),
        )
        .route(
            "/api/v1/results/:result_id/audio",
            post(audio_upload_handler::<R, M>),
        )
        .route(
            "/api/v1/results/:result_id/share",
            post(share_handler::<R, M>),
        )
        .route("/api/v1/shared/:share_uuid", get(shared_handler::<R, M>))
        .route("/media/audio/:key", get(audio_download_handler::<R, M>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

fn view_list(results: Vec<LabResult>) -> Vec<ResultView> {
    results.iter().map(LabResult::view).collect()
}

fn single(result: Result<LabResult, ResultError>) -> Response {
    match result {
        Ok(result) => (StatusCode::OK, Json(result.view())).into_response(),
        Err(err) => error_response(err),
    }
}

fn many(results: Result<Vec<LabResult>, ResultError>) -> Response {
    match results {
        Ok(results) => (StatusCode::OK, Json(view_list(results))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Query(search): Query<ResultSearch>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    many(service.search(&search))
}

pub(crate) async fn by_order_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(order_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    many(service.results_by_order(&order_id))
}

pub(crate) async fn by_patient_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(patient_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    many(service.results_by_patient(&patient_id))
}

pub(crate) async fn get_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(result_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    single(service.get(&ResultId(result_id)))
}

pub(crate) async fn sample_taken_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(result_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    single(service.mark_sample_taken(&ResultId(result_id)))
}

pub(crate) async fn in_progress_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(result_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    single(service.start_processing(&ResultId(result_id)))
}

pub(crate) async fn complete_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(result_id): Path<String>,
    Json(request): Json<CompleteResultRequest>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    single(service.complete(&ResultId(result_id), &request.result_data))
}

pub(crate) async fn audio_upload_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(result_id): Path<String>,
    mut multipart: Multipart,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return bad_request(format!("invalid multipart body: {err}")),
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("audio").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return bad_request(format!("could not read audio upload: {err}")),
        };

        return single(service.attach_audio(
            &ResultId(result_id),
            &file_name,
            content_type.as_deref(),
            bytes,
        ));
    }

    bad_request("multipart field 'file' is required".to_string())
}

pub(crate) async fn share_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(result_id): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    match service.create_share_link(&ResultId(result_id)) {
        Ok(link) => (StatusCode::CREATED, Json(link)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn shared_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(share_uuid): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    match service.resolve_share(&share_uuid) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn audio_download_handler<R, M>(
    State(service): State<Arc<ResultService<R, M>>>,
    Path(key): Path<String>,
) -> Response
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    match service.audio(&key) {
        Ok(clip) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, clip.content_type)],
            clip.bytes,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn bad_request(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn error_response(error: ResultError) -> Response {
    let status = match &error {
        ResultError::NotFound(_) => StatusCode::NOT_FOUND,
        ResultError::InvalidTransition { .. } => StatusCode::CONFLICT,
        ResultError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ResultError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
