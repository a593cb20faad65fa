//! Result lifecycle, audio notes and share links, end to end.

use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use chrono::{NaiveDate, NaiveDateTime};
use kura_workspace::lab::repository::{MediaStore, RepositoryError};
use kura_workspace::lab::results::{
    AudioClip, ResultError, ResultId, ResultSearch, ResultService, ResultStatus, SearchBy,
};
use kura_workspace::lab::InMemoryLabStore;

fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 2, 18)
        .and_then(|date| date.and_hms_opt(7, 45, 0))
        .expect("valid timestamp")
}

fn build_service() -> ResultService<InMemoryLabStore, InMemoryLabStore> {
    let store = Arc::new(InMemoryLabStore::seeded());
    ResultService::with_clock(
        Arc::clone(&store),
        store,
        "https://kura.example.co/",
        fixed_clock,
    )
}

fn id(raw: &str) -> ResultId {
    ResultId(raw.to_string())
}

#[test]
fn pending_result_walks_forward_to_completed() {
    let service = build_service();

    let taken = service.mark_sample_taken(&id("res-001")).expect("sample taken");
    assert_eq!(taken.status, ResultStatus::SampleTaken);
    assert_eq!(taken.sample_taken_at, Some(fixed_clock()));

    let processing = service.start_processing(&id("res-001")).expect("processing");
    assert_eq!(processing.status, ResultStatus::InProgress);

    let done = service
        .complete(&id("res-001"), "  Hemoglobina: 14.2 g/dL  ")
        .expect("completed");
    assert_eq!(done.status, ResultStatus::Completed);
    assert_eq!(done.result_data.as_deref(), Some("Hemoglobina: 14.2 g/dL"));
    assert_eq!(done.completed_at, Some(fixed_clock()));

    assert_eq!(
        service.get(&id("res-001")).expect("stored").status,
        ResultStatus::Completed
    );
}

#[test]
fn sample_taken_result_can_complete_directly() {
    let service = build_service();
    let done = service
        .complete(&id("res-002"), "LDL: 110 mg/dL")
        .expect("completed");
    assert_eq!(done.status, ResultStatus::Completed);
    assert!(done.sample_taken_at.is_some());
}

#[test]
fn lifecycle_never_moves_backwards() {
    let service = build_service();

    let err = service
        .mark_sample_taken(&id("res-003"))
        .expect_err("completed results stay completed");
    assert!(matches!(
        err,
        ResultError::InvalidTransition {
            from: ResultStatus::Completed,
            ..
        }
    ));

    assert!(matches!(
        service.start_processing(&id("res-001")),
        Err(ResultError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.complete(&id("res-001"), "data"),
        Err(ResultError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.complete(&id("res-005"), "   "),
        Err(ResultError::Validation(_))
    ));
    assert!(matches!(
        service.mark_sample_taken(&id("res-404")),
        Err(ResultError::NotFound(_))
    ));
}

#[test]
fn share_links_require_completion_and_rotate() {
    let service = build_service();

    assert!(matches!(
        service.create_share_link(&id("res-005")),
        Err(ResultError::InvalidTransition { .. })
    ));

    let first = service.create_share_link(&id("res-003")).expect("share");
    assert!(first.share_uuid.starts_with("share-"));
    assert_eq!(
        first.share_link,
        format!("https://kura.example.co/shared/{}", first.share_uuid)
    );

    let shared = service.resolve_share(&first.share_uuid).expect("resolves");
    assert_eq!(shared.service_name, "Glucosa en Ayunas");
    assert_eq!(shared.result_data.as_deref(), Some("Glucosa: 95 mg/dL (Normal)"));

    let second = service.create_share_link(&id("res-003")).expect("share again");
    assert_ne!(first.share_uuid, second.share_uuid);
    assert!(matches!(
        service.resolve_share(&first.share_uuid),
        Err(ResultError::NotFound(_))
    ));
    assert!(service.resolve_share("share-uuid-123").is_err());
}

#[test]
fn audio_notes_are_stored_and_linked() {
    let service = build_service();

    let updated = service
        .attach_audio(&id("res-002"), "dictado final.mp3", None, vec![0x49, 0x44, 0x33])
        .expect("audio stored");
    let url = updated.audio_url.expect("audio url set");
    assert!(url.starts_with("/media/audio/"));
    assert!(url.ends_with("-dictado_final.mp3"));

    let key = url.trim_start_matches("/media/audio/");
    let clip = service.audio(key).expect("clip");
    assert_eq!(clip.content_type, "audio/mpeg");
    assert_eq!(clip.bytes, vec![0x49, 0x44, 0x33]);

    assert!(matches!(
        service.attach_audio(&id("res-002"), "informe.pdf", Some("application/pdf"), vec![1]),
        Err(ResultError::Validation(_))
    ));
    assert!(matches!(
        service.attach_audio(&id("res-002"), "nota.mp3", None, Vec::new()),
        Err(ResultError::Validation(_))
    ));
}

/// Media store that exposes how many clips it currently holds.
#[derive(Default)]
struct ClipShelf {
    clips: Mutex<HashMap<String, AudioClip>>,
}

impl ClipShelf {
    fn len(&self) -> usize {
        self.clips.lock().expect("shelf lock").len()
    }
}

impl MediaStore for ClipShelf {
    fn put_audio(&self, clip: AudioClip) -> Result<(), RepositoryError> {
        self.clips
            .lock()
            .expect("shelf lock")
            .insert(clip.key.clone(), clip);
        Ok(())
    }

    fn audio(&self, key: &str) -> Result<Option<AudioClip>, RepositoryError> {
        Ok(self.clips.lock().expect("shelf lock").get(key).cloned())
    }

    fn remove_audio(&self, key: &str) -> Result<(), RepositoryError> {
        self.clips.lock().expect("shelf lock").remove(key);
        Ok(())
    }
}

#[test]
fn replacing_an_audio_note_drops_the_old_clip() {
    let shelf = Arc::new(ClipShelf::default());
    let service = ResultService::with_clock(
        Arc::new(InMemoryLabStore::seeded()),
        Arc::clone(&shelf),
        "https://kura.example.co",
        fixed_clock,
    );

    let first = service
        .attach_audio(&id("res-002"), "primera.mp3", None, vec![1])
        .expect("first note");
    let second = service
        .attach_audio(&id("res-002"), "segunda.mp3", None, vec![2])
        .expect("second note");
    assert_ne!(first.audio_url, second.audio_url);
    assert_eq!(shelf.len(), 1);

    let first_key = first
        .audio_url
        .as_deref()
        .and_then(|url| url.strip_prefix("/media/audio/"))
        .expect("local key");
    assert!(matches!(
        service.audio(first_key),
        Err(ResultError::NotFound(_))
    ));

    assert!(matches!(
        service.attach_audio(&id("res-404"), "nota.mp3", None, vec![3]),
        Err(ResultError::NotFound(_))
    ));
    assert_eq!(shelf.len(), 1);
}

#[test]
fn concurrent_sample_marks_succeed_once() {
    let service = build_service();
    let barrier = Barrier::new(8);

    let successes = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    service.mark_sample_taken(&id("res-001")).is_ok()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker finished"))
            .filter(|succeeded| *succeeded)
            .count()
    });

    assert_eq!(successes, 1);
    assert_eq!(
        service.get(&id("res-001")).expect("stored").status,
        ResultStatus::SampleTaken
    );
}

#[test]
fn audio_upload_racing_completion_keeps_both_changes() {
    for _ in 0..25 {
        let service = build_service();
        let barrier = Barrier::new(2);

        thread::scope(|scope| {
            let audio = scope.spawn(|| {
                barrier.wait();
                service.attach_audio(&id("res-002"), "dictado.mp3", None, vec![0x49, 0x44])
            });
            let complete = scope.spawn(|| {
                barrier.wait();
                service.complete(&id("res-002"), "LDL: 110 mg/dL")
            });
            audio.join().expect("audio worker").expect("audio stored");
            complete.join().expect("complete worker").expect("completed");
        });

        let stored = service.get(&id("res-002")).expect("stored");
        assert_eq!(stored.status, ResultStatus::Completed);
        assert_eq!(stored.result_data.as_deref(), Some("LDL: 110 mg/dL"));
        assert!(stored.audio_url.is_some());
    }
}

#[test]
fn search_filters_by_order_or_patient() {
    let service = build_service();

    let all = service.search(&ResultSearch::default()).expect("all");
    assert_eq!(all.len(), 5);

    let by_order = service
        .search(&ResultSearch {
            q: Some("ORD-001".to_string()),
            by: SearchBy::Order,
        })
        .expect("by order");
    let ids: Vec<_> = by_order.iter().map(|result| result.id.0.as_str()).collect();
    assert_eq!(ids, vec!["res-001", "res-002"]);

    let by_patient = service
        .search(&ResultSearch {
            q: Some("pat-00".to_string()),
            by: SearchBy::Patient,
        })
        .expect("by patient");
    assert_eq!(by_patient.len(), 5);

    assert_eq!(service.results_by_order("ord-003").expect("order").len(), 1);
    assert_eq!(service.results_by_patient("pat-005").expect("patient").len(), 0);
}

mod routing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use kura_workspace::lab::results::{results_router, ResultService};
    use kura_workspace::lab::InMemoryLabStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const BOUNDARY: &str = "kura-test-boundary";

    fn build_router() -> axum::Router {
        let store = Arc::new(InMemoryLabStore::seeded());
        let service = ResultService::new(Arc::clone(&store), store, "http://localhost:4200");
        results_router(Arc::new(service), 1024 * 1024)
    }

    fn post(uri: &str, body: Body, content_type: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(body)
            .expect("request")
    }

    fn multipart_audio(file_name: &str, content_type: &str, bytes: &[u8]) -> Body {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        Body::from(body)
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn transitions_return_conflict_and_unprocessable() {
        let router = build_router();

        let response = router
            .clone()
            .oneshot(post(
                "/api/v1/results/res-001/sample-taken",
                Body::empty(),
                "application/json",
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload["status"], json!("SAMPLE_TAKEN"));
        assert_eq!(payload["statusLabel"], json!("Muestra Tomada"));

        let response = router
            .clone()
            .oneshot(post(
                "/api/v1/results/res-001/sample-taken",
                Body::empty(),
                "application/json",
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = router
            .clone()
            .oneshot(post(
                "/api/v1/results/res-001/complete",
                Body::from(json!({ "resultData": " " }).to_string()),
                "application/json",
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn share_link_resolves_without_patient_id() {
        let router = build_router();

        let response = router
            .clone()
            .oneshot(post(
                "/api/v1/results/res-004/share",
                Body::empty(),
                "application/json",
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let link = read_json(response).await;
        let share_uuid = link["shareUuid"].as_str().expect("uuid").to_string();
        assert_eq!(
            link["shareLink"],
            json!(format!("http://localhost:4200/shared/{share_uuid}"))
        );

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/shared/{share_uuid}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let shared = read_json(response).await;
        assert_eq!(shared["serviceName"], json!("Perfil Tiroideo"));
        assert!(shared.get("patientId").is_none());
    }

    #[tokio::test]
    async fn audio_upload_then_download() {
        let router = build_router();
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");

        let response = router
            .clone()
            .oneshot(post(
                "/api/v1/results/res-005/audio",
                multipart_audio("nota.ogg", "audio/ogg", b"OggS-audio"),
                &content_type,
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        let audio_url = payload["audioUrl"].as_str().expect("audio url").to_string();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(audio_url)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("audio/ogg")
        );
        let bytes = to_bytes(response.into_body(), 1024).await.expect("body");
        assert_eq!(&bytes[..], b"OggS-audio");

        let response = router
            .oneshot(post(
                "/api/v1/results/res-005/audio",
                multipart_audio("informe.txt", "text/plain", b"hola"),
                &content_type,
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
