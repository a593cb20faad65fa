use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::domain::{
    AudioClip, LabResult, ResultAction, ResultId, ResultSearch, ResultStatus, SearchBy,
    ShareLink, SharedResultView,
};
use crate::lab::format::matches_query;
use crate::lab::repository::{MediaStore, RepositoryError, ResultRepository};

pub const AUDIO_ROUTE_PREFIX: &str = "/media/audio";

type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Drives results through their lifecycle and manages audio notes and share links.
pub struct ResultService<R, M> {
    repository: Arc<R>,
    media: Arc<M>,
    public_base_url: String,
    clock: Clock,
}

impl<R, M> ResultService<R, M>
where
    R: ResultRepository + 'static,
    M: MediaStore + 'static,
{
    pub fn new(repository: Arc<R>, media: Arc<M>, public_base_url: impl Into<String>) -> Self {
        Self::with_clock(repository, media, public_base_url, local_now)
    }

    pub fn with_clock(
        repository: Arc<R>,
        media: Arc<M>,
        public_base_url: impl Into<String>,
        clock: Clock,
    ) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            repository,
            media,
            public_base_url,
            clock,
        }
    }

    pub fn get(&self, id: &ResultId) -> Result<LabResult, ResultError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| ResultError::NotFound(id.0.clone()))
    }

    /// Checks `action` against the stored status and applies `change` under
    /// one store lock, so concurrent calls cannot move a result backwards.
    fn transition<F>(
        &self,
        id: &ResultId,
        action: ResultAction,
        change: F,
    ) -> Result<LabResult, ResultError>
    where
        F: FnOnce(&mut LabResult),
    {
        self.repository
            .modify(id, |result| {
                if !result.status.permits(action) {
                    warn!(
                        result_id = %id,
                        status = %result.status,
                        %action,
                        "rejected transition"
                    );
                    return Err(ResultError::InvalidTransition {
                        from: result.status,
                        action,
                    });
                }
                change(result);
                Ok(result.clone())
            })?
            .ok_or_else(|| ResultError::NotFound(id.0.clone()))
    }

    pub fn mark_sample_taken(&self, id: &ResultId) -> Result<LabResult, ResultError> {
        let now = (self.clock)();
        let result = self.transition(id, ResultAction::MarkSampleTaken, |result| {
            result.status = ResultStatus::SampleTaken;
            result.sample_taken_at = Some(now);
        })?;
        info!(result_id = %id, "sample taken");
        Ok(result)
    }

    pub fn start_processing(&self, id: &ResultId) -> Result<LabResult, ResultError> {
        let result = self.transition(id, ResultAction::StartProcessing, |result| {
            result.status = ResultStatus::InProgress;
        })?;
        info!(result_id = %id, "result processing started");
        Ok(result)
    }

    pub fn complete(&self, id: &ResultId, result_data: &str) -> Result<LabResult, ResultError> {
        let data = result_data.trim();
        if data.is_empty() {
            return Err(ResultError::Validation(
                "resultData is required to complete a result".to_string(),
            ));
        }

        let now = (self.clock)();
        let result = self.transition(id, ResultAction::Complete, |result| {
            result.status = ResultStatus::Completed;
            result.completed_at = Some(now);
            result.result_data = Some(data.to_string());
        })?;
        info!(result_id = %id, "result completed");
        Ok(result)
    }

    /// Stores an audio note for the result. The content type falls back to a
    /// guess from the file name and must be `audio/*`. A replaced note is
    /// removed from the media store.
    pub fn attach_audio(
        &self,
        id: &ResultId,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<LabResult, ResultError> {
        if bytes.is_empty() {
            return Err(ResultError::Validation("audio file is empty".to_string()));
        }
        let content_type = audio_content_type(file_name, content_type)?;

        let key = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name));
        let audio_url = format!("{AUDIO_ROUTE_PREFIX}/{key}");
        let size = bytes.len();
        self.media.put_audio(AudioClip {
            key: key.clone(),
            file_name: file_name.to_string(),
            content_type,
            bytes,
        })?;

        let linked = self
            .repository
            .modify(id, |result| {
                let previous = result.audio_url.replace(audio_url);
                Ok::<_, ResultError>((result.clone(), previous))
            })
            .and_then(|linked| linked.ok_or_else(|| ResultError::NotFound(id.0.clone())));

        let (result, previous) = match linked {
            Ok(linked) => linked,
            Err(err) => {
                self.discard_audio(&key);
                return Err(err);
            }
        };

        if let Some(old_key) = previous.as_deref().and_then(stored_audio_key) {
            self.discard_audio(old_key);
        }
        info!(result_id = %id, bytes = size, "audio note attached");
        Ok(result)
    }

    fn discard_audio(&self, key: &str) {
        if let Err(err) = self.media.remove_audio(key) {
            warn!(key, error = %err, "could not remove audio note");
        }
    }

    pub fn audio(&self, key: &str) -> Result<AudioClip, ResultError> {
        self.media
            .audio(key)?
            .ok_or_else(|| ResultError::NotFound(format!("audio {key}")))
    }

    /// Issues a fresh share link; an earlier link for the same result stops resolving.
    pub fn create_share_link(&self, id: &ResultId) -> Result<ShareLink, ResultError> {
        let share_uuid = format!("share-{}", Uuid::new_v4());
        self.transition(id, ResultAction::Share, |result| {
            result.share_uuid = Some(share_uuid.clone());
        })?;

        info!(result_id = %id, "share link created");
        Ok(ShareLink {
            share_link: format!("{}/shared/{}", self.public_base_url, share_uuid),
            share_uuid,
        })
    }

    pub fn resolve_share(&self, share_uuid: &str) -> Result<SharedResultView, ResultError> {
        self.repository
            .result_by_share_uuid(share_uuid.trim())?
            .map(|result| result.shared_view())
            .ok_or_else(|| ResultError::NotFound(format!("share link {share_uuid}")))
    }

    pub fn results_by_order(&self, order_id: &str) -> Result<Vec<LabResult>, ResultError> {
        let wanted = order_id.trim();
        self.filtered(|result| result.order_id == wanted)
    }

    pub fn results_by_patient(&self, patient_id: &str) -> Result<Vec<LabResult>, ResultError> {
        let wanted = patient_id.trim();
        self.filtered(|result| result.patient_id.0 == wanted)
    }

    /// Substring search on the order or patient id; a blank query lists everything.
    pub fn search(&self, search: &ResultSearch) -> Result<Vec<LabResult>, ResultError> {
        let query = search.q.as_deref().unwrap_or_default();
        self.filtered(|result| match search.by {
            SearchBy::Order => matches_query(query, &[&result.order_id]),
            SearchBy::Patient => matches_query(query, &[&result.patient_id.0]),
        })
    }

    fn filtered<F>(&self, predicate: F) -> Result<Vec<LabResult>, ResultError>
    where
        F: Fn(&LabResult) -> bool,
    {
        let mut results: Vec<LabResult> = self
            .repository
            .results()?
            .into_iter()
            .filter(|result| predicate(result))
            .collect();
        results.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(results)
    }
}

fn audio_content_type(file_name: &str, declared: Option<&str>) -> Result<String, ResultError> {
    let octet_stream = mime::APPLICATION_OCTET_STREAM.essence_str();
    let declared = declared
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != octet_stream);

    let parsed: mime::Mime = match declared {
        Some(value) => value.parse().map_err(|_| {
            ResultError::Validation(format!("'{value}' is not a valid content type"))
        })?,
        None => mime_guess::from_path(file_name).first_or_octet_stream(),
    };

    if parsed.type_() == mime::AUDIO {
        Ok(parsed.essence_str().to_string())
    } else {
        Err(ResultError::Validation(format!(
            "{file_name} is not an audio file ({parsed})"
        )))
    }
}

/// Key of a note held in the media store, if `audio_url` points at one.
fn stored_audio_key(audio_url: &str) -> Option<&str> {
    audio_url
        .strip_prefix(AUDIO_ROUTE_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|key| !key.is_empty())
}

fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "audio".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("cannot {action} a result in status {from}")]
    InvalidTransition {
        from: ResultStatus,
        action: ResultAction,
    },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
