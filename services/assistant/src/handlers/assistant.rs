use axum::{
    Json,
    extract::{Multipart, State},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use vox_domain::command::Interpretation;

use crate::error::AssistantError;
use crate::handlers::session::CurrentUser;
use crate::state::AppState;
use crate::usecase::command::RunCommandUseCase;
use crate::usecase::transcribe::TranscribeAudioUseCase;

const AUDIO_FIELD: &str = "audio";
const DEFAULT_AUDIO_TYPE: &str = "audio/webm";

// ── POST /assistant/audio ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub text: String,
}

async fn read_audio(multipart: &mut Multipart) -> Result<Option<(Bytes, String)>, AssistantError> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            tracing::debug!(error = %e, "malformed multipart upload");
            AssistantError::MissingAudio
        })?;
        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_AUDIO_TYPE)
            .to_owned();
        let bytes = field.bytes().await.map_err(|e| {
            tracing::debug!(error = %e, "audio field could not be read");
            AssistantError::MissingAudio
        })?;
        return Ok(Some((bytes, content_type)));
    }
}

pub async fn upload_audio(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscriptResponse>, AssistantError> {
    let (audio, content_type) = read_audio(&mut multipart)
        .await?
        .ok_or(AssistantError::MissingAudio)?;
    let usecase = TranscribeAudioUseCase {
        transcriber: &state.transcriber,
        queue: &state.queue,
        language: &state.settings.transcription_language,
    };
    let text = usecase.execute(user.id, audio, &content_type).await?;
    Ok(Json(TranscriptResponse { text }))
}

// ── POST /assistant/commands ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CommandRequest {
    pub text: String,
}

pub async fn run_command(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<CommandRequest>,
) -> Result<Json<Interpretation>, AssistantError> {
    let text = body.text.trim();
    if text.is_empty() {
        return Err(AssistantError::MissingData("text"));
    }
    let usecase = RunCommandUseCase {
        history: state.history_repo(),
        interpreter: &state.interpreter,
    };
    Ok(Json(usecase.execute(user.id, text).await))
}
