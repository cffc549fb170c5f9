use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::domain::collaborators::{Transcriber, TranscriptionError};

/// Client for an OpenAI-compatible `/v1/audio/transcriptions` endpoint.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    pub client: reqwest::Client,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

fn file_name_for(content_type: &str) -> &'static str {
    match content_type.split(';').next().map(str::trim) {
        Some("audio/wav" | "audio/x-wav" | "audio/wave") => "audio.wav",
        Some("audio/ogg") => "audio.ogg",
        Some("audio/mpeg") => "audio.mp3",
        Some("audio/mp4" | "audio/m4a" | "audio/x-m4a") => "audio.m4a",
        _ => "audio.webm",
    }
}

impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        audio: Bytes,
        content_type: &str,
        language: &str,
    ) -> Result<String, TranscriptionError> {
        let Some(api_key) = &self.api_key else {
            return Err(TranscriptionError::Failed(
                "transcription API key is not configured".into(),
            ));
        };

        let part = Part::stream(audio)
            .file_name(file_name_for(content_type))
            .mime_str(content_type)
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", language.to_owned())
            .text("response_format", "json");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;
        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;

        let text = body.text.trim();
        if text.is_empty() {
            return Err(TranscriptionError::NoSpeechDetected);
        }
        tracing::debug!(chars = text.len(), "audio transcribed");
        Ok(text.to_owned())
    }
}
