use bytes::Bytes;

use vox_domain::id::UserId;

use crate::domain::collaborators::{Transcriber, TranscriptionError};
use crate::error::AssistantError;
use crate::queue::{CommandJob, CommandQueue};

// ── TranscribeAudio ──────────────────────────────────────────────────────────

/// Turns an uploaded clip into text and queues it for interpretation. The
/// caller gets the transcript back without waiting for the command to run.
pub struct TranscribeAudioUseCase<'a, T: Transcriber> {
    pub transcriber: &'a T,
    pub queue: &'a CommandQueue,
    pub language: &'a str,
}

impl<T: Transcriber> TranscribeAudioUseCase<'_, T> {
    pub async fn execute(
        &self,
        user_id: UserId,
        audio: Bytes,
        content_type: &str,
    ) -> Result<String, AssistantError> {
        if audio.is_empty() {
            return Err(AssistantError::MissingAudio);
        }
        let size = audio.len();
        let text = self
            .transcriber
            .transcribe(audio, content_type, self.language)
            .await
            .map_err(|e| match e {
                TranscriptionError::NoSpeechDetected => AssistantError::NoSpeechDetected,
                TranscriptionError::Failed(reason) => AssistantError::TranscriptionFailure(reason),
            })?;
        tracing::info!(user_id = %user_id, bytes = size, "audio transcribed");

        // A dropped job is logged by the queue; the transcript is still returned.
        self.queue.enqueue(CommandJob {
            user_id,
            transcript: text.clone(),
        });
        Ok(text)
    }
}
