use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::{CodeRejection, IdentityField};

/// Assistant service error variants. Messages are user-facing (Spanish).
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("ya existe una cuenta con ese {0}")]
    DuplicateIdentity(IdentityField),
    #[error("usuario no encontrado")]
    UnknownUser,
    #[error("{0}")]
    InvalidCode(CodeRejection),
    #[error("la contraseña debe tener al menos 6 caracteres")]
    WeakPassword,
    #[error("las contraseñas no coinciden")]
    PasswordMismatch,
    #[error("usuario o contraseña incorrectos")]
    InvalidCredentials,
    #[error("registro de historial no encontrado")]
    HistoryNotFound,
    #[error("faltan datos: {0}")]
    MissingData(&'static str),
    #[error("no se recibió audio")]
    MissingAudio,
    #[error("No se pudo entender el audio.")]
    NoSpeechDetected,
    #[error("error al transcribir el audio: {0}")]
    TranscriptionFailure(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AssistantError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity(_) => "DUPLICATE_IDENTITY",
            Self::UnknownUser => "UNKNOWN_USER",
            Self::InvalidCode(_) => "INVALID_OR_EXPIRED_CODE",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::HistoryNotFound => "HISTORY_NOT_FOUND",
            Self::MissingData(_) => "MISSING_DATA",
            Self::MissingAudio => "MISSING_AUDIO",
            Self::NoSpeechDetected => "NO_SPEECH_DETECTED",
            Self::TranscriptionFailure(_) => "TRANSCRIPTION_FAILURE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AssistantError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::DuplicateIdentity(_) => StatusCode::CONFLICT,
            Self::UnknownUser | Self::HistoryNotFound => StatusCode::NOT_FOUND,
            Self::InvalidCode(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::WeakPassword
            | Self::PasswordMismatch
            | Self::MissingData(_)
            | Self::MissingAudio
            | Self::NoSpeechDetected => StatusCode::BAD_REQUEST,
            Self::TranscriptionFailure(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only 500s carry a cause worth logging; the trace layer records the rest.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::TranscriptionFailure(reason) => {
                tracing::warn!(reason = %reason, "transcription collaborator failed");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
