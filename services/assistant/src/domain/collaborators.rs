#![allow(async_fn_in_trait)]

//! Ports for the external systems the assistant drives. Adapters live in
//! `infra`; any of the command-side collaborators may be absent at runtime.

use bytes::Bytes;

/// Failure of an outbound collaborator. Never surfaces to HTTP clients from
/// the interpreter; each command branch degrades instead.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0} is not available")]
    Unavailable(&'static str),
    #[error("{0}")]
    Failed(String),
}

impl CollaboratorError {
    pub fn failed(e: impl std::fmt::Display) -> Self {
        Self::Failed(e.to_string())
    }
}

/// Text-to-speech output.
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), CollaboratorError>;
}

/// Direct media playback for a free-text query.
pub trait MediaPlayer: Send + Sync {
    async fn play(&self, query: &str) -> Result<(), CollaboratorError>;
}

/// Opens a URL in the user's browser.
pub trait BrowserOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<(), CollaboratorError>;
}

/// Outcome of an encyclopedia lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryLookup {
    Summary(String),
    /// The query matched several articles; candidate titles in ranking order.
    Disambiguation(Vec<String>),
    NotFound,
}

pub trait Encyclopedia: Send + Sync {
    async fn summary(&self, query: &str, sentences: usize)
    -> Result<SummaryLookup, CollaboratorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("no speech detected")]
    NoSpeechDetected,
    #[error("{0}")]
    Failed(String),
}

/// Speech-to-text over an uploaded audio clip.
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: Bytes,
        content_type: &str,
        language: &str,
    ) -> Result<String, TranscriptionError>;
}

/// A rendered email ready for delivery.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), CollaboratorError>;
}

/// Command-side collaborators resolved once at startup.
///
/// `None` means the capability is unavailable in this deployment; `headless`
/// records that the service runs without a desktop session.
pub struct Capabilities<S, M, B, E> {
    pub speech: Option<S>,
    pub media: Option<M>,
    pub browser: Option<B>,
    pub encyclopedia: Option<E>,
    pub headless: bool,
}
