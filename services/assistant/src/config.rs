use serde::Deserialize;

use vox_core::config::Config;
use vox_core::tracing::LogFormat;

/// Assistant service configuration, read from environment variables (and a
/// `.env` file when present). Field names map to upper-case env vars, e.g.
/// `session_secret` → `SESSION_SECRET`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HS256 key for session tokens.
    pub session_secret: String,
    #[serde(default)]
    pub cookie_domain: Option<String>,
    #[serde(default = "default_true")]
    pub secure_cookies: bool,
    #[serde(default = "default_port")]
    pub port: u16,
    /// No desktop session: speech, media and browser are disabled.
    #[serde(default)]
    pub headless: bool,
    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_speech_command")]
    pub speech_command: String,
    /// Extra arguments passed before the text, whitespace separated.
    #[serde(default = "default_speech_args")]
    pub speech_args: String,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default = "default_mail_from_name")]
    pub mail_from_name: String,
    /// Development only: include the recovery code in the response when the
    /// email cannot be delivered.
    #[serde(default)]
    pub expose_recovery_code_on_delivery_failure: bool,
    /// Accept an already-used (but unexpired) recovery code on password reset.
    #[serde(default)]
    pub allow_used_code_on_password_change: bool,

    #[serde(default = "default_transcription_url")]
    pub transcription_url: String,
    #[serde(default)]
    pub transcription_api_key: Option<String>,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_language")]
    pub transcription_language: String,

    #[serde(default = "default_language")]
    pub wikipedia_language: String,
    #[serde(default = "default_true")]
    pub encyclopedia_enabled: bool,

    #[serde(default = "default_command_workers")]
    pub command_workers: usize,
    #[serde(default = "default_command_queue_size")]
    pub command_queue_size: usize,
}

impl Config for AssistantConfig {}

impl AssistantConfig {
    pub fn speech_args(&self) -> Vec<String> {
        self.speech_args
            .split_whitespace()
            .map(str::to_owned)
            .collect()
    }
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    8000
}

fn default_speech_command() -> String {
    "espeak-ng".to_owned()
}

fn default_speech_args() -> String {
    "-v es".to_owned()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_owned()
}

fn default_mail_from_name() -> String {
    "Asistente Virtual".to_owned()
}

fn default_transcription_url() -> String {
    "https://api.openai.com/v1/audio/transcriptions".to_owned()
}

fn default_transcription_model() -> String {
    "whisper-1".to_owned()
}

fn default_language() -> String {
    "es".to_owned()
}

fn default_command_workers() -> usize {
    4
}

fn default_command_queue_size() -> usize {
    64
}
