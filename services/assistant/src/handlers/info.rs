use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use vox_core::health::readiness;

use crate::state::AppState;

// ── GET /readyz ──────────────────────────────────────────────────────────────

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}

// ── GET /info ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InfoResponse {
    pub platform: &'static str,
    pub headless: bool,
    /// Audio is always recorded in the browser and uploaded.
    pub audio_mode: &'static str,
    pub speech: bool,
    pub media: bool,
    pub browser: bool,
    pub encyclopedia: bool,
}

pub async fn get_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let capabilities = &state.interpreter.capabilities;
    Json(InfoResponse {
        platform: std::env::consts::OS,
        headless: capabilities.headless,
        audio_mode: "browser",
        speech: capabilities.speech.is_some(),
        media: capabilities.media.is_some(),
        browser: capabilities.browser.is_some(),
        encyclopedia: capabilities.encyclopedia.is_some(),
    })
}
