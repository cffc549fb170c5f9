use axum::{
    Router,
    routing::{get, patch, post},
};

use vox_core::health::healthz;
use vox_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    assistant::{run_command, upload_audio},
    auth::{change_password, get_session, login, logout, register},
    history::{delete_history, download_report, get_history, list_histories, update_history},
    info::{get_info, readyz},
    recovery::{request_recovery, reset_password, verify_recovery},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/info", get(get_info))
        // Auth
        .route("/auth/register", post(register))
        .route(
            "/auth/session",
            post(login).get(get_session).delete(logout),
        )
        .route(
            "/auth/recovery",
            post(request_recovery).patch(reset_password),
        )
        .route("/auth/recovery/verify", post(verify_recovery))
        .route("/users/@me/password", patch(change_password))
        // Assistant
        .route("/assistant/audio", post(upload_audio))
        .route("/assistant/commands", post(run_command))
        // Histories
        .route("/histories", get(list_histories))
        .route("/histories/report", get(download_report))
        .route(
            "/histories/{id}",
            get(get_history).patch(update_history).delete(delete_history),
        )
        .with_state(state)
        // The last layer runs first: assign the id, trace with it, echo it back.
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
