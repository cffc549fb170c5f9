use axum::http::StatusCode;

/// Handler for `GET /healthz`. Liveness only; services provide their own
/// `/readyz` that checks dependencies.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Maps a dependency probe result onto a readiness status.
pub fn readiness<E: std::fmt::Display>(probe: Result<(), E>) -> StatusCode {
    match probe {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
