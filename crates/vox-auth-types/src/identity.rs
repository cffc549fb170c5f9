//! Resolves the session identity carried by the request cookie.

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use http::HeaderMap;

use crate::cookie::{CookieSettings, SESSION_COOKIE};
use crate::token::{SessionInfo, TokenError, validate_session_token};

/// Secret and cookie attributes needed to read and clear sessions.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub secret: Arc<str>,
    pub cookie: CookieSettings,
}

/// Why a request carries no usable session.
#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    #[error("no session cookie")]
    Missing,
    #[error(transparent)]
    Invalid(#[from] TokenError),
}

impl SessionRejection {
    /// Whether the client holds a cookie that should be cleared.
    pub fn should_clear_cookie(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

/// Read the session cookie from `headers` and validate its token.
///
/// Only checks signature and expiry; callers still confirm the user exists
/// and is active.
pub fn session_from_headers(
    headers: &HeaderMap,
    settings: &SessionSettings,
) -> Result<SessionInfo, SessionRejection> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar
        .get(SESSION_COOKIE)
        .filter(|c| !c.value().is_empty())
        .ok_or(SessionRejection::Missing)?;
    let info = validate_session_token(cookie.value(), &settings.secret)?;
    tracing::trace!(user_id = %info.user_id, "session cookie validated");
    Ok(info)
}
