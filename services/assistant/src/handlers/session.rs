//! Session cookie extractor for authenticated routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use vox_auth_types::cookie::{CookieSettings, clear_session_cookie};
use vox_auth_types::identity::session_from_headers;
use vox_core::error::AppError;

use crate::domain::types::User;
use crate::error::AssistantError;
use crate::state::AppState;
use crate::usecase::auth::ResolveSessionUseCase;

/// The active user behind the request's session cookie.
///
/// Rejects with 401 when the cookie is missing, invalid, expired, or names a
/// user that no longer exists or is inactive. In all but the missing case the
/// response also clears the cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub enum SessionFailure {
    Unauthorized { clear: Option<CookieSettings> },
    Internal(AssistantError),
}

impl IntoResponse for SessionFailure {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized { clear: Some(settings) } => (
                clear_session_cookie(CookieJar::new(), &settings),
                AppError::Unauthorized,
            )
                .into_response(),
            Self::Unauthorized { clear: None } => AppError::Unauthorized.into_response(),
            Self::Internal(e) => e.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = SessionFailure;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = session_from_headers(&parts.headers, &state.session);
        let cookie = state.session.cookie.clone();
        let users = state.user_repo();

        async move {
            let info = match session {
                Ok(info) => info,
                Err(rejection) => {
                    tracing::debug!(reason = %rejection, "session rejected");
                    let clear = rejection.should_clear_cookie().then_some(cookie);
                    return Err(SessionFailure::Unauthorized { clear });
                }
            };

            let usecase = ResolveSessionUseCase { users };
            match usecase.execute(info.user_id).await {
                Ok(Some(user)) => Ok(Self(user)),
                Ok(None) => {
                    tracing::info!(user_id = %info.user_id, "session names a missing or inactive user");
                    Err(SessionFailure::Unauthorized {
                        clear: Some(cookie),
                    })
                }
                Err(e) => Err(SessionFailure::Internal(e)),
            }
        }
    }
}
