use anyhow::Context;
use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use vox_auth_types::cookie::{clear_session_cookie, set_session_cookie};
use vox_auth_types::token::issue_session_token;
use vox_domain::id::UserId;

use crate::domain::types::User;
use crate::error::AssistantError;
use crate::handlers::session::CurrentUser;
use crate::state::AppState;
use crate::usecase::auth::{
    AuthenticateUseCase, ChangeOwnPasswordInput, ChangeOwnPasswordUseCase, RegisterInput,
    RegisterUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub full_name: String,
    pub handle: String,
    pub email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            handle: user.handle,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

fn start_session(jar: CookieJar, state: &AppState, user_id: UserId) -> Result<CookieJar, AssistantError> {
    let issued = issue_session_token(user_id, &state.session.secret).context("issue session token")?;
    Ok(set_session_cookie(jar, issued.token, &state.session.cookie))
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub handle: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), AssistantError> {
    if body.password != body.password_confirmation {
        return Err(AssistantError::PasswordMismatch);
    }
    let usecase = RegisterUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterInput {
            full_name: body.full_name,
            handle: body.handle,
            email: body.email,
            password: body.password,
        })
        .await?;
    let jar = start_session(jar, &state, user.id)?;
    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

// ── POST /auth/session ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), AssistantError> {
    let handle = body.handle.trim();
    if handle.is_empty() || body.password.is_empty() {
        return Err(AssistantError::MissingData("handle, password"));
    }
    let usecase = AuthenticateUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(handle, &body.password)
        .await?
        .ok_or(AssistantError::InvalidCredentials)?;
    let jar = start_session(jar, &state, user.id)?;
    tracing::info!(user_id = %user.id, "session started");
    Ok((jar, Json(user.into())))
}

// ── GET /auth/session ────────────────────────────────────────────────────────

pub async fn get_session(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

// ── DELETE /auth/session ─────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        clear_session_cookie(jar, &state.session.cookie),
        StatusCode::NO_CONTENT,
    )
}

// ── PATCH /users/@me/password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

pub async fn change_password(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AssistantError> {
    if body.new_password != body.new_password_confirmation {
        return Err(AssistantError::PasswordMismatch);
    }
    let usecase = ChangeOwnPasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            user.id,
            ChangeOwnPasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
