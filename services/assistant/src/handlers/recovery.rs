use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use vox_domain::id::UserId;

use crate::error::AssistantError;
use crate::state::AppState;
use crate::usecase::recovery::{
    ChangePasswordUseCase, DeliveryOutcome, RequestRecoveryUseCase, ResetPasswordInput,
    ResetPasswordUseCase, VerifyRecoveryInput, VerifyRecoveryUseCase,
};

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AssistantError> {
    let value = value.trim();
    if value.is_empty() {
        Err(AssistantError::MissingData(field))
    } else {
        Ok(value)
    }
}

// ── POST /auth/recovery ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecoveryRequest {
    /// Handle or email.
    pub identifier: String,
}

#[derive(Serialize)]
pub struct RecoveryResponse {
    pub handle: String,
    pub email: String,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

pub async fn request_recovery(
    State(state): State<AppState>,
    Json(body): Json<RecoveryRequest>,
) -> Result<Json<RecoveryResponse>, AssistantError> {
    let identifier = required(&body.identifier, "identifier")?;
    let usecase = RequestRecoveryUseCase {
        users: state.user_repo(),
        codes: state.recovery_repo(),
        mailer: state.mailer.clone(),
        expose_code_on_failure: state.settings.expose_recovery_code_on_delivery_failure,
    };
    let requested = usecase.execute(identifier).await?;
    let (delivered, reason, code) = match requested.delivery {
        DeliveryOutcome::Sent => (true, None, None),
        DeliveryOutcome::Failed { reason, code } => (false, Some(reason), code),
    };
    Ok(Json(RecoveryResponse {
        handle: requested.handle,
        email: requested.email,
        delivered,
        reason,
        code,
    }))
}

// ── POST /auth/recovery/verify ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub identifier: String,
    pub code: String,
    #[serde(default)]
    pub consume: bool,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub user_id: UserId,
}

pub async fn verify_recovery(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AssistantError> {
    let identifier = required(&body.identifier, "identifier")?;
    let code = required(&body.code, "code")?;
    let usecase = VerifyRecoveryUseCase {
        users: state.user_repo(),
        codes: state.recovery_repo(),
    };
    let user_id = usecase
        .execute(VerifyRecoveryInput {
            identifier: identifier.to_owned(),
            code: code.to_owned(),
            consume: body.consume,
        })
        .await?;
    Ok(Json(VerifyResponse { user_id }))
}

// ── PATCH /auth/recovery ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetRequest {
    pub identifier: String,
    pub code: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<VerifyResponse>, AssistantError> {
    let identifier = required(&body.identifier, "identifier")?;
    let code = required(&body.code, "code")?;
    if body.new_password != body.new_password_confirmation {
        return Err(AssistantError::PasswordMismatch);
    }
    let usecase = ResetPasswordUseCase {
        change: ChangePasswordUseCase {
            users: state.user_repo(),
            codes: state.recovery_repo(),
            allow_used_code: state.settings.allow_used_code_on_password_change,
        },
    };
    let user_id = usecase
        .execute(ResetPasswordInput {
            identifier: identifier.to_owned(),
            code: code.to_owned(),
            new_password: body.new_password,
        })
        .await?;
    Ok(Json(VerifyResponse { user_id }))
}
