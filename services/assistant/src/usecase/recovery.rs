use chrono::{Duration, Utc};
use rand::RngExt;

use vox_domain::id::{RecoveryCodeId, UserId};

use crate::domain::collaborators::{Mailer, OutgoingEmail};
use crate::domain::repository::{RecoveryCodeRepository, UserRepository};
use crate::domain::types::{
    CodeRejection, RECOVERY_CODE_LEN, RECOVERY_CODE_TTL_SECS, RecoveryCode, User,
};
use crate::error::AssistantError;
use crate::usecase::auth::store_password;

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..RECOVERY_CODE_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Product name shown in recovery emails.
const PRODUCT_NAME: &str = "Asistente Virtual";

fn recovery_email(user: &User, code: &str) -> OutgoingEmail {
    let minutes = RECOVERY_CODE_TTL_SECS / 60;
    let handle = &user.handle;
    let html_body = format!(
        r#"<html>
  <body style="font-family: Arial, sans-serif; background: #f4f4f4; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; background: white; border-radius: 10px; overflow: hidden;">
      <div style="background: #667eea; padding: 30px; text-align: center;">
        <h1 style="color: white; margin: 0;">Recuperación de Contraseña</h1>
      </div>
      <div style="padding: 30px;">
        <h2>Hola {handle},</h2>
        <p>Has solicitado recuperar tu contraseña para el <strong>{PRODUCT_NAME}</strong>.</p>
        <div style="background: #f8f9fa; border-radius: 8px; padding: 20px; text-align: center; margin: 20px 0;">
          <p style="margin: 0 0 10px 0; color: #666;">Tu código de verificación es:</p>
          <h1 style="font-size: 36px; letter-spacing: 5px; color: #667eea; margin: 0;">{code}</h1>
          <p style="margin: 10px 0 0 0; color: #666;">(válido por {minutes} minutos)</p>
        </div>
        <p>Ingresa este código en el formulario de recuperación para crear una nueva contraseña.</p>
        <p style="color: #856404;"><strong>Importante:</strong> Si no solicitaste este código, ignora este mensaje.</p>
      </div>
    </div>
  </body>
</html>"#
    );
    let text_body = format!(
        "Hola {handle},\n\n\
         Has solicitado recuperar tu contraseña para el {PRODUCT_NAME}.\n\n\
         Tu código de verificación es: {code}\n\n\
         Este código expirará en {minutes} minutos.\n\n\
         Ingresa este código en el formulario de recuperación para crear una nueva contraseña.\n\n\
         Si no solicitaste este código, ignora este mensaje.\n"
    );
    OutgoingEmail {
        to: user.email.clone(),
        subject: format!("Código de recuperación - {PRODUCT_NAME}"),
        html_body,
        text_body,
    }
}

/// Active user matching a handle or email, else `UnknownUser`.
async fn find_recoverable_user<U: UserRepository>(
    users: &U,
    identifier: &str,
) -> Result<User, AssistantError> {
    users
        .find_active_by_identifier(identifier.trim())
        .await?
        .ok_or(AssistantError::UnknownUser)
}

// ── RequestRecovery ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// Delivery failed. `code` is only populated when code exposure is enabled.
    Failed {
        reason: String,
        code: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct RecoveryRequested {
    pub handle: String,
    pub email: String,
    pub delivery: DeliveryOutcome,
}

pub struct RequestRecoveryUseCase<U, C, Ml>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
    Ml: Mailer,
{
    pub users: U,
    pub codes: C,
    pub mailer: Ml,
    /// Non-production fallback: return the raw code when email delivery fails.
    pub expose_code_on_failure: bool,
}

impl<U, C, Ml> RequestRecoveryUseCase<U, C, Ml>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
    Ml: Mailer,
{
    pub async fn execute(&self, identifier: &str) -> Result<RecoveryRequested, AssistantError> {
        let user = find_recoverable_user(&self.users, identifier).await?;

        let now = Utc::now();
        let code = RecoveryCode {
            id: RecoveryCodeId::new(),
            user_id: user.id,
            code: generate_code(),
            expires_at: now + Duration::seconds(RECOVERY_CODE_TTL_SECS),
            used_at: None,
            created_at: now,
        };
        self.codes.replace_active(&code).await?;

        let delivery = match self.mailer.send(&recovery_email(&user, &code.code)).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, "recovery code sent");
                DeliveryOutcome::Sent
            }
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "recovery email delivery failed");
                let exposed = self.expose_code_on_failure.then(|| {
                    tracing::warn!(user_id = %user.id, "returning recovery code inline; disable outside development");
                    code.code.clone()
                });
                DeliveryOutcome::Failed {
                    reason: e.to_string(),
                    code: exposed,
                }
            }
        };

        Ok(RecoveryRequested {
            handle: user.handle,
            email: user.email,
            delivery,
        })
    }
}

// ── VerifyRecovery ───────────────────────────────────────────────────────────

pub struct VerifyRecoveryInput {
    pub identifier: String,
    pub code: String,
    /// Spend the code as part of verification.
    pub consume: bool,
}

pub struct VerifyRecoveryUseCase<U, C>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
{
    pub users: U,
    pub codes: C,
}

impl<U, C> VerifyRecoveryUseCase<U, C>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
{
    pub async fn execute(&self, input: VerifyRecoveryInput) -> Result<UserId, AssistantError> {
        let user = find_recoverable_user(&self.users, &input.identifier).await?;
        let code = input.code.trim();

        let Some(found) = self.codes.find_valid(user.id, code).await? else {
            let rejection = if self.codes.find_used(user.id, code).await?.is_some() {
                CodeRejection::AlreadyUsed
            } else {
                CodeRejection::InvalidOrExpired
            };
            return Err(AssistantError::InvalidCode(rejection));
        };

        if input.consume {
            self.codes.mark_used(&found).await?;
        }
        Ok(user.id)
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub new_password: String,
    pub recovery_code: Option<String>,
}

pub struct ChangePasswordUseCase<U, C>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
{
    pub users: U,
    pub codes: C,
    /// Accept an unexpired code that was already spent (e.g. by a consuming
    /// verify step). Off by default.
    pub allow_used_code: bool,
}

impl<U, C> ChangePasswordUseCase<U, C>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
{
    pub async fn execute(
        &self,
        user_id: UserId,
        input: ChangePasswordInput,
    ) -> Result<(), AssistantError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AssistantError::UnknownUser)?;

        if !vox_auth_types::password::is_strong_enough(&input.new_password) {
            return Err(AssistantError::WeakPassword);
        }

        if let Some(code) = input.recovery_code.as_deref() {
            let found = self
                .codes
                .find_unexpired(user.id, code.trim())
                .await?
                .ok_or(AssistantError::InvalidCode(CodeRejection::InvalidOrExpired))?;
            if found.is_used() && !self.allow_used_code {
                return Err(AssistantError::InvalidCode(CodeRejection::AlreadyUsed));
            }
            if !found.is_used() {
                self.codes.mark_used(&found).await?;
            }
        }

        store_password(&self.users, user.id, &input.new_password).await?;
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }
}

// ── ResetPassword ────────────────────────────────────────────────────────────

/// Password reset from the recovery form, where the caller is identified by
/// handle or email instead of a session.
pub struct ResetPasswordInput {
    pub identifier: String,
    pub code: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<U, C>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
{
    pub change: ChangePasswordUseCase<U, C>,
}

impl<U, C> ResetPasswordUseCase<U, C>
where
    U: UserRepository,
    C: RecoveryCodeRepository,
{
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<UserId, AssistantError> {
        let user = find_recoverable_user(&self.change.users, &input.identifier).await?;
        self.change
            .execute(
                user.id,
                ChangePasswordInput {
                    new_password: input.new_password,
                    recovery_code: Some(input.code),
                },
            )
            .await?;
        Ok(user.id)
    }
}
