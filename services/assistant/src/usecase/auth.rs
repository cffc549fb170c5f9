use anyhow::Context as _;

use vox_auth_types::password::{hash_password, is_strong_enough, verify_password};
use vox_domain::id::UserId;

use crate::domain::repository::UserRepository;
use crate::domain::types::{IdentityField, NewUser, User};
use crate::error::AssistantError;

/// Hash and store a new password after the length check.
pub(crate) async fn store_password<U: UserRepository>(
    users: &U,
    user_id: UserId,
    password: &str,
) -> Result<(), AssistantError> {
    if !is_strong_enough(password) {
        return Err(AssistantError::WeakPassword);
    }
    let hash = hash_password(password).context("hash new password")?;
    users.update_password_hash(user_id, &hash).await
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub full_name: String,
    pub handle: String,
    pub email: String,
    pub password: String,
}

pub struct RegisterUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RegisterUseCase<U> {
    pub async fn execute(&self, input: RegisterInput) -> Result<User, AssistantError> {
        let full_name = input.full_name.trim();
        let handle = input.handle.trim();
        let email = input.email.trim();
        if full_name.is_empty() {
            return Err(AssistantError::MissingData("full_name"));
        }
        if handle.is_empty() {
            return Err(AssistantError::MissingData("handle"));
        }
        if email.is_empty() {
            return Err(AssistantError::MissingData("email"));
        }
        if !is_strong_enough(&input.password) {
            return Err(AssistantError::WeakPassword);
        }

        // Handle is checked first so its message wins when both collide.
        if self.users.handle_exists(handle).await? {
            return Err(AssistantError::DuplicateIdentity(IdentityField::Handle));
        }
        if self.users.email_exists(email).await? {
            return Err(AssistantError::DuplicateIdentity(IdentityField::Email));
        }

        let password_hash = hash_password(&input.password).context("hash password")?;
        let user = self
            .users
            .create(&NewUser {
                full_name: full_name.to_owned(),
                handle: handle.to_owned(),
                email: email.to_owned(),
                password_hash,
            })
            .await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

// ── Authenticate ─────────────────────────────────────────────────────────────

pub struct AuthenticateUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> AuthenticateUseCase<U> {
    /// `None` when no active user has this handle or the password differs.
    pub async fn execute(&self, handle: &str, password: &str) -> Result<Option<User>, AssistantError> {
        let Some(user) = self.users.find_active_by_handle(handle.trim()).await? else {
            return Ok(None);
        };
        let matches = verify_password(password, &user.password_hash).context("verify password")?;
        Ok(matches.then_some(user))
    }
}

// ── ResolveSession ───────────────────────────────────────────────────────────

pub struct ResolveSessionUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResolveSessionUseCase<U> {
    /// The session's user, or `None` if it was removed or deactivated since
    /// the token was issued.
    pub async fn execute(&self, user_id: UserId) -> Result<Option<User>, AssistantError> {
        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.active))
    }
}

// ── ChangeOwnPassword ────────────────────────────────────────────────────────

pub struct ChangeOwnPasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangeOwnPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangeOwnPasswordUseCase<U> {
    pub async fn execute(
        &self,
        user_id: UserId,
        input: ChangeOwnPasswordInput,
    ) -> Result<(), AssistantError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AssistantError::UnknownUser)?;
        let matches = verify_password(&input.current_password, &user.password_hash)
            .context("verify current password")?;
        if !matches {
            return Err(AssistantError::InvalidCredentials);
        }
        store_password(&self.users, user.id, &input.new_password).await?;
        tracing::info!(user_id = %user.id, "password changed");
        Ok(())
    }
}
