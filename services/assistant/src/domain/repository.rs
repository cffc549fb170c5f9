#![allow(async_fn_in_trait)]

use vox_domain::id::{HistoryId, UserId};

use crate::domain::types::{
    HistoryChanges, HistoryRecord, NewHistoryRecord, NewUser, RecoveryCode, User,
};
use crate::error::AssistantError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AssistantError>;

    async fn find_active_by_handle(&self, handle: &str) -> Result<Option<User>, AssistantError>;

    /// Active user whose handle or email equals `identifier`.
    async fn find_active_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, AssistantError>;

    async fn handle_exists(&self, handle: &str) -> Result<bool, AssistantError>;

    async fn email_exists(&self, email: &str) -> Result<bool, AssistantError>;

    /// Fails with `DuplicateIdentity` when the handle or email is already taken,
    /// even if the existence checks passed moments earlier.
    async fn create(&self, user: &NewUser) -> Result<User, AssistantError>;

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), AssistantError>;
}

/// Repository for password-recovery codes.
pub trait RecoveryCodeRepository: Send + Sync {
    /// Mark every unused, unexpired code of the user as used and insert `code`,
    /// atomically (same transaction).
    async fn replace_active(&self, code: &RecoveryCode) -> Result<(), AssistantError>;

    /// Find an unused, unexpired code by user + code string.
    async fn find_valid(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError>;

    /// Find a used code by user + code string, regardless of expiry.
    async fn find_used(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError>;

    /// Newest unexpired code by user + code string, used or not.
    async fn find_unexpired(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError>;

    async fn mark_used(&self, code: &RecoveryCode) -> Result<(), AssistantError>;
}

/// Repository for interaction history. Every query is scoped to `user_id`.
pub trait HistoryRepository: Send + Sync {
    /// All records of the user, newest first.
    async fn list(&self, user_id: UserId) -> Result<Vec<HistoryRecord>, AssistantError>;

    /// Records whose utterance or response contains `term`, ignoring case, newest first.
    async fn search(
        &self,
        user_id: UserId,
        term: &str,
    ) -> Result<Vec<HistoryRecord>, AssistantError>;

    async fn get(
        &self,
        user_id: UserId,
        id: HistoryId,
    ) -> Result<Option<HistoryRecord>, AssistantError>;

    async fn create(&self, record: &NewHistoryRecord) -> Result<HistoryRecord, AssistantError>;

    /// Returns `None` if the record does not exist or belongs to someone else.
    async fn update(
        &self,
        user_id: UserId,
        id: HistoryId,
        changes: &HistoryChanges,
    ) -> Result<Option<HistoryRecord>, AssistantError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, user_id: UserId, id: HistoryId) -> Result<bool, AssistantError>;

    /// All records of the user, oldest first.
    async fn list_for_report(&self, user_id: UserId)
    -> Result<Vec<HistoryRecord>, AssistantError>;
}
