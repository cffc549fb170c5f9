use std::fmt;

use chrono::{DateTime, Utc};
use vox_domain::command::Classification;
use vox_domain::id::{HistoryId, RecoveryCodeId, UserId};

/// Registered account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub full_name: String,
    pub handle: String,
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a user; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub handle: String,
    pub email: String,
    pub password_hash: String,
}

/// Short-lived numeric code mailed for password recovery.
#[derive(Debug, Clone)]
pub struct RecoveryCode {
    pub id: RecoveryCodeId,
    pub user_id: UserId,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RecoveryCode {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    pub fn is_valid(&self) -> bool {
        !self.is_used() && !self.is_expired()
    }
}

/// One logged exchange between a user and the assistant.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub id: HistoryId,
    pub user_id: UserId,
    pub utterance: String,
    pub classification: Classification,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub user_id: UserId,
    pub utterance: String,
    pub classification: Classification,
    pub response: String,
}

/// Partial update of a history record. At least one field must be set.
#[derive(Debug, Clone, Default)]
pub struct HistoryChanges {
    pub utterance: Option<String>,
    pub response: Option<String>,
}

impl HistoryChanges {
    pub fn is_empty(&self) -> bool {
        self.utterance.is_none() && self.response.is_none()
    }
}

/// Which unique identity field collided at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Handle,
    Email,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Handle => "nombre de usuario",
            Self::Email => "correo",
        })
    }
}

/// Why a recovery code was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    InvalidOrExpired,
    AlreadyUsed,
}

impl fmt::Display for CodeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidOrExpired => "código inválido o expirado",
            Self::AlreadyUsed => "el código ya fue utilizado",
        })
    }
}

/// Recovery code length in digits.
pub const RECOVERY_CODE_LEN: usize = 6;

/// Recovery code time-to-live in seconds (15 minutes).
pub const RECOVERY_CODE_TTL_SECS: i64 = 900;

/// Sentences requested from the encyclopedia for a summary.
pub const SUMMARY_SENTENCES: usize = 2;

/// Maximum disambiguation options surfaced to the user.
pub const MAX_DISAMBIGUATION_OPTIONS: usize = 3;
