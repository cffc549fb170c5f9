use std::sync::Arc;

use sea_orm::DatabaseConnection;

use vox_auth_types::identity::SessionSettings;

use crate::infra::db::{DbHistoryRepository, DbRecoveryCodeRepository, DbUserRepository};
use crate::infra::desktop::{CommandSpeech, SystemBrowser, YoutubePlayer};
use crate::infra::mail::SmtpMailer;
use crate::infra::transcription::WhisperTranscriber;
use crate::infra::wikipedia::WikipediaClient;
use crate::queue::CommandQueue;
use crate::usecase::command::CommandInterpreter;

/// The interpreter wired to the production adapters.
pub type AppInterpreter = CommandInterpreter<CommandSpeech, YoutubePlayer, SystemBrowser, WikipediaClient>;

/// Recovery and transcription settings handlers need at request time.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub transcription_language: String,
    pub expose_recovery_code_on_delivery_failure: bool,
    pub allow_used_code_on_password_change: bool,
}

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub session: SessionSettings,
    pub interpreter: Arc<AppInterpreter>,
    pub queue: CommandQueue,
    pub mailer: SmtpMailer,
    pub transcriber: WhisperTranscriber,
    pub settings: AssistantSettings,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn recovery_repo(&self) -> DbRecoveryCodeRepository {
        DbRecoveryCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn history_repo(&self) -> DbHistoryRepository {
        DbHistoryRepository {
            db: self.db.clone(),
        }
    }
}
