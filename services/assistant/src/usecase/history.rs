use vox_domain::id::{HistoryId, UserId};

use crate::domain::repository::HistoryRepository;
use crate::domain::types::{HistoryChanges, HistoryRecord};
use crate::error::AssistantError;

// ── ListHistory ──────────────────────────────────────────────────────────────

pub struct ListHistoryUseCase<R: HistoryRepository> {
    pub repo: R,
}

impl<R: HistoryRepository> ListHistoryUseCase<R> {
    /// Newest first. A blank `search` lists everything.
    pub async fn execute(
        &self,
        user_id: UserId,
        search: Option<&str>,
    ) -> Result<Vec<HistoryRecord>, AssistantError> {
        match search.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => self.repo.search(user_id, term).await,
            None => self.repo.list(user_id).await,
        }
    }
}

// ── GetHistory ───────────────────────────────────────────────────────────────

pub struct GetHistoryUseCase<R: HistoryRepository> {
    pub repo: R,
}

impl<R: HistoryRepository> GetHistoryUseCase<R> {
    pub async fn execute(
        &self,
        user_id: UserId,
        id: HistoryId,
    ) -> Result<HistoryRecord, AssistantError> {
        self.repo
            .get(user_id, id)
            .await?
            .ok_or(AssistantError::HistoryNotFound)
    }
}

// ── UpdateHistory ────────────────────────────────────────────────────────────

pub struct UpdateHistoryUseCase<R: HistoryRepository> {
    pub repo: R,
}

impl<R: HistoryRepository> UpdateHistoryUseCase<R> {
    pub async fn execute(
        &self,
        user_id: UserId,
        id: HistoryId,
        changes: HistoryChanges,
    ) -> Result<HistoryRecord, AssistantError> {
        if changes.is_empty() {
            return Err(AssistantError::MissingData("utterance or response"));
        }
        self.repo
            .update(user_id, id, &changes)
            .await?
            .ok_or(AssistantError::HistoryNotFound)
    }
}

// ── DeleteHistory ────────────────────────────────────────────────────────────

pub struct DeleteHistoryUseCase<R: HistoryRepository> {
    pub repo: R,
}

impl<R: HistoryRepository> DeleteHistoryUseCase<R> {
    pub async fn execute(&self, user_id: UserId, id: HistoryId) -> Result<(), AssistantError> {
        if self.repo.delete(user_id, id).await? {
            Ok(())
        } else {
            Err(AssistantError::HistoryNotFound)
        }
    }
}
