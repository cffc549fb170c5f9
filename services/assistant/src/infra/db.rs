use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, Condition,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionTrait, sea_query::Expr,
};

use vox_assistant_schema::{history_records, recovery_codes, users};
use vox_core::sea_ext::ContainsIgnoreCase;
use vox_domain::command::Classification;
use vox_domain::id::{HistoryId, RecoveryCodeId, UserId};

use crate::domain::repository::{HistoryRepository, RecoveryCodeRepository, UserRepository};
use crate::domain::types::{
    HistoryChanges, HistoryRecord, IdentityField, NewHistoryRecord, NewUser, RecoveryCode, User,
};
use crate::error::AssistantError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, AssistantError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_active_by_handle(&self, handle: &str) -> Result<Option<User>, AssistantError> {
        let model = users::Entity::find()
            .filter(users::Column::Handle.eq(handle))
            .filter(users::Column::Active.eq(true))
            .one(&self.db)
            .await
            .context("find active user by handle")?;
        Ok(model.map(user_from_model))
    }

    async fn find_active_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, AssistantError> {
        let model = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Handle.eq(identifier))
                    .add(users::Column::Email.eq(identifier)),
            )
            .filter(users::Column::Active.eq(true))
            .order_by_asc(users::Column::Id)
            .one(&self.db)
            .await
            .context("find active user by handle or email")?;
        Ok(model.map(user_from_model))
    }

    async fn handle_exists(&self, handle: &str) -> Result<bool, AssistantError> {
        let count = users::Entity::find()
            .filter(users::Column::Handle.eq(handle))
            .count(&self.db)
            .await
            .context("count users by handle")?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AssistantError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("count users by email")?;
        Ok(count > 0)
    }

    async fn create(&self, user: &NewUser) -> Result<User, AssistantError> {
        let inserted = users::ActiveModel {
            id: NotSet,
            full_name: Set(user.full_name.clone()),
            handle: Set(user.handle.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await;

        let model = match inserted {
            Ok(model) => model,
            // A concurrent registration won between the existence checks and
            // this insert. Handle still takes precedence over email.
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                let field = if self.handle_exists(&user.handle).await? {
                    IdentityField::Handle
                } else {
                    IdentityField::Email
                };
                return Err(AssistantError::DuplicateIdentity(field));
            }
            Err(e) => return Err(anyhow::Error::new(e).context("create user").into()),
        };
        Ok(user_from_model(model))
    }

    async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), AssistantError> {
        users::ActiveModel {
            id: Set(id.0),
            password_hash: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: UserId(model.id),
        full_name: model.full_name,
        handle: model.handle,
        email: model.email,
        password_hash: model.password_hash,
        active: model.active,
        created_at: model.created_at,
    }
}

// ── RecoveryCode repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecoveryCodeRepository {
    pub db: DatabaseConnection,
}

impl RecoveryCodeRepository for DbRecoveryCodeRepository {
    async fn replace_active(&self, code: &RecoveryCode) -> Result<(), AssistantError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    recovery_codes::Entity::update_many()
                        .col_expr(recovery_codes::Column::UsedAt, Expr::value(now))
                        .filter(recovery_codes::Column::UserId.eq(code.user_id.0))
                        .filter(recovery_codes::Column::UsedAt.is_null())
                        .filter(recovery_codes::Column::ExpiresAt.gt(now))
                        .exec(txn)
                        .await?;
                    recovery_codes::ActiveModel {
                        id: Set(code.id.0),
                        user_id: Set(code.user_id.0),
                        code: Set(code.code.clone()),
                        expires_at: Set(code.expires_at),
                        used_at: Set(None),
                        created_at: Set(code.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace active recovery code")?;
        Ok(())
    }

    async fn find_valid(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError> {
        let model = recovery_codes::Entity::find()
            .filter(recovery_codes::Column::UserId.eq(user_id.0))
            .filter(recovery_codes::Column::Code.eq(code))
            .filter(recovery_codes::Column::UsedAt.is_null())
            .filter(recovery_codes::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(recovery_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find valid recovery code")?;
        Ok(model.map(recovery_code_from_model))
    }

    async fn find_used(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError> {
        let model = recovery_codes::Entity::find()
            .filter(recovery_codes::Column::UserId.eq(user_id.0))
            .filter(recovery_codes::Column::Code.eq(code))
            .filter(recovery_codes::Column::UsedAt.is_not_null())
            .order_by_desc(recovery_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find used recovery code")?;
        Ok(model.map(recovery_code_from_model))
    }

    async fn find_unexpired(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<RecoveryCode>, AssistantError> {
        let model = recovery_codes::Entity::find()
            .filter(recovery_codes::Column::UserId.eq(user_id.0))
            .filter(recovery_codes::Column::Code.eq(code))
            .filter(recovery_codes::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(recovery_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find unexpired recovery code")?;
        Ok(model.map(recovery_code_from_model))
    }

    async fn mark_used(&self, code: &RecoveryCode) -> Result<(), AssistantError> {
        recovery_codes::ActiveModel {
            id: Set(code.id.0),
            used_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark recovery code used")?;
        Ok(())
    }
}

fn recovery_code_from_model(model: recovery_codes::Model) -> RecoveryCode {
    RecoveryCode {
        id: RecoveryCodeId(model.id),
        user_id: UserId(model.user_id),
        code: model.code,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    }
}

// ── History repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbHistoryRepository {
    pub db: DatabaseConnection,
}

impl DbHistoryRepository {
    async fn find_owned(
        &self,
        user_id: UserId,
        id: HistoryId,
    ) -> Result<Option<history_records::Model>, AssistantError> {
        let model = history_records::Entity::find()
            .filter(history_records::Column::Id.eq(id.0))
            .filter(history_records::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .context("find history record")?;
        Ok(model)
    }
}

impl HistoryRepository for DbHistoryRepository {
    async fn list(&self, user_id: UserId) -> Result<Vec<HistoryRecord>, AssistantError> {
        let models = history_records::Entity::find()
            .filter(history_records::Column::UserId.eq(user_id.0))
            .order_by_desc(history_records::Column::CreatedAt)
            .order_by_desc(history_records::Column::Id)
            .all(&self.db)
            .await
            .context("list history records")?;
        models.into_iter().map(history_from_model).collect()
    }

    async fn search(
        &self,
        user_id: UserId,
        term: &str,
    ) -> Result<Vec<HistoryRecord>, AssistantError> {
        let models = history_records::Entity::find()
            .filter(history_records::Column::UserId.eq(user_id.0))
            .contains_ignore_case(
                &[
                    history_records::Column::Utterance,
                    history_records::Column::Response,
                ],
                term,
            )
            .order_by_desc(history_records::Column::CreatedAt)
            .order_by_desc(history_records::Column::Id)
            .all(&self.db)
            .await
            .context("search history records")?;
        models.into_iter().map(history_from_model).collect()
    }

    async fn get(
        &self,
        user_id: UserId,
        id: HistoryId,
    ) -> Result<Option<HistoryRecord>, AssistantError> {
        self.find_owned(user_id, id)
            .await?
            .map(history_from_model)
            .transpose()
    }

    async fn create(&self, record: &NewHistoryRecord) -> Result<HistoryRecord, AssistantError> {
        let model = history_records::ActiveModel {
            id: NotSet,
            user_id: Set(record.user_id.0),
            utterance: Set(record.utterance.clone()),
            classification: Set(record.classification.as_str().to_owned()),
            response: Set(record.response.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("create history record")?;
        history_from_model(model)
    }

    async fn update(
        &self,
        user_id: UserId,
        id: HistoryId,
        changes: &HistoryChanges,
    ) -> Result<Option<HistoryRecord>, AssistantError> {
        let Some(model) = self.find_owned(user_id, id).await? else {
            return Ok(None);
        };
        let mut active: history_records::ActiveModel = model.into();
        if let Some(utterance) = &changes.utterance {
            active.utterance = Set(utterance.clone());
        }
        if let Some(response) = &changes.response {
            active.response = Set(response.clone());
        }
        let model = active
            .update(&self.db)
            .await
            .context("update history record")?;
        history_from_model(model).map(Some)
    }

    async fn delete(&self, user_id: UserId, id: HistoryId) -> Result<bool, AssistantError> {
        let result = history_records::Entity::delete_many()
            .filter(history_records::Column::Id.eq(id.0))
            .filter(history_records::Column::UserId.eq(user_id.0))
            .exec(&self.db)
            .await
            .context("delete history record")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_for_report(
        &self,
        user_id: UserId,
    ) -> Result<Vec<HistoryRecord>, AssistantError> {
        let models = history_records::Entity::find()
            .filter(history_records::Column::UserId.eq(user_id.0))
            .order_by_asc(history_records::Column::CreatedAt)
            .order_by_asc(history_records::Column::Id)
            .all(&self.db)
            .await
            .context("list history records for report")?;
        models.into_iter().map(history_from_model).collect()
    }
}

fn history_from_model(model: history_records::Model) -> Result<HistoryRecord, AssistantError> {
    let classification = model
        .classification
        .parse::<Classification>()
        .with_context(|| format!("history record {} has a bad classification", model.id))?;
    Ok(HistoryRecord {
        id: HistoryId(model.id),
        user_id: UserId(model.user_id),
        utterance: model.utterance,
        classification,
        response: model.response,
        created_at: model.created_at,
    })
}
