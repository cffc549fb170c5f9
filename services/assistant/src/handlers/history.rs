use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use vox_domain::command::Classification;
use vox_domain::id::HistoryId;

use crate::domain::types::{HistoryChanges, HistoryRecord};
use crate::error::AssistantError;
use crate::handlers::session::CurrentUser;
use crate::state::AppState;
use crate::usecase::history::{
    DeleteHistoryUseCase, GetHistoryUseCase, ListHistoryUseCase, UpdateHistoryUseCase,
};
use crate::usecase::report::GenerateReportUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HistoryResponse {
    pub id: HistoryId,
    pub utterance: String,
    pub classification: Classification,
    pub response: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<HistoryRecord> for HistoryResponse {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            utterance: record.utterance,
            classification: record.classification,
            response: record.response,
            created_at: record.created_at,
        }
    }
}

// ── GET /histories ───────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct HistoryListQuery {
    pub search: Option<String>,
}

pub async fn list_histories(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<HistoryListQuery>,
) -> Result<Json<Vec<HistoryResponse>>, AssistantError> {
    let usecase = ListHistoryUseCase {
        repo: state.history_repo(),
    };
    let records = usecase.execute(user.id, query.search.as_deref()).await?;
    Ok(Json(records.into_iter().map(HistoryResponse::from).collect()))
}

// ── GET /histories/{id} ──────────────────────────────────────────────────────

pub async fn get_history(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<HistoryId>,
) -> Result<Json<HistoryResponse>, AssistantError> {
    let usecase = GetHistoryUseCase {
        repo: state.history_repo(),
    };
    let record = usecase.execute(user.id, id).await?;
    Ok(Json(record.into()))
}

// ── PATCH /histories/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateHistoryRequest {
    pub utterance: Option<String>,
    pub response: Option<String>,
}

pub async fn update_history(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<HistoryId>,
    Json(body): Json<UpdateHistoryRequest>,
) -> Result<Json<HistoryResponse>, AssistantError> {
    let usecase = UpdateHistoryUseCase {
        repo: state.history_repo(),
    };
    let record = usecase
        .execute(
            user.id,
            id,
            HistoryChanges {
                utterance: body.utterance,
                response: body.response,
            },
        )
        .await?;
    Ok(Json(record.into()))
}

// ── DELETE /histories/{id} ───────────────────────────────────────────────────

pub async fn delete_history(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<HistoryId>,
) -> Result<StatusCode, AssistantError> {
    let usecase = DeleteHistoryUseCase {
        repo: state.history_repo(),
    };
    usecase.execute(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /histories/report ────────────────────────────────────────────────────

pub async fn download_report(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AssistantError> {
    let usecase = GenerateReportUseCase {
        repo: state.history_repo(),
    };
    let report = usecase.execute(&user).await?;
    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    ))
}
