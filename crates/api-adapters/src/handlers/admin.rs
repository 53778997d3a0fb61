//! Admin surface: flagged-records review queue, vocabulary management,
//! account status, CSV export.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::models::{Account, Record, RecordKind, VerificationStatus, VocabularyTerm};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::require_session;
use crate::AppState;

pub async fn flagged(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Record>>, ApiError> {
    let session = require_session(&state, &headers)?;
    Ok(Json(state.views.flagged(session).await?))
}

pub async fn vocabulary_list(
    State(state): State<AppState>,
    Path(category): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<VocabularyTerm>>, ApiError> {
    let session = require_session(&state, &headers)?;
    Ok(Json(state.vocabulary.list(session, &category).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddTermRequest {
    pub value: String,
}

pub async fn vocabulary_add(
    State(state): State<AppState>,
    Path(category): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AddTermRequest>,
) -> Result<(StatusCode, Json<VocabularyTerm>), ApiError> {
    let session = require_session(&state, &headers)?;
    let term = state.vocabulary.add(session, &category, &body.value).await?;
    Ok((StatusCode::CREATED, Json(term)))
}

pub async fn vocabulary_remove(
    State(state): State<AppState>,
    Path((category, term_id)): Path<(String, Uuid)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = require_session(&state, &headers)?;
    state.vocabulary.remove(session, &category, term_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub status: Option<String>,
    pub kind: Option<String>,
}

pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_session(&state, &headers)?;
    let status = query
        .status
        .as_deref()
        .map(|s| {
            VerificationStatus::from_str(s)
                .ok_or_else(|| ApiError::bad_request(format!("unknown status filter: {s}")))
        })
        .transpose()?;
    let kind = query
        .kind
        .as_deref()
        .map(|k| {
            RecordKind::from_slug(k)
                .ok_or_else(|| ApiError::bad_request(format!("unknown kind filter: {k}")))
        })
        .transpose()?;

    let csv = state.export.csv(session, status, kind).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"records.csv\"".to_string(),
            ),
        ],
        csv,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct AccountStatusRequest {
    pub active: bool,
}

pub async fn account_status(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<AccountStatusRequest>,
) -> Result<Json<Account>, ApiError> {
    let session = require_session(&state, &headers)?;
    let account = state
        .accounts
        .set_active(session, account_id, body.active)
        .await?;
    Ok(Json(account))
}
