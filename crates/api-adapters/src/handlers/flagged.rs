//! Flagging sub-workflow: faculty flag approved records, admins restore
//! or permanently delete them. Both actor paths converge on the same
//! delete/restore primitives.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use domains::models::Record;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::require_session;
use crate::AppState;

/// Request body for the flag endpoint.
#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub comment: String,
    pub version: i32,
}

pub async fn flag(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<FlagRequest>,
) -> Result<Json<Record>, ApiError> {
    let session = require_session(&state, &headers)?;
    let record = state
        .lifecycle
        .flag(session, record_id, &body.comment, body.version)
        .await?;
    Ok(Json(record))
}

pub async fn restore(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Record>, ApiError> {
    let session = require_session(&state, &headers)?;
    let record = state.lifecycle.restore(session, record_id).await?;
    Ok(Json(record))
}

pub async fn delete_permanently(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let session = require_session(&state, &headers)?;
    state.lifecycle.delete_permanently(session, record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
