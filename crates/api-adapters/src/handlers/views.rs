//! Status-scoped read views and document download.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::models::{Record, VerificationStatus};
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::require_session;
use crate::AppState;

pub async fn approved(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Record>>, ApiError> {
    let session = require_session(&state, &headers)?;
    Ok(Json(state.views.approved(session).await?))
}

pub async fn student_pending(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Record>>, ApiError> {
    let session = require_session(&state, &headers)?;
    let records = state
        .views
        .student_by_status(session, student_id, VerificationStatus::Pending)
        .await?;
    Ok(Json(records))
}

pub async fn student_rejected(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Record>>, ApiError> {
    let session = require_session(&state, &headers)?;
    let records = state
        .views
        .student_by_status(session, student_id, VerificationStatus::Rejected)
        .await?;
    Ok(Json(records))
}

pub async fn download(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = require_session(&state, &headers)?;
    let doc = state.views.download(session, record_id).await?;
    Ok(([(header::CONTENT_TYPE, doc.content_type)], doc.data).into_response())
}
