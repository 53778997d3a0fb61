//! Submission and faculty-review endpoints.

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use domains::models::{Record, RecordKind, Role};
use serde::Deserialize;
use services::{Submission, Upload};
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::require_session;
use crate::AppState;

/// Request body for the approve endpoint.
#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub comment: Option<String>,
    pub version: i32,
}

/// Request body for the reject endpoint.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub comment: String,
    pub version: i32,
}

fn parse_kind(slug: &str) -> Result<RecordKind, ApiError> {
    RecordKind::from_slug(slug)
        .ok_or_else(|| ApiError::Domain(domains::error::DomainError::not_found("record kind", slug)))
}

/// Reads the multipart form into a [`Submission`]: `title` and `document`
/// are well-known parts, every other text part lands in the kind-specific
/// field bucket.
async fn read_submission(mut multipart: Multipart) -> Result<Submission, ApiError> {
    let mut title = String::new();
    let mut fields = serde_json::Map::new();
    let mut document = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "document" {
            let content_type = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("document upload failed: {e}")))?;
            // An empty file part means the form had no attachment.
            if !data.is_empty() {
                document = Some(Upload { data, content_type });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("malformed field '{name}': {e}")))?;
            if name == "title" {
                title = value;
            } else {
                fields.insert(name, serde_json::Value::String(value));
            }
        }
    }

    Ok(Submission {
        title,
        fields: serde_json::Value::Object(fields),
        document,
    })
}

pub async fn submit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let session = require_session(&state, &headers)?;
    let kind = parse_kind(&kind)?;
    let submission = read_submission(multipart).await?;
    let record = state.lifecycle.submit(session, kind, submission).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn resubmit(
    State(state): State<AppState>,
    Path((kind, record_id)): Path<(String, Uuid)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<Record>, ApiError> {
    let session = require_session(&state, &headers)?;
    let kind = parse_kind(&kind)?;
    let submission = read_submission(multipart).await?;
    let record = state
        .lifecycle
        .resubmit(session, kind, record_id, submission)
        .await?;
    Ok(Json(record))
}

pub async fn student_records(
    State(state): State<AppState>,
    Path((kind, student_id)): Path<(String, Uuid)>,
    headers: HeaderMap,
) -> Result<Json<Vec<Record>>, ApiError> {
    let session = require_session(&state, &headers)?;
    let kind = parse_kind(&kind)?;
    let records = state.views.student_records(session, kind, student_id).await?;
    Ok(Json(records))
}

pub async fn pending_queue(
    State(state): State<AppState>,
    Path(faculty_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<Record>>, ApiError> {
    let session = require_session(&state, &headers)?;
    let records = state.views.pending_queue(session, faculty_id).await?;
    Ok(Json(records))
}

/// The faculty id in the path must be the caller (admins excepted); a
/// reviewer cannot act under a colleague's queue URL.
fn check_faculty_path(
    session: domains::models::Session,
    faculty_id: Uuid,
) -> Result<(), ApiError> {
    if session.role != Role::Admin && session.user_id != faculty_id {
        return Err(ApiError::Domain(domains::error::DomainError::Permission(
            "path faculty id does not match the session".into(),
        )));
    }
    Ok(())
}

pub async fn approve(
    State(state): State<AppState>,
    Path((faculty_id, record_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(body): Json<ApproveRequest>,
) -> Result<Json<Record>, ApiError> {
    let session = require_session(&state, &headers)?;
    check_faculty_path(session, faculty_id)?;
    let record = state
        .lifecycle
        .approve(session, record_id, body.comment.as_deref(), body.version)
        .await?;
    Ok(Json(record))
}

pub async fn reject(
    State(state): State<AppState>,
    Path((faculty_id, record_id)): Path<(Uuid, Uuid)>,
    headers: HeaderMap,
    Json(body): Json<RejectRequest>,
) -> Result<Json<Record>, ApiError> {
    let session = require_session(&state, &headers)?;
    check_faculty_path(session, faculty_id)?;
    let record = state
        .lifecycle
        .reject(session, record_id, &body.comment, body.version)
        .await?;
    Ok(Json(record))
}
