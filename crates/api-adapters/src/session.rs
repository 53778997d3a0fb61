//! Bearer-token session extraction.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use domains::models::Session;

use crate::error::ApiError;
use crate::AppState;

/// Pulls and verifies the `Authorization: Bearer <token>` header.
/// Missing or unverifiable tokens are a 401, distinct from the 403 the
/// permission gate produces for a valid-but-insufficient session.
pub(crate) fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing Authorization header"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("expected a bearer token"))?;
    state
        .verifier
        .verify(token)
        .map_err(|_| ApiError::unauthorized("invalid session token"))
}
