//! Draft validation against the per-kind field schemas.

use domains::error::{DomainError, Result};
use domains::models::RecordKind;
use domains::schema;

/// A comment that must carry content (reject reason, flag reason).
/// Returns the trimmed comment.
pub fn mandatory_comment(comment: &str) -> Result<String> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("comment must not be blank".into()));
    }
    Ok(trimmed.to_string())
}

/// An optional comment: blank collapses to `None`.
pub fn optional_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Checks the title and the kind-specific field bucket of a draft.
///
/// Every schema-required field must be present and non-blank. The error
/// message names all missing fields at once so the student fixes the form
/// in one pass.
pub fn draft(kind: RecordKind, title: &str, fields: &serde_json::Value) -> Result<()> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be blank".into()));
    }

    let map = fields
        .as_object()
        .ok_or_else(|| DomainError::Validation("fields must be a JSON object".into()))?;

    let missing: Vec<&str> = schema::required_fields(kind)
        .iter()
        .copied()
        .filter(|name| match map.get(*name) {
            Some(serde_json::Value::String(s)) => s.trim().is_empty(),
            Some(serde_json::Value::Null) | None => true,
            Some(_) => false,
        })
        .collect();

    if !missing.is_empty() {
        return Err(DomainError::Validation(format!(
            "missing required fields for {}: {}",
            kind.slug(),
            missing.join(", ")
        )));
    }

    Ok(())
}
