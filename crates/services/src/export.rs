//! Admin CSV export of the record collection.

use std::sync::Arc;

use domains::error::{DomainError, Result};
use domains::models::{Record, RecordKind, Role, Session, VerificationStatus};
use domains::ports::RecordRepo;

const HEADER: &str =
    "id,kind,owner_student_id,title,status,flag,flag_comment,faculty_comment,submission_date,updated_at";

pub struct Export {
    records: Arc<dyn RecordRepo>,
}

impl Export {
    pub fn new(records: Arc<dyn RecordRepo>) -> Self {
        Self { records }
    }

    /// Renders the (optionally status/kind-narrowed) record collection as
    /// CSV, header row first, rows in repo order.
    pub async fn csv(
        &self,
        session: Session,
        status: Option<VerificationStatus>,
        kind: Option<RecordKind>,
    ) -> Result<String> {
        if session.role != Role::Admin {
            return Err(DomainError::Permission("export is admin only".into()));
        }
        let records = self.records.list_filtered(status, kind).await?;

        let mut out = String::with_capacity(64 * (records.len() + 1));
        out.push_str(HEADER);
        out.push_str("\r\n");
        for record in &records {
            out.push_str(&row(record));
            out.push_str("\r\n");
        }
        Ok(out)
    }
}

fn row(record: &Record) -> String {
    [
        record.id.to_string(),
        record.kind.slug().to_string(),
        record.owner_student_id.to_string(),
        field(&record.title),
        record.status.as_str().to_string(),
        record.flag.to_string(),
        field(record.flag_comment.as_deref().unwrap_or("")),
        field(record.faculty_comment.as_deref().unwrap_or("")),
        record.submission_date.to_rfc3339(),
        record.updated_at.to_rfc3339(),
    ]
    .join(",")
}

/// RFC 4180 quoting: fields containing commas, quotes, or line breaks are
/// wrapped in double quotes with embedded quotes doubled.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
