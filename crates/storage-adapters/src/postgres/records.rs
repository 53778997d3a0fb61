//! Record repository over PostgreSQL.
//!
//! Transitions are a single compare-and-swap UPDATE: the WHERE clause
//! carries the expected status, flag, and (when given) version, so a
//! concurrent reviewer can never overwrite a transition they did not see.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::error::{DomainError, Result};
use domains::models::{Record, RecordKind, VerificationStatus};
use domains::ports::{RecordPatch, RecordRepo, StateGuard};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use super::{bad_row, db_error};

pub struct PgRecordRepo {
    pool: PgPool,
}

impl PgRecordRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &PgRow) -> Result<Record> {
    let kind_slug: String = row.get("kind");
    let status_str: String = row.get("status");
    Ok(Record {
        id: row.get("id"),
        kind: RecordKind::from_slug(&kind_slug).ok_or_else(|| bad_row("kind", &kind_slug))?,
        owner_student_id: row.get("owner_student_id"),
        title: row.get("title"),
        fields: row.get("fields"),
        document_ref: row.get("document_ref"),
        status: VerificationStatus::from_str(&status_str)
            .ok_or_else(|| bad_row("status", &status_str))?,
        flag: row.get("flag"),
        flag_comment: row.get("flag_comment"),
        faculty_comment: row.get("faculty_comment"),
        submission_date: row.get("submission_date"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    })
}

const SELECT_COLS: &str = "id, kind, owner_student_id, title, fields, document_ref, status, \
                           flag, flag_comment, faculty_comment, submission_date, updated_at, version";

#[async_trait]
impl RecordRepo for PgRecordRepo {
    async fn insert(&self, record: &Record) -> Result<()> {
        sqlx::query(
            "INSERT INTO records (id, kind, owner_student_id, title, fields, document_ref, \
             status, flag, flag_comment, faculty_comment, submission_date, updated_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(record.id)
        .bind(record.kind.slug())
        .bind(record.owner_student_id)
        .bind(&record.title)
        .bind(&record.fields)
        .bind(&record.document_ref)
        .bind(record.status.as_str())
        .bind(record.flag)
        .bind(&record.flag_comment)
        .bind(&record.faculty_comment)
        .bind(record.submission_date)
        .bind(record.updated_at)
        .bind(record.version)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Record>> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM records WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn transition(
        &self,
        id: Uuid,
        guard: StateGuard,
        patch: RecordPatch,
        now: DateTime<Utc>,
    ) -> Result<Record> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("UPDATE records SET version = version + 1, updated_at = ");
        qb.push_bind(now);
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(flag) = patch.flag {
            qb.push(", flag = ").push_bind(flag);
        }
        if let Some(flag_comment) = patch.flag_comment {
            qb.push(", flag_comment = ").push_bind(flag_comment);
        }
        if let Some(faculty_comment) = patch.faculty_comment {
            qb.push(", faculty_comment = ").push_bind(faculty_comment);
        }
        if let Some(title) = patch.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(fields) = patch.fields {
            qb.push(", fields = ").push_bind(fields);
        }
        if let Some(document_ref) = patch.document_ref {
            qb.push(", document_ref = ").push_bind(document_ref);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" AND status = ").push_bind(guard.status.as_str());
        qb.push(" AND flag = ").push_bind(guard.flagged);
        if let Some(version) = guard.version {
            qb.push(" AND version = ").push_bind(version);
        }
        qb.push(format!(" RETURNING {SELECT_COLS}"));

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => row_to_record(&row),
            // No row matched: work out whether the caller lost a race or
            // the record is simply not in the expected state.
            None => {
                let current = sqlx::query("SELECT status, flag, version FROM records WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(db_error)?;
                match current {
                    Some(row) => {
                        let status: String = row.get("status");
                        let flag: bool = row.get("flag");
                        let version: i32 = row.get("version");
                        if status == guard.status.as_str() && flag == guard.flagged {
                            Err(DomainError::Conflict(format!(
                                "record {id} changed: expected version {}, found {version}",
                                guard.version.unwrap_or(version)
                            )))
                        } else {
                            Err(DomainError::not_found("record", id))
                        }
                    }
                    None => Err(DomainError::not_found("record", id)),
                }
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Guarded like transition: a restore racing the delete flips the
        // flag first and the delete matches nothing.
        let result = sqlx::query(
            "DELETE FROM records WHERE id = $1 AND status = 'approved' AND flag = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("record", id));
        }
        Ok(())
    }

    async fn count_document_refs(&self, document_ref: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM records WHERE document_ref = $1")
            .bind(document_ref)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.get("n"))
    }

    async fn list_by_owner(&self, kind: RecordKind, owner: Uuid) -> Result<Vec<Record>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM records \
             WHERE kind = $1 AND owner_student_id = $2 ORDER BY submission_date ASC"
        ))
        .bind(kind.slug())
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn list_owner_status(
        &self,
        owner: Uuid,
        status: VerificationStatus,
    ) -> Result<Vec<Record>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM records \
             WHERE owner_student_id = $1 AND status = $2 ORDER BY submission_date ASC"
        ))
        .bind(owner)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn list_pending_for(&self, advisees: Vec<Uuid>) -> Result<Vec<Record>> {
        if advisees.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLS} FROM records \
             WHERE status = 'pending' AND owner_student_id = ANY($1) \
             ORDER BY submission_date ASC"
        ))
        .bind(&advisees)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn list_status(
        &self,
        status: VerificationStatus,
        flagged: Option<bool>,
    ) -> Result<Vec<Record>> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {SELECT_COLS} FROM records WHERE status = "));
        qb.push_bind(status.as_str());
        if let Some(flag) = flagged {
            qb.push(" AND flag = ").push_bind(flag);
        }
        qb.push(" ORDER BY submission_date ASC");
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn list_filtered(
        &self,
        status: Option<VerificationStatus>,
        kind: Option<RecordKind>,
    ) -> Result<Vec<Record>> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {SELECT_COLS} FROM records WHERE TRUE"));
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(kind) = kind {
            qb.push(" AND kind = ").push_bind(kind.slug());
        }
        qb.push(" ORDER BY submission_date ASC");
        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_error)?;
        rows.iter().map(row_to_record).collect()
    }
}
