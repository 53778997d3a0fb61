//! PostgreSQL implementations of the storage ports.
//!
//! This module implements the data mapping between the relational model
//! and the domain models. Schema creation is idempotent and embedded so a
//! fresh database is usable without an external migration step.

use std::time::Duration;

use domains::error::{DomainError, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, error, info};

mod accounts;
mod records;
mod vocabulary;

pub use accounts::PgAccountRepo;
pub use records::PgRecordRepo;
pub use vocabulary::PgVocabularyRepo;

const SCHEMA_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        email       TEXT NOT NULL UNIQUE,
        role        TEXT NOT NULL,
        advisor_id  UUID REFERENCES accounts(id),
        active      BOOLEAN NOT NULL DEFAULT TRUE,
        created_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS records (
        id               UUID PRIMARY KEY,
        kind             TEXT NOT NULL,
        owner_student_id UUID NOT NULL REFERENCES accounts(id),
        title            TEXT NOT NULL,
        fields           JSONB NOT NULL,
        document_ref     TEXT,
        status           TEXT NOT NULL,
        flag             BOOLEAN NOT NULL DEFAULT FALSE,
        flag_comment     TEXT,
        faculty_comment  TEXT,
        submission_date  TIMESTAMPTZ NOT NULL,
        updated_at       TIMESTAMPTZ NOT NULL,
        version          INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_records_owner ON records (owner_student_id, status)",
    "CREATE INDEX IF NOT EXISTS idx_records_status ON records (status, flag)",
    r#"
    CREATE TABLE IF NOT EXISTS vocabulary_terms (
        id          UUID PRIMARY KEY,
        category    TEXT NOT NULL,
        value       TEXT NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        UNIQUE (category, value)
    )
    "#,
];

/// Opens a pool and verifies the database is reachable.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(60))
        .connect_lazy(database_url)
        .map_err(|e| {
            error!("failed to create connection pool: {e}");
            DomainError::Internal(format!("connection pool: {e}"))
        })?;

    if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
        error!("database connectivity test failed: {e}");
        return Err(DomainError::Internal(format!(
            "database is not accessible: {e}"
        )));
    }

    info!("PostgreSQL connection established");
    Ok(pool)
}

/// Creates the tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for ddl in SCHEMA_DDL {
        debug!("applying schema statement");
        sqlx::query(ddl).execute(pool).await.map_err(db_error)?;
    }
    info!("database schema ready");
    Ok(())
}

pub(crate) fn db_error(e: sqlx::Error) -> DomainError {
    if let Some(db) = e.as_database_error() {
        // 23505: unique_violation
        if db.code().as_deref() == Some("23505") {
            return DomainError::Conflict(db.message().to_string());
        }
    }
    DomainError::Internal(format!("database error: {e}"))
}

pub(crate) fn bad_row(what: &str, value: &str) -> DomainError {
    DomainError::Internal(format!("unexpected {what} value in database: {value}"))
}
