//! Dropdown vocabulary storage over PostgreSQL.

use async_trait::async_trait;
use domains::error::{DomainError, Result};
use domains::models::VocabularyTerm;
use domains::ports::VocabularyRepo;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::db_error;

pub struct PgVocabularyRepo {
    pool: PgPool,
}

impl PgVocabularyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VocabularyRepo for PgVocabularyRepo {
    async fn list(&self, category: &str) -> Result<Vec<VocabularyTerm>> {
        let rows = sqlx::query(
            "SELECT id, category, value, created_at FROM vocabulary_terms \
             WHERE category = $1 ORDER BY value ASC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows
            .iter()
            .map(|row| VocabularyTerm {
                id: row.get("id"),
                category: row.get("category"),
                value: row.get("value"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn insert(&self, term: &VocabularyTerm) -> Result<()> {
        // Relies on the UNIQUE (category, value) constraint; db_error maps
        // the 23505 violation to Conflict.
        sqlx::query(
            "INSERT INTO vocabulary_terms (id, category, value, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(term.id)
        .bind(&term.category)
        .bind(&term.value)
        .bind(term.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn delete(&self, category: &str, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM vocabulary_terms WHERE category = $1 AND id = $2")
            .bind(category)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("vocabulary term", id));
        }
        Ok(())
    }
}
