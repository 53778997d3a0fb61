//! Account directory over PostgreSQL.

use async_trait::async_trait;
use domains::error::{DomainError, Result};
use domains::models::{Account, Role};
use domains::ports::AccountRepo;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{bad_row, db_error};

pub struct PgAccountRepo {
    pool: PgPool,
}

impl PgAccountRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: &PgRow) -> Result<Account> {
    let role_str: String = row.get("role");
    Ok(Account {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: Role::from_str(&role_str).ok_or_else(|| bad_row("role", &role_str))?,
        advisor_id: row.get("advisor_id"),
        active: row.get("active"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl AccountRepo for PgAccountRepo {
    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, name, email, role, advisor_id, active, created_at \
             FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.as_ref().map(row_to_account).transpose()
    }

    async fn insert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            "INSERT INTO accounts (id, name, email, role, advisor_id, active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(account.role.as_str())
        .bind(account.advisor_id)
        .bind(account.active)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn advisees_of(&self, faculty_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM accounts WHERE advisor_id = $1")
            .bind(faculty_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Account> {
        let row = sqlx::query(
            "UPDATE accounts SET active = $2 WHERE id = $1 \
             RETURNING id, name, email, role, advisor_id, active, created_at",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        match row {
            Some(row) => row_to_account(&row),
            None => Err(DomainError::not_found("account", id)),
        }
    }
}
