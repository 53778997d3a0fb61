//! Admin account-status tools. Deactivated students keep their records
//! but cannot submit new ones.

use std::sync::Arc;

use domains::error::{DomainError, Result};
use domains::models::{Account, Role, Session};
use domains::ports::AccountRepo;
use tracing::info;
use uuid::Uuid;

pub struct Accounts {
    repo: Arc<dyn AccountRepo>,
}

impl Accounts {
    pub fn new(repo: Arc<dyn AccountRepo>) -> Self {
        Self { repo }
    }

    pub async fn set_active(&self, session: Session, id: Uuid, active: bool) -> Result<Account> {
        if session.role != Role::Admin {
            return Err(DomainError::Permission(
                "account status management is admin only".into(),
            ));
        }
        let account = self.repo.set_active(id, active).await?;
        info!(account_id = %id, active, "account status changed");
        Ok(account)
    }
}
