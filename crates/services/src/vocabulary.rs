//! Admin-managed dropdown vocabularies (event categories, achievement
//! levels, club positions, ...). Reads are open to any authenticated
//! caller since the vocabularies feed every submission form.

use std::sync::Arc;

use chrono::Utc;
use domains::error::{DomainError, Result};
use domains::models::{Role, Session, VocabularyTerm};
use domains::ports::VocabularyRepo;
use tracing::info;
use uuid::Uuid;

pub struct Vocabulary {
    repo: Arc<dyn VocabularyRepo>,
}

impl Vocabulary {
    pub fn new(repo: Arc<dyn VocabularyRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, _session: Session, category: &str) -> Result<Vec<VocabularyTerm>> {
        self.repo.list(category).await
    }

    pub async fn add(
        &self,
        session: Session,
        category: &str,
        value: &str,
    ) -> Result<VocabularyTerm> {
        require_admin(session)?;
        let category = category.trim();
        let value = value.trim();
        if category.is_empty() || value.is_empty() {
            return Err(DomainError::Validation(
                "vocabulary category and value must not be blank".into(),
            ));
        }

        let term = VocabularyTerm {
            id: Uuid::now_v7(),
            category: category.to_string(),
            value: value.to_string(),
            created_at: Utc::now(),
        };
        self.repo.insert(&term).await?;
        info!(category, value, "vocabulary term added");
        Ok(term)
    }

    pub async fn remove(&self, session: Session, category: &str, id: Uuid) -> Result<()> {
        require_admin(session)?;
        self.repo.delete(category, id).await?;
        info!(category, term_id = %id, "vocabulary term removed");
        Ok(())
    }
}

fn require_admin(session: Session) -> Result<()> {
    if session.role != Role::Admin {
        return Err(DomainError::Permission(
            "vocabulary management is admin only".into(),
        ));
    }
    Ok(())
}
