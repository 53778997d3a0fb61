//! Status- and owner-scoped read views consumed by the portals.
//!
//! These are scoping filters on read, not security boundaries: each view
//! checks that the caller is entitled to the slice it asks for, then
//! delegates to the repo.

use std::sync::Arc;

use domains::error::{DomainError, Result};
use domains::models::{Record, RecordKind, Role, Session, StoredDocument, VerificationStatus};
use domains::ports::{AccountRepo, DocumentStore, RecordRepo};
use uuid::Uuid;

pub struct Views {
    records: Arc<dyn RecordRepo>,
    documents: Arc<dyn DocumentStore>,
    accounts: Arc<dyn AccountRepo>,
}

impl Views {
    pub fn new(
        records: Arc<dyn RecordRepo>,
        documents: Arc<dyn DocumentStore>,
        accounts: Arc<dyn AccountRepo>,
    ) -> Self {
        Self {
            records,
            documents,
            accounts,
        }
    }

    /// A student's own records of one kind. Visible to the student, their
    /// advisor, and admins.
    pub async fn student_records(
        &self,
        session: Session,
        kind: RecordKind,
        student_id: Uuid,
    ) -> Result<Vec<Record>> {
        self.require_record_access(session, student_id).await?;
        self.records.list_by_owner(kind, student_id).await
    }

    /// The pending queue across a faculty member's advisees.
    pub async fn pending_queue(&self, session: Session, faculty_id: Uuid) -> Result<Vec<Record>> {
        match session.role {
            Role::Admin => {}
            Role::Faculty if session.user_id == faculty_id => {}
            _ => {
                return Err(DomainError::Permission(
                    "pending queue is scoped to the owning faculty member".into(),
                ))
            }
        }
        let advisees = self.accounts.advisees_of(faculty_id).await?;
        self.records.list_pending_for(advisees).await
    }

    /// The approved collection (unflagged half) served to faculty for
    /// review and flagging.
    pub async fn approved(&self, session: Session) -> Result<Vec<Record>> {
        if session.role == Role::Student {
            return Err(DomainError::Permission(
                "approved collection is a reviewer view".into(),
            ));
        }
        self.records
            .list_status(VerificationStatus::Approved, Some(false))
            .await
    }

    /// A student's records currently in the given status.
    pub async fn student_by_status(
        &self,
        session: Session,
        student_id: Uuid,
        status: VerificationStatus,
    ) -> Result<Vec<Record>> {
        self.require_record_access(session, student_id).await?;
        self.records.list_owner_status(student_id, status).await
    }

    /// The admin flagged-records review queue.
    pub async fn flagged(&self, session: Session) -> Result<Vec<Record>> {
        if session.role != Role::Admin {
            return Err(DomainError::Permission(
                "flagged review queue is admin only".into(),
            ));
        }
        self.records
            .list_status(VerificationStatus::Approved, Some(true))
            .await
    }

    /// Streams the proof document attached to a record.
    pub async fn download(&self, session: Session, record_id: Uuid) -> Result<StoredDocument> {
        let record = self
            .records
            .get(record_id)
            .await?
            .ok_or_else(|| DomainError::not_found("record", record_id))?;
        self.require_record_access(session, record.owner_student_id)
            .await?;
        let doc_ref = record
            .document_ref
            .as_deref()
            .ok_or_else(|| DomainError::not_found("document", record_id))?;
        self.documents.open(doc_ref).await
    }

    /// Owner, owner's advisor, or admin.
    async fn require_record_access(&self, session: Session, owner_student_id: Uuid) -> Result<()> {
        match session.role {
            Role::Admin => Ok(()),
            Role::Student if session.user_id == owner_student_id => Ok(()),
            Role::Student => Err(DomainError::Permission(
                "students see only their own records".into(),
            )),
            Role::Faculty => {
                let owner = self
                    .accounts
                    .get(owner_student_id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("account", owner_student_id))?;
                if owner.advisor_id == Some(session.user_id) {
                    Ok(())
                } else {
                    Err(DomainError::Permission(
                        "faculty see only their advisees' records".into(),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::ports::{MockAccountRepo, MockDocumentStore, MockRecordRepo};

    fn views(records: MockRecordRepo, accounts: MockAccountRepo) -> Views {
        Views::new(
            Arc::new(records),
            Arc::new(MockDocumentStore::new()),
            Arc::new(accounts),
        )
    }

    #[tokio::test]
    async fn student_cannot_read_another_students_records() {
        let session = Session {
            user_id: Uuid::now_v7(),
            role: Role::Student,
        };
        let err = views(MockRecordRepo::new(), MockAccountRepo::new())
            .student_records(session, RecordKind::SportsEvent, Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Permission(_)));
    }

    #[tokio::test]
    async fn pending_queue_scoped_to_owning_faculty() {
        let session = Session {
            user_id: Uuid::now_v7(),
            role: Role::Faculty,
        };
        let err = views(MockRecordRepo::new(), MockAccountRepo::new())
            .pending_queue(session, Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Permission(_)));
    }

    #[tokio::test]
    async fn flagged_queue_is_admin_only() {
        let session = Session {
            user_id: Uuid::now_v7(),
            role: Role::Faculty,
        };
        let err = views(MockRecordRepo::new(), MockAccountRepo::new())
            .flagged(session)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Permission(_)));
    }
}
