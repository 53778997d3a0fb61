//! # Verification Lifecycle Engine
//!
//! Owns the state and transition rules for a record from creation through
//! terminal disposition:
//!
//! ```text
//! submit            Pending
//! Pending           approve  -> Approved
//! Pending           reject   -> Rejected          (comment mandatory)
//! Rejected          resubmit -> Pending
//! Approved          flag     -> Approved+Flagged  (comment mandatory)
//! Approved+Flagged  restore  -> Approved
//! Approved+Flagged  delete-permanently            (irreversible)
//! ```
//!
//! Every transition is a compare-and-swap at the repo seam: it either
//! fully applies (new status and side effects together) or leaves the
//! record unchanged. Faculty-initiated transitions carry the concurrency
//! token the caller last read, so two reviewers racing on the same record
//! get a `Conflict` instead of a silent overwrite.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use domains::error::{DomainError, Result};
use domains::models::{Record, RecordKind, Session, VerificationStatus};
use domains::ports::{AccountRepo, DocumentStore, RecordPatch, RecordRepo, StateGuard};
use domains::schema;
use tracing::{info, warn};
use uuid::Uuid;

use crate::gate;
use crate::validate;

/// A proof document uploaded alongside a submission form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub data: Bytes,
    pub content_type: String,
}

/// The student-supplied part of a submit or resubmit request.
#[derive(Debug, Clone)]
pub struct Submission {
    pub title: String,
    pub fields: serde_json::Value,
    pub document: Option<Upload>,
}

pub struct Lifecycle {
    records: Arc<dyn RecordRepo>,
    documents: Arc<dyn DocumentStore>,
    accounts: Arc<dyn AccountRepo>,
}

impl Lifecycle {
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

    /// Creates a record in `Pending`, bound to the submitting student.
    ///
    /// Two-phase with compensation: the document is stored first; if the
    /// record insert then fails, the orphaned upload is deleted so the
    /// store holds no unreferenced proof files.
    pub async fn submit(
        &self,
        session: Session,
        kind: RecordKind,
        submission: Submission,
    ) -> Result<Record> {
        let student = gate::active_student(self.accounts.as_ref(), session).await?;
        validate::draft(kind, &submission.title, &submission.fields)?;

        if schema::requires_document(kind) && submission.document.is_none() {
            return Err(DomainError::Validation(format!(
                "{} submissions require a proof document",
                kind.slug()
            )));
        }

        let document_ref = match submission.document {
            Some(upload) => Some(
                self.documents
                    .save(upload.data, &upload.content_type)
                    .await?,
            ),
            None => None,
        };

        let now = Utc::now();
        let record = Record {
            id: Uuid::now_v7(),
            kind,
            owner_student_id: student.id,
            title: submission.title.trim().to_string(),
            fields: submission.fields,
            document_ref: document_ref.clone(),
            status: VerificationStatus::Pending,
            flag: false,
            flag_comment: None,
            faculty_comment: None,
            submission_date: now,
            updated_at: now,
            version: 0,
        };

        if let Err(err) = self.records.insert(&record).await {
            if let Some(doc_ref) = document_ref {
                self.release_document(&doc_ref).await;
            }
            return Err(err);
        }

        info!(record_id = %record.id, kind = kind.slug(), owner = %student.id, "record submitted");
        Ok(record)
    }

    /// `Pending -> Approved`, acting faculty must be the owner's advisor.
    pub async fn approve(
        &self,
        session: Session,
        id: Uuid,
        comment: Option<&str>,
        expected_version: i32,
    ) -> Result<Record> {
        let record = self.load(id).await?;
        gate::advisor_or_admin(self.accounts.as_ref(), session, record.owner_student_id).await?;

        let patch = RecordPatch {
            status: Some(VerificationStatus::Approved),
            faculty_comment: Some(validate::optional_comment(comment)),
            ..Default::default()
        };
        let updated = self
            .records
            .transition(id, pending_guard(expected_version), patch, Utc::now())
            .await?;
        info!(record_id = %id, reviewer = %session.user_id, "record approved");
        Ok(updated)
    }

    /// `Pending -> Rejected`; the comment is mandatory so the student
    /// knows what to fix.
    pub async fn reject(
        &self,
        session: Session,
        id: Uuid,
        comment: &str,
        expected_version: i32,
    ) -> Result<Record> {
        let comment = validate::mandatory_comment(comment)?;
        let record = self.load(id).await?;
        gate::advisor_or_admin(self.accounts.as_ref(), session, record.owner_student_id).await?;

        let patch = RecordPatch {
            status: Some(VerificationStatus::Rejected),
            faculty_comment: Some(Some(comment)),
            ..Default::default()
        };
        let updated = self
            .records
            .transition(id, pending_guard(expected_version), patch, Utc::now())
            .await?;
        info!(record_id = %id, reviewer = %session.user_id, "record rejected");
        Ok(updated)
    }

    /// `Rejected -> Pending`: the owner edits and resends.
    ///
    /// Same validation as submit, except the document requirement is
    /// relaxed when a prior upload exists. `submission_date` keeps the
    /// original value and the previous faculty comment is retained so the
    /// reviewer sees what prompted the edit.
    pub async fn resubmit(
        &self,
        session: Session,
        kind: RecordKind,
        id: Uuid,
        submission: Submission,
    ) -> Result<Record> {
        let student = gate::active_student(self.accounts.as_ref(), session).await?;
        let record = self.load(id).await?;
        // The record does not resolve under another kind's route.
        if record.kind != kind {
            return Err(DomainError::not_found("record", id));
        }
        if record.owner_student_id != student.id {
            return Err(DomainError::Permission(
                "only the owning student may resubmit".into(),
            ));
        }

        validate::draft(record.kind, &submission.title, &submission.fields)?;
        if schema::requires_document(record.kind)
            && submission.document.is_none()
            && record.document_ref.is_none()
        {
            return Err(DomainError::Validation(format!(
                "{} submissions require a proof document",
                record.kind.slug()
            )));
        }

        let new_document_ref = match submission.document {
            Some(upload) => Some(
                self.documents
                    .save(upload.data, &upload.content_type)
                    .await?,
            ),
            None => None,
        };

        let patch = RecordPatch {
            status: Some(VerificationStatus::Pending),
            title: Some(submission.title.trim().to_string()),
            fields: Some(submission.fields),
            document_ref: new_document_ref.clone().map(Some),
            ..Default::default()
        };
        let guard = StateGuard {
            status: VerificationStatus::Rejected,
            flagged: false,
            version: None,
        };

        match self.records.transition(id, guard, patch, Utc::now()).await {
            Ok(updated) => {
                // This record no longer references the replaced upload.
                if let (Some(new_ref), Some(old_ref)) = (&new_document_ref, &record.document_ref) {
                    if new_ref != old_ref {
                        self.release_document(old_ref).await;
                    }
                }
                info!(record_id = %id, owner = %student.id, "record resubmitted");
                Ok(updated)
            }
            Err(err) => {
                if let Some(doc_ref) = new_document_ref {
                    self.release_document(&doc_ref).await;
                }
                Err(err)
            }
        }
    }

    /// `Approved -> Approved+Flagged`: queues the record for
    /// administrative deletion review. Comment mandatory.
    pub async fn flag(
        &self,
        session: Session,
        id: Uuid,
        comment: &str,
        expected_version: i32,
    ) -> Result<Record> {
        let comment = validate::mandatory_comment(comment)?;
        let record = self.load(id).await?;
        gate::advisor_or_admin(self.accounts.as_ref(), session, record.owner_student_id).await?;

        let patch = RecordPatch {
            flag: Some(true),
            flag_comment: Some(Some(comment)),
            ..Default::default()
        };
        let guard = StateGuard {
            status: VerificationStatus::Approved,
            flagged: false,
            version: Some(expected_version),
        };
        let updated = self.records.transition(id, guard, patch, Utc::now()).await?;
        info!(record_id = %id, reviewer = %session.user_id, "record flagged");
        Ok(updated)
    }

    /// `Approved+Flagged -> Approved`: clears the flag and its comment
    /// unconditionally.
    pub async fn restore(&self, session: Session, id: Uuid) -> Result<Record> {
        let record = self.load(id).await?;
        gate::advisor_or_admin(self.accounts.as_ref(), session, record.owner_student_id).await?;

        let patch = RecordPatch {
            flag: Some(false),
            flag_comment: Some(None),
            ..Default::default()
        };
        let guard = StateGuard {
            status: VerificationStatus::Approved,
            flagged: true,
            version: None,
        };
        let updated = self.records.transition(id, guard, patch, Utc::now()).await?;
        info!(record_id = %id, actor = %session.user_id, "record restored");
        Ok(updated)
    }

    /// Destroys a flagged record and its document. Irreversible, admin
    /// only. A record that is not currently flagged does not resolve for
    /// this operation.
    pub async fn delete_permanently(&self, session: Session, id: Uuid) -> Result<()> {
        gate::require_role(session, domains::models::Role::Admin)?;
        let record = self.load(id).await?;
        if !record.is_flagged() {
            return Err(DomainError::not_found("flagged record", id));
        }

        self.records.delete(id).await?;
        if let Some(doc_ref) = &record.document_ref {
            self.release_document(doc_ref).await;
        }
        info!(record_id = %id, admin = %session.user_id, "record permanently deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Record> {
        self.records
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("record", id))
    }

    /// Stored blobs are content-addressed: identical uploads on different
    /// records share one ref. Remove the blob only once no record row
    /// references it. Best effort, logged.
    async fn release_document(&self, doc_ref: &str) {
        match self.records.count_document_refs(doc_ref).await {
            Ok(0) => {
                if let Err(err) = self.documents.delete(doc_ref).await {
                    warn!(%doc_ref, error = %err, "failed to remove unreferenced document");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(%doc_ref, error = %err, "could not check document references"),
        }
    }
}

fn pending_guard(expected_version: i32) -> StateGuard {
    StateGuard {
        status: VerificationStatus::Pending,
        flagged: false,
        version: Some(expected_version),
    }
}
