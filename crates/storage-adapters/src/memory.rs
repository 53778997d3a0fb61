//! In-memory implementations of the storage ports.
//!
//! These back the integration tests and local tooling; they implement the
//! same guarded-transition semantics the PostgreSQL adapter enforces with
//! a compare-and-swap UPDATE.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use domains::error::{DomainError, Result};
use domains::models::{
    Account, Record, RecordKind, StoredDocument, VerificationStatus, VocabularyTerm,
};
use domains::ports::{
    AccountRepo, DocumentStore, RecordPatch, RecordRepo, StateGuard, VocabularyRepo,
};
use uuid::Uuid;

fn apply_patch(record: &mut Record, patch: RecordPatch, now: DateTime<Utc>) {
    if let Some(status) = patch.status {
        record.status = status;
    }
    if let Some(flag) = patch.flag {
        record.flag = flag;
    }
    if let Some(flag_comment) = patch.flag_comment {
        record.flag_comment = flag_comment;
    }
    if let Some(faculty_comment) = patch.faculty_comment {
        record.faculty_comment = faculty_comment;
    }
    if let Some(title) = patch.title {
        record.title = title;
    }
    if let Some(fields) = patch.fields {
        record.fields = fields;
    }
    if let Some(document_ref) = patch.document_ref {
        record.document_ref = document_ref;
    }
    record.updated_at = now;
    record.version += 1;
}

#[derive(Default)]
pub struct InMemoryRecordRepo {
    records: RwLock<HashMap<Uuid, Record>>,
}

impl InMemoryRecordRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut records: Vec<Record>) -> Vec<Record> {
        records.sort_by(|a, b| a.submission_date.cmp(&b.submission_date));
        records
    }
}

#[async_trait]
impl RecordRepo for InMemoryRecordRepo {
    async fn insert(&self, record: &Record) -> Result<()> {
        let mut records = self.records.write().unwrap();
        if records.contains_key(&record.id) {
            return Err(DomainError::Conflict(format!(
                "record {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Record>> {
        Ok(self.records.read().unwrap().get(&id).cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        guard: StateGuard,
        patch: RecordPatch,
        now: DateTime<Utc>,
    ) -> Result<Record> {
        let mut records = self.records.write().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("record", id))?;

        if record.status != guard.status || record.flag != guard.flagged {
            // Wrong state: the record does not resolve for this transition.
            return Err(DomainError::not_found("record", id));
        }
        if let Some(expected) = guard.version {
            if record.version != expected {
                return Err(DomainError::Conflict(format!(
                    "record {} changed: expected version {}, found {}",
                    id, expected, record.version
                )));
            }
        }

        apply_patch(record, patch, now);
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.write().unwrap();
        match records.get(&id) {
            Some(r) if r.status == VerificationStatus::Approved && r.flag => {
                records.remove(&id);
                Ok(())
            }
            // Not flagged (anymore): the delete does not resolve.
            _ => Err(DomainError::not_found("record", id)),
        }
    }

    async fn count_document_refs(&self, document_ref: &str) -> Result<i64> {
        let records = self.records.read().unwrap();
        Ok(records
            .values()
            .filter(|r| r.document_ref.as_deref() == Some(document_ref))
            .count() as i64)
    }

    async fn list_by_owner(&self, kind: RecordKind, owner: Uuid) -> Result<Vec<Record>> {
        let records = self.records.read().unwrap();
        Ok(Self::sorted(
            records
                .values()
                .filter(|r| r.kind == kind && r.owner_student_id == owner)
                .cloned()
                .collect(),
        ))
    }

    async fn list_owner_status(
        &self,
        owner: Uuid,
        status: VerificationStatus,
    ) -> Result<Vec<Record>> {
        let records = self.records.read().unwrap();
        Ok(Self::sorted(
            records
                .values()
                .filter(|r| r.owner_student_id == owner && r.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn list_pending_for(&self, advisees: Vec<Uuid>) -> Result<Vec<Record>> {
        let records = self.records.read().unwrap();
        Ok(Self::sorted(
            records
                .values()
                .filter(|r| {
                    r.status == VerificationStatus::Pending
                        && advisees.contains(&r.owner_student_id)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn list_status(
        &self,
        status: VerificationStatus,
        flagged: Option<bool>,
    ) -> Result<Vec<Record>> {
        let records = self.records.read().unwrap();
        Ok(Self::sorted(
            records
                .values()
                .filter(|r| r.status == status && flagged.map_or(true, |f| r.flag == f))
                .cloned()
                .collect(),
        ))
    }

    async fn list_filtered(
        &self,
        status: Option<VerificationStatus>,
        kind: Option<RecordKind>,
    ) -> Result<Vec<Record>> {
        let records = self.records.read().unwrap();
        Ok(Self::sorted(
            records
                .values()
                .filter(|r| {
                    status.map_or(true, |s| r.status == s) && kind.map_or(true, |k| r.kind == k)
                })
                .cloned()
                .collect(),
        ))
    }
}

#[derive(Default)]
pub struct InMemoryAccountRepo {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepo for InMemoryAccountRepo {
    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().unwrap().get(&id).cloned())
    }

    async fn insert(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().unwrap();
        if accounts.contains_key(&account.id) {
            return Err(DomainError::Conflict(format!(
                "account {} already exists",
                account.id
            )));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn advisees_of(&self, faculty_id: Uuid) -> Result<Vec<Uuid>> {
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .values()
            .filter(|a| a.advisor_id == Some(faculty_id))
            .map(|a| a.id)
            .collect())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Account> {
        let mut accounts = self.accounts.write().unwrap();
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("account", id))?;
        account.active = active;
        Ok(account.clone())
    }
}

#[derive(Default)]
pub struct InMemoryVocabularyRepo {
    terms: RwLock<Vec<VocabularyTerm>>,
}

impl InMemoryVocabularyRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VocabularyRepo for InMemoryVocabularyRepo {
    async fn list(&self, category: &str) -> Result<Vec<VocabularyTerm>> {
        let terms = self.terms.read().unwrap();
        Ok(terms
            .iter()
            .filter(|t| t.category == category)
            .cloned()
            .collect())
    }

    async fn insert(&self, term: &VocabularyTerm) -> Result<()> {
        let mut terms = self.terms.write().unwrap();
        if terms
            .iter()
            .any(|t| t.category == term.category && t.value == term.value)
        {
            return Err(DomainError::Conflict(format!(
                "vocabulary term '{}' already exists in {}",
                term.value, term.category
            )));
        }
        terms.push(term.clone());
        Ok(())
    }

    async fn delete(&self, category: &str, id: Uuid) -> Result<()> {
        let mut terms = self.terms.write().unwrap();
        let before = terms.len();
        terms.retain(|t| !(t.category == category && t.id == id));
        if terms.len() == before {
            return Err(DomainError::not_found("vocabulary term", id));
        }
        Ok(())
    }
}

/// Keeps documents in a map keyed by content hash; mirrors the local
/// store's dedupe behavior without touching the filesystem.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, data: Bytes, content_type: &str) -> Result<String> {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let key = hex::encode(hasher.finalize());
        self.documents.write().unwrap().insert(
            key.clone(),
            StoredDocument {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(key)
    }

    async fn open(&self, document_ref: &str) -> Result<StoredDocument> {
        self.documents
            .read()
            .unwrap()
            .get(document_ref)
            .cloned()
            .ok_or_else(|| DomainError::not_found("document", document_ref))
    }

    async fn delete(&self, document_ref: &str) -> Result<()> {
        self.documents.write().unwrap().remove(document_ref);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(status: VerificationStatus, flag: bool) -> Record {
        let now = Utc::now();
        Record {
            id: Uuid::now_v7(),
            kind: RecordKind::CulturalEvent,
            owner_student_id: Uuid::now_v7(),
            title: "Annual fest".into(),
            fields: json!({ "host": "arts council" }),
            document_ref: None,
            status,
            flag,
            flag_comment: None,
            faculty_comment: None,
            submission_date: now,
            updated_at: now,
            version: 0,
        }
    }

    #[tokio::test]
    async fn transition_enforces_state_guard() {
        let repo = InMemoryRecordRepo::new();
        let rec = record(VerificationStatus::Approved, false);
        repo.insert(&rec).await.unwrap();

        // Approve expects Pending; the approved record does not resolve.
        let err = repo
            .transition(
                rec.id,
                StateGuard {
                    status: VerificationStatus::Pending,
                    flagged: false,
                    version: Some(0),
                },
                RecordPatch::default(),
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn transition_detects_stale_version() {
        let repo = InMemoryRecordRepo::new();
        let rec = record(VerificationStatus::Pending, false);
        repo.insert(&rec).await.unwrap();

        let guard = StateGuard {
            status: VerificationStatus::Pending,
            flagged: false,
            version: Some(0),
        };
        let patch = RecordPatch {
            status: Some(VerificationStatus::Approved),
            ..Default::default()
        };
        let updated = repo
            .transition(rec.id, guard, patch, Utc::now())
            .await
            .unwrap();
        assert_eq!(updated.version, 1);

        // A second reviewer racing with the stale version gets a conflict.
        let err = repo
            .transition(
                rec.id,
                StateGuard {
                    status: VerificationStatus::Approved,
                    flagged: false,
                    version: Some(0),
                },
                RecordPatch {
                    flag: Some(true),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_status_narrows_by_flag() {
        let repo = InMemoryRecordRepo::new();
        let plain = record(VerificationStatus::Approved, false);
        let flagged = record(VerificationStatus::Approved, true);
        repo.insert(&plain).await.unwrap();
        repo.insert(&flagged).await.unwrap();

        let unflagged = repo
            .list_status(VerificationStatus::Approved, Some(false))
            .await
            .unwrap();
        assert_eq!(unflagged.len(), 1);
        assert_eq!(unflagged[0].id, plain.id);

        let both = repo
            .list_status(VerificationStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(both.len(), 2);
    }

    #[tokio::test]
    async fn delete_only_removes_flagged_records() {
        let repo = InMemoryRecordRepo::new();
        let restored = record(VerificationStatus::Approved, false);
        repo.insert(&restored).await.unwrap();

        // A restore racing the delete leaves an unflagged record; the
        // delete must not resolve.
        let err = repo.delete(restored.id).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert!(repo.get(restored.id).await.unwrap().is_some());

        let flagged = record(VerificationStatus::Approved, true);
        repo.insert(&flagged).await.unwrap();
        repo.delete(flagged.id).await.unwrap();
        assert!(repo.get(flagged.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn document_refs_are_counted_across_records() {
        let repo = InMemoryRecordRepo::new();
        let mut a = record(VerificationStatus::Approved, false);
        a.document_ref = Some("abc123.pdf".into());
        let mut b = record(VerificationStatus::Pending, false);
        b.document_ref = Some("abc123.pdf".into());
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();

        assert_eq!(repo.count_document_refs("abc123.pdf").await.unwrap(), 2);
        assert_eq!(repo.count_document_refs("elsewhere.pdf").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn vocabulary_rejects_duplicates() {
        let repo = InMemoryVocabularyRepo::new();
        let term = VocabularyTerm {
            id: Uuid::now_v7(),
            category: "event_category".into(),
            value: "hackathon".into(),
            created_at: Utc::now(),
        };
        repo.insert(&term).await.unwrap();
        let dup = VocabularyTerm {
            id: Uuid::now_v7(),
            ..term.clone()
        };
        assert!(matches!(
            repo.insert(&dup).await.unwrap_err(),
            DomainError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn document_store_round_trips() {
        let store = InMemoryDocumentStore::new();
        let key = store
            .save(Bytes::from_static(b"%PDF-1.4"), "application/pdf")
            .await
            .unwrap();
        let doc = store.open(&key).await.unwrap();
        assert_eq!(doc.content_type, "application/pdf");
        store.delete(&key).await.unwrap();
        assert!(store.open(&key).await.is_err());
        // Delete is idempotent: the compensation path may retry.
        store.delete(&key).await.unwrap();
    }
}
