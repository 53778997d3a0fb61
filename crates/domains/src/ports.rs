//! # Core Ports
//!
//! Any adapter must implement these traits to be used by the binary.
//! With the `testing` feature enabled, mockall mocks are generated for
//! use in external test crates.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Account, Record, RecordKind, Session, StoredDocument, VerificationStatus, VocabularyTerm,
};

/// What a transition expects to find before it applies.
///
/// A transition is a compare-and-swap: the repo must observe the record in
/// exactly this state or refuse. Wrong state resolves to `NotFound` (the
/// record "does not resolve in the expected state"); a stale concurrency
/// token resolves to `Conflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateGuard {
    pub status: VerificationStatus,
    pub flagged: bool,
    /// When present, the expected concurrency token.
    pub version: Option<i32>,
}

/// Field changes applied atomically with a successful guard check.
///
/// The repo bumps `version` and sets `updated_at` on every applied patch;
/// `submission_date`, `kind`, and `owner_student_id` are never patchable.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub status: Option<VerificationStatus>,
    pub flag: Option<bool>,
    pub flag_comment: Option<Option<String>>,
    pub faculty_comment: Option<Option<String>>,
    pub title: Option<String>,
    pub fields: Option<serde_json::Value>,
    pub document_ref: Option<Option<String>>,
}

/// Data persistence contract for records.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RecordRepo: Send + Sync {
    async fn insert(&self, record: &Record) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Record>>;

    /// Atomically apply `patch` if the record currently matches `guard`.
    /// Returns the record as stored after the patch.
    async fn transition(
        &self,
        id: Uuid,
        guard: StateGuard,
        patch: RecordPatch,
        now: DateTime<Utc>,
    ) -> Result<Record>;

    /// Remove the record row. Guarded on the `Approved+Flagged` state:
    /// a record in any other state does not resolve and nothing is
    /// deleted, so a restore racing the delete wins.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Number of records whose `document_ref` equals the given ref.
    /// Stored blobs are content-addressed and shared across records; one
    /// may only be removed once this reaches zero.
    async fn count_document_refs(&self, document_ref: &str) -> Result<i64>;

    async fn list_by_owner(&self, kind: RecordKind, owner: Uuid) -> Result<Vec<Record>>;
    async fn list_owner_status(
        &self,
        owner: Uuid,
        status: VerificationStatus,
    ) -> Result<Vec<Record>>;

    /// Pending queue across a faculty member's advisees.
    async fn list_pending_for(&self, advisees: Vec<Uuid>) -> Result<Vec<Record>>;

    /// Status-scoped view; `flagged` narrows the approved collection to
    /// its flagged or unflagged half when given.
    async fn list_status(
        &self,
        status: VerificationStatus,
        flagged: Option<bool>,
    ) -> Result<Vec<Record>>;

    /// Export view: all records, optionally narrowed by status and kind.
    async fn list_filtered(
        &self,
        status: Option<VerificationStatus>,
        kind: Option<RecordKind>,
    ) -> Result<Vec<Record>>;
}

/// Proof-document storage contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists raw bytes and returns a document ref for the Record model.
    async fn save(&self, data: Bytes, content_type: &str) -> Result<String>;

    /// Loads the document for streaming back to a caller.
    async fn open(&self, document_ref: &str) -> Result<StoredDocument>;

    /// Removes the stored document. Missing documents are not an error;
    /// delete is the compensation path and must be idempotent.
    async fn delete(&self, document_ref: &str) -> Result<()>;
}

/// Identity contract: turns a bearer token into a verified session.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Session>;
}

/// Account directory contract, backing the permission gate and the admin
/// account tools.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Account>>;
    async fn insert(&self, account: &Account) -> Result<()>;
    async fn advisees_of(&self, faculty_id: Uuid) -> Result<Vec<Uuid>>;
    async fn set_active(&self, id: Uuid, active: bool) -> Result<Account>;
}

/// Dropdown vocabulary contract.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VocabularyRepo: Send + Sync {
    async fn list(&self, category: &str) -> Result<Vec<VocabularyTerm>>;
    /// Fails with `Conflict` on a duplicate (category, value) pair.
    async fn insert(&self, term: &VocabularyTerm) -> Result<()>;
    async fn delete(&self, category: &str, id: Uuid) -> Result<()>;
}
