//! # Domain Models
//!
//! These structs represent the core entities of Meritboard.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The six record kinds a student may submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    TechnicalEvent,
    SportsEvent,
    CulturalEvent,
    ClubsAndSocieties,
    Publication,
    JobOpportunity,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::TechnicalEvent,
        RecordKind::SportsEvent,
        RecordKind::CulturalEvent,
        RecordKind::ClubsAndSocieties,
        RecordKind::Publication,
        RecordKind::JobOpportunity,
    ];

    /// The URL slug used in record routes (e.g. `/records/technical/submit`).
    pub fn slug(&self) -> &'static str {
        match self {
            RecordKind::TechnicalEvent => "technical",
            RecordKind::SportsEvent => "sports",
            RecordKind::CulturalEvent => "cultural",
            RecordKind::ClubsAndSocieties => "clubs",
            RecordKind::Publication => "publication",
            RecordKind::JobOpportunity => "job",
        }
    }

    pub fn from_slug(slug: &str) -> Option<RecordKind> {
        Self::ALL.iter().copied().find(|k| k.slug() == slug)
    }
}

/// The primary lifecycle field of a record.
///
/// Flagging is an orthogonal axis on top of `Approved`; it is not a
/// fourth status value (a flagged record is still an approved record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<VerificationStatus> {
        match s {
            "pending" => Some(VerificationStatus::Pending),
            "approved" => Some(VerificationStatus::Approved),
            "rejected" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }
}

/// One submitted achievement/opportunity item.
///
/// `kind` and `owner_student_id` never change across the lifecycle.
/// Kind-specific descriptive fields live in the `fields` JSON bucket and
/// are validated against [`crate::schema`] before any write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub kind: RecordKind,
    pub owner_student_id: Uuid,
    pub title: String,
    /// Kind-specific descriptive fields (host, category, dates, achievement, ...)
    pub fields: serde_json::Value,
    /// Content-addressed key into the DocumentStore, if a proof was uploaded.
    pub document_ref: Option<String>,
    pub status: VerificationStatus,
    /// Only meaningful when `status == Approved`; queues the record for
    /// administrative deletion review.
    pub flag: bool,
    pub flag_comment: Option<String>,
    pub faculty_comment: Option<String>,
    /// Set at creation; not updated on resubmission.
    pub submission_date: DateTime<Utc>,
    /// Timestamp of the last status-affecting mutation.
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every transition.
    pub version: i32,
}

impl Record {
    /// True when the record sits in the `Approved+Flagged` state.
    pub fn is_flagged(&self) -> bool {
        self.status == VerificationStatus::Approved && self.flag
    }
}

/// What an account is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Option<Role> {
        match s {
            "student" => Some(Role::Student),
            "faculty" => Some(Role::Faculty),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// A verified caller identity, produced by the SessionVerifier port.
///
/// One explicit session object passed down through handlers — never a
/// client-trusted role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
}

/// A directory entry used by the permission gate and admin account tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// For students: the faculty member scoped to act on their records.
    pub advisor_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// An admin-managed dropdown vocabulary entry (event categories,
/// achievement levels, and so on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTerm {
    pub id: Uuid,
    pub category: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

/// A stored proof document as returned by the DocumentStore.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub data: bytes::Bytes,
    pub content_type: String,
}
