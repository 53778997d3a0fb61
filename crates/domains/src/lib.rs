//! meritboard/crates/domains/src/lib.rs
//!
//! The central domain logic and interface definitions for Meritboard.

pub mod error;
pub mod models;
pub mod ports;
pub mod schema;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn pending_record(kind: RecordKind) -> Record {
        let now = Utc::now();
        Record {
            id: Uuid::now_v7(),
            kind,
            owner_student_id: Uuid::now_v7(),
            title: "National hackathon".to_string(),
            fields: serde_json::json!({ "host": "IEEE", "category": "hackathon" }),
            document_ref: None,
            status: VerificationStatus::Pending,
            flag: false,
            flag_comment: None,
            faculty_comment: None,
            submission_date: now,
            updated_at: now,
            version: 0,
        }
    }

    #[test]
    fn record_creation_v7() {
        let record = pending_record(RecordKind::TechnicalEvent);
        assert_eq!(record.status, VerificationStatus::Pending);
        assert!(!record.is_flagged());
    }

    #[test]
    fn flag_requires_approved_status() {
        let mut record = pending_record(RecordKind::Publication);
        record.flag = true;
        // Pending + flag does not count as the flagged state.
        assert!(!record.is_flagged());
        record.status = VerificationStatus::Approved;
        assert!(record.is_flagged());
    }

    #[test]
    fn kind_slugs_round_trip() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(RecordKind::from_slug("nonsense"), None);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            VerificationStatus::Pending,
            VerificationStatus::Approved,
            VerificationStatus::Rejected,
        ] {
            assert_eq!(VerificationStatus::from_str(status.as_str()), Some(status));
        }
    }
}
