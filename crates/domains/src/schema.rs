//! Per-kind field schemas.
//!
//! The six record kinds share one entity; what differs is the set of
//! descriptive fields each kind requires and whether a proof document is
//! mandatory on first submission. Both are data here, not six diverging
//! form implementations.

use crate::models::RecordKind;

/// Field names that must be present and non-blank in a draft's `fields`
/// bucket for the given kind.
pub fn required_fields(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::TechnicalEvent => &["host", "category", "start_date", "end_date", "achievement"],
        RecordKind::SportsEvent => &["sport", "venue", "level", "start_date", "end_date", "achievement"],
        RecordKind::CulturalEvent => &["host", "category", "start_date", "end_date", "achievement"],
        RecordKind::ClubsAndSocieties => &["club_name", "position", "start_date"],
        RecordKind::Publication => &["publication_type", "published_in", "publication_date"],
        RecordKind::JobOpportunity => &["company", "position", "job_type", "start_date"],
    }
}

/// Whether a proof document is mandatory on *first* submission of this
/// kind. Resubmission relaxes the rule when a prior document exists.
pub fn requires_document(kind: RecordKind) -> bool {
    // TechnicalEvent accepts a later upload; every other kind requires
    // proof up front.
    !matches!(kind, RecordKind::TechnicalEvent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_required_fields() {
        for kind in RecordKind::ALL {
            assert!(!required_fields(kind).is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn technical_events_allow_deferred_proof() {
        assert!(!requires_document(RecordKind::TechnicalEvent));
        assert!(requires_document(RecordKind::Publication));
        assert!(requires_document(RecordKind::SportsEvent));
    }
}
