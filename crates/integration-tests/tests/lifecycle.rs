//! End-to-end verification lifecycle scenarios, driven at the service
//! layer over in-memory adapters.

use bytes::Bytes;
use domains::error::DomainError;
use domains::models::{RecordKind, VerificationStatus};
use domains::ports::RecordRepo;
use integration_tests::spawn_app;
use services::{Submission, Upload};

fn technical_submission() -> Submission {
    Submission {
        title: "National hackathon".into(),
        fields: serde_json::json!({
            "host": "IEEE", "category": "hackathon",
            "start_date": "2026-02-01", "end_date": "2026-02-02",
            "achievement": "winner",
        }),
        document: Some(Upload {
            data: Bytes::from_static(b"%PDF-1.4 certificate"),
            content_type: "application/pdf".into(),
        }),
    }
}

/// Scenarios 1-6 from the product brief, in one continuous history:
/// submit, reject, resubmit, approve, flag, delete.
#[tokio::test]
async fn full_record_history() {
    let app = spawn_app().await;
    let lifecycle = &app.state.lifecycle;

    // 1. Student submits with all required fields + document.
    let record = lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    assert_eq!(record.owner_student_id, app.student.id);
    assert!(record.document_ref.is_some());

    // 2. Faculty rejects with a comment.
    let record = lifecycle
        .reject(app.faculty.session, record.id, "Missing certificate", record.version)
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Rejected);
    assert_eq!(record.faculty_comment.as_deref(), Some("Missing certificate"));

    // 3. Student resubmits corrected fields; re-enters Pending. The
    //    original submission date survives and the reviewer comment is
    //    retained for context.
    let original_submission_date = record.submission_date;
    let mut corrected = technical_submission();
    corrected.title = "National hackathon (with certificate)".into();
    let record = lifecycle
        .resubmit(app.student.session, RecordKind::TechnicalEvent, record.id, corrected)
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    assert_eq!(record.submission_date, original_submission_date);
    assert_eq!(record.faculty_comment.as_deref(), Some("Missing certificate"));

    // 4. Faculty approves.
    let record = lifecycle
        .approve(app.faculty.session, record.id, Some("Looks good"), record.version)
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Approved);
    assert!(!record.flag);

    // 5. Faculty flags the approved record.
    let record = lifecycle
        .flag(app.faculty.session, record.id, "Duplicate entry", record.version)
        .await
        .unwrap();
    assert!(record.is_flagged());
    assert_eq!(record.flag_comment.as_deref(), Some("Duplicate entry"));

    // It appears in the admin flagged view.
    let flagged = app.state.views.flagged(app.admin.session).await.unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].id, record.id);

    // 6. Admin deletes permanently; the record is gone.
    lifecycle
        .delete_permanently(app.admin.session, record.id)
        .await
        .unwrap();
    let err = lifecycle
        .restore(app.admin.session, record.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn reject_without_comment_leaves_record_pending() {
    let app = spawn_app().await;
    let record = app
        .state
        .lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();

    let err = app
        .state
        .lifecycle
        .reject(app.faculty.session, record.id, "  ", record.version)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let unchanged = app.records.get(record.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, VerificationStatus::Pending);
    assert_eq!(unchanged.version, record.version);
}

#[tokio::test]
async fn flag_without_comment_leaves_record_unflagged() {
    let app = spawn_app().await;
    let record = app
        .state
        .lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();
    let record = app
        .state
        .lifecycle
        .approve(app.faculty.session, record.id, None, record.version)
        .await
        .unwrap();

    let err = app
        .state
        .lifecycle
        .flag(app.faculty.session, record.id, "", record.version)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let unchanged = app.records.get(record.id).await.unwrap().unwrap();
    assert!(!unchanged.flag);
}

#[tokio::test]
async fn flag_then_restore_round_trips() {
    let app = spawn_app().await;
    let record = app
        .state
        .lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();
    let record = app
        .state
        .lifecycle
        .approve(app.faculty.session, record.id, None, record.version)
        .await
        .unwrap();
    let record = app
        .state
        .lifecycle
        .flag(app.faculty.session, record.id, "Duplicate entry", record.version)
        .await
        .unwrap();

    let restored = app
        .state
        .lifecycle
        .restore(app.admin.session, record.id)
        .await
        .unwrap();
    assert_eq!(restored.status, VerificationStatus::Approved);
    assert!(!restored.flag);
    assert_eq!(restored.flag_comment, None);
}

#[tokio::test]
async fn stale_version_transition_conflicts() {
    let app = spawn_app().await;
    let record = app
        .state
        .lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();

    // First reviewer wins.
    app.state
        .lifecycle
        .approve(app.faculty.session, record.id, None, record.version)
        .await
        .unwrap();

    // Second reviewer raced on the stale version: the pending guard no
    // longer matches, so the record does not resolve for reject.
    let err = app
        .state
        .lifecycle
        .reject(app.faculty.session, record.id, "too late", record.version)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn resubmit_relaxes_document_requirement_when_prior_upload_exists() {
    let app = spawn_app().await;
    let lifecycle = &app.state.lifecycle;

    // Publication requires proof on first submission.
    let submission = Submission {
        title: "Journal paper".into(),
        fields: serde_json::json!({
            "publication_type": "journal", "published_in": "IEEE Access",
            "publication_date": "2026-01-15",
        }),
        document: Some(Upload {
            data: Bytes::from_static(b"%PDF-1.4 paper"),
            content_type: "application/pdf".into(),
        }),
    };
    let record = lifecycle
        .submit(app.student.session, RecordKind::Publication, submission.clone())
        .await
        .unwrap();
    let record = lifecycle
        .reject(app.faculty.session, record.id, "Wrong venue listed", record.version)
        .await
        .unwrap();

    // Corrected resubmission without a new document is fine: the prior
    // upload still backs the record.
    let corrected = Submission {
        document: None,
        fields: serde_json::json!({
            "publication_type": "journal", "published_in": "IEEE TSE",
            "publication_date": "2026-01-15",
        }),
        ..submission
    };
    let record = lifecycle
        .resubmit(app.student.session, RecordKind::Publication, record.id, corrected)
        .await
        .unwrap();
    assert_eq!(record.status, VerificationStatus::Pending);
    assert!(record.document_ref.is_some());
}

#[tokio::test]
async fn shared_document_survives_deleting_one_of_two_records() {
    let app = spawn_app().await;
    let lifecycle = &app.state.lifecycle;

    // Two records around the same proof bytes: the content-addressed
    // store dedupes them to one blob.
    let first = lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();
    let mut duplicate = technical_submission();
    duplicate.title = "Regional hackathon".into();
    let second = lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, duplicate)
        .await
        .unwrap();
    assert_eq!(first.document_ref, second.document_ref);

    let first = lifecycle
        .approve(app.faculty.session, first.id, None, first.version)
        .await
        .unwrap();
    let first = lifecycle
        .flag(app.faculty.session, first.id, "Duplicate entry", first.version)
        .await
        .unwrap();
    lifecycle
        .delete_permanently(app.admin.session, first.id)
        .await
        .unwrap();

    // The surviving record still opens its proof document.
    let doc = app
        .state
        .views
        .download(app.student.session, second.id)
        .await
        .unwrap();
    assert_eq!(doc.content_type, "application/pdf");
}

#[tokio::test]
async fn resubmit_under_another_kinds_route_does_not_resolve() {
    let app = spawn_app().await;
    let lifecycle = &app.state.lifecycle;
    let record = lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();
    let record = lifecycle
        .reject(app.faculty.session, record.id, "wrong dates", record.version)
        .await
        .unwrap();

    let err = lifecycle
        .resubmit(
            app.student.session,
            RecordKind::SportsEvent,
            record.id,
            technical_submission(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));

    let unchanged = app.records.get(record.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, VerificationStatus::Rejected);
}

#[tokio::test]
async fn only_the_owner_may_resubmit() {
    let app = spawn_app().await;
    let record = app
        .state
        .lifecycle
        .submit(app.student.session, RecordKind::TechnicalEvent, technical_submission())
        .await
        .unwrap();
    let record = app
        .state
        .lifecycle
        .reject(app.faculty.session, record.id, "resubmit please", record.version)
        .await
        .unwrap();

    let err = app
        .state
        .lifecycle
        .resubmit(
            app.other_student.session,
            RecordKind::TechnicalEvent,
            record.id,
            technical_submission(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Permission(_)));
}
