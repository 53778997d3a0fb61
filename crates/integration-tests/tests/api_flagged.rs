//! Flagging sub-workflow over the full router: flag, restore, and
//! permanent deletion of approved records.

use axum::http::StatusCode;
use integration_tests::{
    delete, multipart_body, post_multipart, put_json, send, spawn_app, technical_fields, TestApp,
};
use serde_json::json;

/// Submits and approves one technical record, returning its id. The
/// approved record sits at version 1.
async fn approved_record(app: &TestApp) -> String {
    let body = multipart_body(
        &technical_fields(),
        Some(("certificate.pdf", "application/pdf", b"%PDF-1.4")),
    );
    let (status, record) = send(
        &app.router,
        post_multipart("/records/technical/submit", &app.student.token, body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let record_id = record["id"].as_str().unwrap().to_string();

    let uri = format!("/records/faculty/{}/approve/{}", app.faculty.id, record_id);
    let (status, _) = send(
        &app.router,
        put_json(&uri, &app.faculty.token, json!({ "version": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    record_id
}

#[tokio::test]
async fn advisor_flags_and_admin_restores() {
    let app = spawn_app().await;
    let record_id = approved_record(&app).await;

    let flag_uri = format!("/flagged/{record_id}/flag");
    let (status, flagged) = send(
        &app.router,
        put_json(
            &flag_uri,
            &app.faculty.token,
            json!({ "comment": "Duplicate of an earlier entry", "version": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flagged["flag"], true);
    assert_eq!(flagged["status"], "approved");
    assert_eq!(flagged["flag_comment"], "Duplicate of an earlier entry");

    let restore_uri = format!("/flagged/{record_id}/restore");
    let (status, restored) = send(&app.router, put_json(&restore_uri, &app.admin.token, json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["flag"], false);
    assert_eq!(restored["flag_comment"], serde_json::Value::Null);
}

#[tokio::test]
async fn flag_requires_comment_and_fresh_version() {
    let app = spawn_app().await;
    let record_id = approved_record(&app).await;
    let flag_uri = format!("/flagged/{record_id}/flag");

    let (status, _) = send(
        &app.router,
        put_json(&flag_uri, &app.faculty.token, json!({ "comment": " ", "version": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Stale concurrency token.
    let (status, _) = send(
        &app.router,
        put_json(
            &flag_uri,
            &app.faculty.token,
            json!({ "comment": "stale reviewer", "version": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unrelated_faculty_cannot_flag() {
    let app = spawn_app().await;
    let record_id = approved_record(&app).await;
    let flag_uri = format!("/flagged/{record_id}/flag");

    let (status, _) = send(
        &app.router,
        put_json(
            &flag_uri,
            &app.other_faculty.token,
            json!({ "comment": "not my advisee", "version": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_permanently_requires_flagged_state() {
    let app = spawn_app().await;
    let record_id = approved_record(&app).await;
    let delete_uri = format!("/flagged/{record_id}/delete-permanently");

    // Approved but unflagged: does not resolve for deletion.
    let (status, _) = send(&app.router, delete(&delete_uri, &app.admin.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let flag_uri = format!("/flagged/{record_id}/flag");
    send(
        &app.router,
        put_json(
            &flag_uri,
            &app.faculty.token,
            json!({ "comment": "fabricated proof", "version": 1 }),
        ),
    )
    .await;

    // Faculty cannot delete, even having flagged it.
    let (status, _) = send(&app.router, delete(&delete_uri, &app.faculty.token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app.router, delete(&delete_uri, &app.admin.token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Gone for good.
    let (status, _) = send(&app.router, delete(&delete_uri, &app.admin.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pending_record_cannot_be_flagged() {
    let app = spawn_app().await;
    let body = multipart_body(&technical_fields(), None);
    let (_, record) = send(
        &app.router,
        post_multipart("/records/technical/submit", &app.student.token, body),
    )
    .await;
    let record_id = record["id"].as_str().unwrap().to_string();

    let flag_uri = format!("/flagged/{record_id}/flag");
    let (status, _) = send(
        &app.router,
        put_json(
            &flag_uri,
            &app.faculty.token,
            json!({ "comment": "too early", "version": 0 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
