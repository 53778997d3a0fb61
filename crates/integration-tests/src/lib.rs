//! Shared fixtures for the integration tests: an application wired with
//! in-memory adapters, pre-seeded accounts, and request helpers.

use std::sync::Arc;

use api_adapters::AppState;
use auth_adapters::HmacSessionVerifier;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use domains::models::{Account, Role, Session};
use domains::ports::AccountRepo;
use services::{Accounts, Export, Lifecycle, Views, Vocabulary};
use storage_adapters::{
    InMemoryAccountRepo, InMemoryDocumentStore, InMemoryRecordRepo, InMemoryVocabularyRepo,
};
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &[u8] = b"integration-test-secret";

/// One seeded actor: its id, session, and bearer token.
pub struct Actor {
    pub id: Uuid,
    pub session: Session,
    pub token: String,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Direct handle on the backing record store, for asserting that a
    /// failed transition left the row untouched.
    pub records: Arc<InMemoryRecordRepo>,
    pub admin: Actor,
    pub faculty: Actor,
    /// Advisee of `faculty`.
    pub student: Actor,
    /// Advisee of a different (unseeded) faculty member.
    pub other_student: Actor,
    /// Faculty member with no advisees.
    pub other_faculty: Actor,
}

async fn seed_account(
    accounts: &InMemoryAccountRepo,
    verifier: &HmacSessionVerifier,
    name: &str,
    role: Role,
    advisor_id: Option<Uuid>,
) -> Actor {
    let id = Uuid::now_v7();
    accounts
        .insert(&Account {
            id,
            name: name.to_string(),
            email: format!("{}@example.edu", name.to_lowercase().replace(' ', ".")),
            role,
            advisor_id,
            active: true,
            created_at: Utc::now(),
        })
        .await
        .expect("seed account");
    Actor {
        id,
        session: Session { user_id: id, role },
        token: verifier.issue(id, role),
    }
}

/// Builds the full application over in-memory adapters with a standard
/// cast: admin, faculty + one advisee, a stranger student, and a second
/// faculty member who advises nobody.
pub async fn spawn_app() -> TestApp {
    let records = Arc::new(InMemoryRecordRepo::new());
    let documents = Arc::new(InMemoryDocumentStore::new());
    let accounts = Arc::new(InMemoryAccountRepo::new());
    let vocabulary = Arc::new(InMemoryVocabularyRepo::new());
    let verifier = HmacSessionVerifier::new(TEST_SECRET);

    let admin = seed_account(&accounts, &verifier, "Site Admin", Role::Admin, None).await;
    let faculty = seed_account(&accounts, &verifier, "Dr Mehta", Role::Faculty, None).await;
    let other_faculty =
        seed_account(&accounts, &verifier, "Dr Nair", Role::Faculty, None).await;
    let student =
        seed_account(&accounts, &verifier, "Asha Rao", Role::Student, Some(faculty.id)).await;
    let stranger_advisor = Uuid::now_v7();
    let other_student = seed_account(
        &accounts,
        &verifier,
        "Vikram Iyer",
        Role::Student,
        Some(stranger_advisor),
    )
    .await;

    let state = AppState {
        lifecycle: Arc::new(Lifecycle::new(
            records.clone(),
            documents.clone(),
            accounts.clone(),
        )),
        views: Arc::new(Views::new(records.clone(), documents, accounts.clone())),
        vocabulary: Arc::new(Vocabulary::new(vocabulary)),
        accounts: Arc::new(Accounts::new(accounts)),
        export: Arc::new(Export::new(records.clone())),
        verifier: Arc::new(verifier),
    };

    TestApp {
        router: api_adapters::router(state.clone()),
        state,
        records,
        admin,
        faculty,
        student,
        other_student,
        other_faculty,
    }
}

pub const BOUNDARY: &str = "meritboard-test-boundary";

/// Hand-rolls a `multipart/form-data` body: text parts for form fields
/// and an optional `document` file part.
pub fn multipart_body(
    fields: &[(&str, &str)],
    document: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, content_type, data)) = document {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"document\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Sends a request through the router and returns status + JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router never errors");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// As [`send`], but returns the raw body (for CSV and downloads).
pub async fn send_raw(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router never errors");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, bytes.to_vec())
}

pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn put_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_multipart(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn put_multipart(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A complete technical-event form.
pub fn technical_fields<'a>() -> Vec<(&'a str, &'a str)> {
    vec![
        ("title", "National hackathon"),
        ("host", "IEEE"),
        ("category", "hackathon"),
        ("start_date", "2026-02-01"),
        ("end_date", "2026-02-02"),
        ("achievement", "winner"),
    ]
}
