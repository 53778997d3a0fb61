//! # api-adapters
//!
//! The web routing and orchestration layer for Meritboard: one axum
//! router over the services, with bearer-token session extraction and
//! domain-error → HTTP mapping.

pub mod error;
pub mod handlers;
mod session;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use domains::ports::SessionVerifier;
use services::{Accounts, Export, Lifecycle, Views, Vocabulary};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<Lifecycle>,
    pub views: Arc<Views>,
    pub vocabulary: Arc<Vocabulary>,
    pub accounts: Arc<Accounts>,
    pub export: Arc<Export>,
    pub verifier: Arc<dyn SessionVerifier>,
}

/// Builds the full application router.
///
/// Route shapes mirror the contract the SPA client consumes; the kind
/// segment is a slug (`technical`, `sports`, `cultural`, `clubs`,
/// `publication`, `job`).
pub fn router(state: AppState) -> Router {
    // The SPA lives on another origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(handlers::healthz))
        // Submission + review
        .route("/records/{kind}/submit", post(handlers::records::submit))
        .route(
            "/records/{kind}/resubmit/{record_id}",
            put(handlers::records::resubmit),
        )
        .route(
            "/records/{kind}/student/{student_id}",
            get(handlers::records::student_records),
        )
        .route(
            "/records/faculty/{faculty_id}/pending-records",
            get(handlers::records::pending_queue),
        )
        .route(
            "/records/faculty/{faculty_id}/approve/{record_id}",
            put(handlers::records::approve),
        )
        .route(
            "/records/faculty/{faculty_id}/reject/{record_id}",
            put(handlers::records::reject),
        )
        // Flagging sub-workflow
        .route("/flagged/{record_id}/flag", put(handlers::flagged::flag))
        .route("/flagged/{record_id}/restore", put(handlers::flagged::restore))
        .route(
            "/flagged/{record_id}/delete-permanently",
            delete(handlers::flagged::delete_permanently),
        )
        // Status-scoped views
        .route("/main/approved", get(handlers::views::approved))
        .route(
            "/main/student/{student_id}/pending",
            get(handlers::views::student_pending),
        )
        .route(
            "/main/student/{student_id}/rejected",
            get(handlers::views::student_rejected),
        )
        .route("/main/download/{record_id}", get(handlers::views::download))
        // Admin surface
        .route("/admin/flagged", get(handlers::admin::flagged))
        .route(
            "/admin/vocabulary/{category}",
            get(handlers::admin::vocabulary_list).post(handlers::admin::vocabulary_add),
        )
        .route(
            "/admin/vocabulary/{category}/{term_id}",
            delete(handlers::admin::vocabulary_remove),
        )
        .route("/admin/export.csv", get(handlers::admin::export_csv))
        .route(
            "/admin/accounts/{account_id}/status",
            put(handlers::admin::account_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
