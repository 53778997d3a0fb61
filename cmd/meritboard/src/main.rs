//! # Meritboard Binary
//!
//! The entry point that assembles the application: settings, logging,
//! storage and auth adapters, services, and the axum router.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api_adapters::AppState;
use auth_adapters::HmacSessionVerifier;
use secrecy::ExposeSecret;
use services::{Accounts, Export, Lifecycle, Views, Vocabulary};
use storage_adapters::postgres::{self, PgAccountRepo, PgRecordRepo, PgVocabularyRepo};
use storage_adapters::LocalDocumentStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = configs::Settings::load().context("failed to load settings")?;

    // 1. Storage
    let pool = postgres::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await
    .context("failed to connect to PostgreSQL")?;
    postgres::init_schema(&pool)
        .await
        .context("failed to initialize database schema")?;

    let records = Arc::new(PgRecordRepo::new(pool.clone()));
    let accounts_repo = Arc::new(PgAccountRepo::new(pool.clone()));
    let vocabulary_repo = Arc::new(PgVocabularyRepo::new(pool));
    let documents = Arc::new(LocalDocumentStore::new(PathBuf::from(
        &settings.documents.root_path,
    )));

    // 2. Auth
    let verifier = Arc::new(HmacSessionVerifier::new(
        settings.auth.token_secret.expose_secret().as_bytes(),
    ));

    // 3. Services
    let state = AppState {
        lifecycle: Arc::new(Lifecycle::new(
            records.clone(),
            documents.clone(),
            accounts_repo.clone(),
        )),
        views: Arc::new(Views::new(
            records.clone(),
            documents,
            accounts_repo.clone(),
        )),
        vocabulary: Arc::new(Vocabulary::new(vocabulary_repo)),
        accounts: Arc::new(Accounts::new(accounts_repo)),
        export: Arc::new(Export::new(records)),
        verifier,
    };

    // 4. Serve
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "meritboard listening");

    axum::serve(listener, api_adapters::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
        return;
    }
    info!("shutdown signal received");
}
