//! Development fixture loader: one admin, one faculty member, two
//! advisee students, and starter vocabularies. Prints a bearer token per
//! account so the API can be exercised immediately.

use anyhow::Context;
use auth_adapters::HmacSessionVerifier;
use chrono::Utc;
use domains::models::{Account, Role};
use domains::ports::{AccountRepo, VocabularyRepo};
use secrecy::ExposeSecret;
use storage_adapters::postgres::{self, PgAccountRepo, PgVocabularyRepo};
use uuid::Uuid;

fn account(name: &str, email: &str, role: Role, advisor_id: Option<Uuid>) -> Account {
    Account {
        id: Uuid::now_v7(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        advisor_id,
        active: true,
        created_at: Utc::now(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = configs::Settings::load().context("failed to load settings")?;

    let pool = postgres::connect(
        settings.database.url.expose_secret(),
        settings.database.max_connections,
    )
    .await?;
    postgres::init_schema(&pool).await?;

    let accounts = PgAccountRepo::new(pool.clone());
    let vocabulary = PgVocabularyRepo::new(pool);
    let verifier =
        HmacSessionVerifier::new(settings.auth.token_secret.expose_secret().as_bytes());

    let admin = account("Site Admin", "admin@example.edu", Role::Admin, None);
    let faculty = account("Dr. Mehta", "mehta@example.edu", Role::Faculty, None);
    let student_a = account(
        "Asha Rao",
        "asha@example.edu",
        Role::Student,
        Some(faculty.id),
    );
    let student_b = account(
        "Vikram Iyer",
        "vikram@example.edu",
        Role::Student,
        Some(faculty.id),
    );

    for acct in [&admin, &faculty, &student_a, &student_b] {
        accounts.insert(acct).await?;
        println!(
            "{:<8} {:<20} token: {}",
            acct.role.as_str(),
            acct.email,
            verifier.issue(acct.id, acct.role)
        );
    }

    for (category, values) in [
        ("event_category", vec!["hackathon", "workshop", "conference"]),
        ("achievement_level", vec!["participant", "runner-up", "winner"]),
        ("club_position", vec!["member", "treasurer", "secretary", "president"]),
    ] {
        for value in values {
            let term = domains::models::VocabularyTerm {
                id: Uuid::now_v7(),
                category: category.to_string(),
                value: value.to_string(),
                created_at: Utc::now(),
            };
            vocabulary.insert(&term).await?;
        }
    }

    println!("seeded 4 accounts and 3 vocabularies");
    Ok(())
}
