//! meritboard/crates/storage-adapters/src/lib.rs
//!
//! Concrete implementations of the domain storage ports: PostgreSQL
//! repositories (feature `db-postgres`), a local-filesystem document
//! store, and in-memory implementations used by tests and local tooling.

pub mod document_store;
pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use document_store::LocalDocumentStore;
pub use memory::{InMemoryAccountRepo, InMemoryDocumentStore, InMemoryRecordRepo, InMemoryVocabularyRepo};
