//! Local filesystem implementation of `DocumentStore`.
//!
//! Content-addressable: a document is stored under its SHA-256 hash with
//! two-level directory sharding (`ab/cd/<hash>.<ext>`), which dedupes
//! identical uploads for free. The document ref carries the extension so
//! the content type survives the round trip.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use domains::error::{DomainError, Result};
use domains::models::StoredDocument;
use domains::ports::DocumentStore;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

pub struct LocalDocumentStore {
    /// Root directory for all uploads (e.g. "./data/documents")
    root_path: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Builds the sharded path for a document ref of the form
    /// `<hash>.<ext>`. Refs containing path separators or traversal
    /// segments are rejected before they reach the filesystem.
    fn sharded_path(&self, document_ref: &str) -> Result<PathBuf> {
        if document_ref.len() < 4
            || !document_ref
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.')
        {
            return Err(DomainError::Validation(format!(
                "malformed document ref: {document_ref}"
            )));
        }
        let mut path = self.root_path.clone();
        path.push(&document_ref[0..2]);
        path.push(&document_ref[2..4]);
        path.push(document_ref);
        Ok(path)
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn save(&self, data: Bytes, content_type: &str) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = hex::encode(hasher.finalize());

        let ext = mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first())
            .copied()
            .unwrap_or("bin");
        let document_ref = format!("{hash}.{ext}");

        let target = self.sharded_path(&document_ref)?;
        let parent = target
            .parent()
            .ok_or_else(|| DomainError::Internal("document root has no parent".into()))?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| DomainError::Transport(format!("create upload directory: {e}")))?;

        if fs::try_exists(&target)
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?
        {
            debug!(%document_ref, "document already stored, dedupe hit");
            return Ok(document_ref);
        }

        fs::write(&target, &data)
            .await
            .map_err(|e| DomainError::Transport(format!("write upload: {e}")))?;
        debug!(%document_ref, bytes = data.len(), "document stored");
        Ok(document_ref)
    }

    async fn open(&self, document_ref: &str) -> Result<StoredDocument> {
        let path = self.sharded_path(document_ref)?;
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DomainError::not_found("document", document_ref))
            }
            Err(e) => return Err(DomainError::Transport(format!("read upload: {e}"))),
        };
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        Ok(StoredDocument {
            data: Bytes::from(data),
            content_type,
        })
    }

    async fn delete(&self, document_ref: &str) -> Result<()> {
        let path = self.sharded_path(document_ref)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Idempotent: the compensation path may call this twice.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Transport(format!("remove upload: {e}"))),
        }
    }
}
