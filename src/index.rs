// Copyright (c) 2025 - Cowboy AI, Inc.
//! Search index seam and the index writer
//!
//! [`SearchIndex`] is the boundary to the full-text store holding the
//! [`IndexedBook`] projection. The index is derived state, never
//! authoritative: implementations must be idempotent per document id so that
//! redelivered events converge instead of diverging.
//!
//! [`IndexWriter`] is the consumer-facing wrapper. Catalog correctness never
//! depends on the index, so the writer absorbs every backend failure after
//! logging the backend's diagnostic reason; only search freshness suffers.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Book, IndexedBook};

/// Errors surfaced by a search index backend
#[derive(Debug, Error)]
pub enum IndexError {
    /// Backend cannot be reached at all
    #[error("search backend unavailable: {0}")]
    Unavailable(String),

    /// Backend answered with an error status
    #[error("search backend returned {status}: {reason}")]
    Rejected { status: u16, reason: String },

    /// Backend answered with something this client cannot interpret
    #[error("unexpected response from search backend: {0}")]
    InvalidResponse(String),

    /// Document could not be serialized for the backend
    #[error("index serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Boundary to the full-text store of book documents
///
/// Implementations must uphold:
/// - **Idempotent upsert**: writing the same id twice with the same content
///   is a no-op in effect; new content replaces the prior document entirely.
/// - **Idempotent remove**: removing an absent id is not an error.
/// - **Repeatable bootstrap**: `ensure_index` checks for the index before
///   creating it and is safe to call on every start.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Ensure the target index exists with the expected schema
    async fn ensure_index(&self) -> Result<(), IndexError>;

    /// Write a document, fully replacing any prior document with the same id
    async fn upsert(&self, document: &IndexedBook) -> Result<(), IndexError>;

    /// Remove the document with the given id, tolerating its absence
    async fn remove(&self, book_id: i32) -> Result<(), IndexError>;

    /// Multi-field match over title and description, best hits first
    async fn search(&self, query: &str) -> Result<Vec<IndexedBook>, IndexError>;

    /// Name of this index backend, for diagnostics
    fn name(&self) -> &str;
}

/// Applies catalog mutations to the search index, best-effort
pub struct IndexWriter {
    index: Arc<dyn SearchIndex>,
}

impl IndexWriter {
    /// Create a writer over the given index backend
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }

    /// Bootstrap the index schema; failures are logged and absorbed
    pub async fn initialize(&self) {
        match self.index.ensure_index().await {
            Ok(()) => debug!(index = self.index.name(), "search index ready"),
            Err(e) => warn!(
                index = self.index.name(),
                error = %e,
                "search index initialization failed; index writes will lag"
            ),
        }
    }

    /// Project a book into the index; failures are logged and absorbed
    pub async fn upsert(&self, book: &Book) {
        let document = IndexedBook::from(book);

        match self.index.upsert(&document).await {
            Ok(()) => debug!(book_id = document.id, "book indexed"),
            Err(e) => warn!(
                book_id = document.id,
                error = %e,
                "book indexing failed; document will be stale until the next write"
            ),
        }
    }

    /// Remove a book's document; failures are logged and absorbed
    pub async fn remove(&self, book_id: i32) {
        match self.index.remove(book_id).await {
            Ok(()) => debug!(book_id, "book removed from index"),
            Err(e) => warn!(
                book_id,
                error = %e,
                "book index removal failed; document may linger until retried"
            ),
        }
    }
}
