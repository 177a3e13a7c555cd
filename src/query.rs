// Copyright (c) 2025 - Cowboy AI, Inc.
//! Query router for book search
//!
//! Prefers the search index and degrades to a primary-store substring scan:
//! the index may be absent (not configured) or answer badly, and neither
//! case is allowed to fail the query. The capability check happens once at
//! entry; an index failure falls back for that single request only, so a
//! recovered backend is used again on the very next call without any cached
//! "down" state.
//!
//! Index hits carry only the flat projection, so author and category are
//! re-hydrated from the primary store before returning. Results keep the
//! index's relevance order; the fallback scan can only offer insertion
//! order.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{Book, IndexedBook};
use crate::index::SearchIndex;
use crate::store::{CatalogStore, StoreError};

/// Routes search requests between the index and the primary store
pub struct QueryRouter {
    store: Arc<dyn CatalogStore>,
    index: Option<Arc<dyn SearchIndex>>,
}

impl QueryRouter {
    /// Create a router; pass `None` when no search backend is configured
    pub fn new(store: Arc<dyn CatalogStore>, index: Option<Arc<dyn SearchIndex>>) -> Self {
        Self { store, index }
    }

    /// Search books by title/description
    ///
    /// An empty or blank query returns an empty sequence. Store failures
    /// propagate (the primary store is authoritative); index failures never
    /// do.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let Some(index) = &self.index else {
            debug!("no search backend configured; scanning the catalog");
            return self.scan(query).await;
        };

        match index.search(query).await {
            Ok(documents) => {
                debug!(hits = documents.len(), "search served by the index");
                self.hydrate(documents).await
            }
            Err(e) => {
                warn!(error = %e, "search index query failed; falling back to catalog scan");
                self.scan(query).await
            }
        }
    }

    /// Degraded path: substring scan against the primary store
    async fn scan(&self, query: &str) -> Result<Vec<Book>, StoreError> {
        let mut books = self.store.books_matching(query).await?;
        for book in &mut books {
            self.attach_references(book).await?;
        }
        Ok(books)
    }

    /// Rebuild full book records from index documents, preserving hit order
    async fn hydrate(&self, documents: Vec<IndexedBook>) -> Result<Vec<Book>, StoreError> {
        let mut books = Vec::with_capacity(documents.len());
        for document in documents {
            let mut book = Book {
                id: document.id,
                title: document.title,
                description: document.description,
                author_id: document.author_id,
                category_id: document.category_id,
                author: None,
                category: None,
            };
            self.attach_references(&mut book).await?;
            books.push(book);
        }
        Ok(books)
    }

    async fn attach_references(&self, book: &mut Book) -> Result<(), StoreError> {
        book.author = self.store.author(book.author_id).await?;
        book.category = self.store.category(book.category_id).await?;
        Ok(())
    }
}
