// Copyright (c) 2025 - Cowboy AI, Inc.
//! Catalog service facade
//!
//! The interface the request-handling layer talks to. Mutations commit to
//! the primary store first; only then is a change event published, and a
//! publish failure is a warning, never a failed mutation; the index simply
//! lags until the next event for that book. Nothing here waits for the
//! consumer: writer and indexer are causally decoupled.

use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::domain::{Author, Book, Category, NewAuthor, NewBook, NewCategory};
use crate::index::SearchIndex;
use crate::publisher::BookEventPublisher;
use crate::query::QueryRouter;
use crate::store::{CatalogStore, StoreError};

/// Errors surfaced to the request-handling layer
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The submitted book is not acceptable
    #[error("invalid book: {0}")]
    InvalidBook(String),

    /// The primary store rejected or failed the operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Write/read facade over the catalog and its search pipeline
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    publisher: Option<BookEventPublisher>,
    router: QueryRouter,
}

impl CatalogService {
    /// Wire the service
    ///
    /// `publisher` and `index` are optional capabilities: without a channel
    /// the catalog still works but the index stops being updated, and
    /// without an index every search is served by the primary store.
    pub fn new(
        store: Arc<dyn CatalogStore>,
        publisher: Option<BookEventPublisher>,
        index: Option<Arc<dyn SearchIndex>>,
    ) -> Self {
        if publisher.is_none() {
            warn!("no event channel configured; catalog changes will not reach the search index");
        }
        if index.is_none() {
            warn!("no search backend configured; searches will scan the primary store");
        }

        let router = QueryRouter::new(store.clone(), index);
        Self {
            store,
            publisher,
            router,
        }
    }

    /// Create a book: commit to the primary store, then announce it
    pub async fn create_book(&self, book: NewBook) -> Result<Book, ServiceError> {
        if book.title.trim().is_empty() {
            return Err(ServiceError::InvalidBook("title must not be empty".to_string()));
        }

        let book = self.store.insert_book(book).await?;

        if let Some(publisher) = &self.publisher {
            if let Err(e) = publisher.publish_created(&book).await {
                warn!(
                    book_id = book.id,
                    error = %e,
                    "book created but event publish failed; search index will lag"
                );
            }
        }

        Ok(book)
    }

    /// Delete a book: remove from the primary store, then announce it
    pub async fn delete_book(&self, book_id: i32) -> Result<(), ServiceError> {
        self.store.remove_book(book_id).await?;

        if let Some(publisher) = &self.publisher {
            if let Err(e) = publisher.publish_deleted(book_id).await {
                warn!(
                    book_id,
                    error = %e,
                    "book deleted but event publish failed; search index will lag"
                );
            }
        }

        Ok(())
    }

    /// Register an author
    pub async fn add_author(&self, author: NewAuthor) -> Result<Author, ServiceError> {
        Ok(self.store.insert_author(author).await?)
    }

    /// Register a category
    pub async fn add_category(&self, category: NewCategory) -> Result<Category, ServiceError> {
        Ok(self.store.insert_category(category).await?)
    }

    /// List the catalog with author and category references attached
    pub async fn books(&self) -> Result<Vec<Book>, ServiceError> {
        let mut books = self.store.books().await?;
        for book in &mut books {
            book.author = self.store.author(book.author_id).await?;
            book.category = self.store.category(book.category_id).await?;
        }
        Ok(books)
    }

    /// Search books by title/description; see [`QueryRouter::search`]
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, ServiceError> {
        Ok(self.router.search(query).await?)
    }
}
