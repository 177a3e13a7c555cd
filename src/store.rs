// Copyright (c) 2025 - Cowboy AI, Inc.
//! Primary store boundary
//!
//! [`CatalogStore`] is the source-of-truth interface for Book, Author, and
//! Category records. Ids are assigned here on insertion, and the relational
//! backend (schema, migrations) stays behind this trait. [`MemoryCatalog`]
//! is the in-process implementation used by tests and local development.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;
use thiserror::Error;

use crate::domain::{Author, Book, Category, NewAuthor, NewBook, NewCategory};

/// Errors at the primary store boundary
///
/// Unlike channel or index failures, these propagate to the caller: the
/// store is authoritative, so a failed write is a failed mutation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book {0} not found")]
    BookNotFound(i32),

    #[error("author {0} not found")]
    AuthorNotFound(i32),

    #[error("category {0} not found")]
    CategoryNotFound(i32),

    /// Backend-specific failure (connection, constraint, ...)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Durable storage for catalog records; the source of truth
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a book, assigning its id; referenced author/category must exist
    async fn insert_book(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Remove a book, returning the removed record
    async fn remove_book(&self, book_id: i32) -> Result<Book, StoreError>;

    /// Look up a book by id
    async fn book(&self, book_id: i32) -> Result<Option<Book>, StoreError>;

    /// All books, in insertion (primary-key) order
    async fn books(&self) -> Result<Vec<Book>, StoreError>;

    /// Register an author, assigning its id
    async fn insert_author(&self, author: NewAuthor) -> Result<Author, StoreError>;

    /// Look up an author by id
    async fn author(&self, author_id: i32) -> Result<Option<Author>, StoreError>;

    /// Register a category, assigning its id
    async fn insert_category(&self, category: NewCategory) -> Result<Category, StoreError>;

    /// Look up a category by id
    async fn category(&self, category_id: i32) -> Result<Option<Category>, StoreError>;

    /// Substring scan over title OR description, case-insensitive,
    /// insertion order. The degraded search path when the index is out
    async fn books_matching(&self, query: &str) -> Result<Vec<Book>, StoreError>;
}

#[derive(Default)]
struct Tables {
    books: BTreeMap<i32, Book>,
    authors: BTreeMap<i32, Author>,
    categories: BTreeMap<i32, Category>,
    next_book_id: i32,
    next_author_id: i32,
    next_category_id: i32,
}

/// In-memory implementation of [`CatalogStore`]
#[derive(Default)]
pub struct MemoryCatalog {
    tables: RwLock<Tables>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle)
        || book
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        let mut tables = self.tables.write().unwrap();

        if !tables.authors.contains_key(&book.author_id) {
            return Err(StoreError::AuthorNotFound(book.author_id));
        }
        if !tables.categories.contains_key(&book.category_id) {
            return Err(StoreError::CategoryNotFound(book.category_id));
        }

        tables.next_book_id += 1;
        let record = Book {
            id: tables.next_book_id,
            title: book.title,
            description: book.description,
            author_id: book.author_id,
            category_id: book.category_id,
            author: None,
            category: None,
        };
        tables.books.insert(record.id, record.clone());

        Ok(record)
    }

    async fn remove_book(&self, book_id: i32) -> Result<Book, StoreError> {
        self.tables
            .write()
            .unwrap()
            .books
            .remove(&book_id)
            .ok_or(StoreError::BookNotFound(book_id))
    }

    async fn book(&self, book_id: i32) -> Result<Option<Book>, StoreError> {
        Ok(self.tables.read().unwrap().books.get(&book_id).cloned())
    }

    async fn books(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.tables.read().unwrap().books.values().cloned().collect())
    }

    async fn insert_author(&self, author: NewAuthor) -> Result<Author, StoreError> {
        let mut tables = self.tables.write().unwrap();

        tables.next_author_id += 1;
        let record = Author {
            id: tables.next_author_id,
            name: author.name,
            biography: author.biography,
        };
        tables.authors.insert(record.id, record.clone());

        Ok(record)
    }

    async fn author(&self, author_id: i32) -> Result<Option<Author>, StoreError> {
        Ok(self.tables.read().unwrap().authors.get(&author_id).cloned())
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut tables = self.tables.write().unwrap();

        tables.next_category_id += 1;
        let record = Category {
            id: tables.next_category_id,
            name: category.name,
        };
        tables.categories.insert(record.id, record.clone());

        Ok(record)
    }

    async fn category(&self, category_id: i32) -> Result<Option<Category>, StoreError> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .categories
            .get(&category_id)
            .cloned())
    }

    async fn books_matching(&self, query: &str) -> Result<Vec<Book>, StoreError> {
        let needle = query.to_lowercase();
        Ok(self
            .tables
            .read()
            .unwrap()
            .books
            .values()
            .filter(|book| matches(book, &needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn seeded() -> (MemoryCatalog, Author, Category) {
        let store = MemoryCatalog::new();
        let author = store
            .insert_author(NewAuthor {
                name: "Orhan Pamuk".to_string(),
                biography: Some("Türk yazar".to_string()),
            })
            .await
            .unwrap();
        let category = store
            .insert_category(NewCategory {
                name: "Roman".to_string(),
            })
            .await
            .unwrap();
        (store, author, category)
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let (store, author, category) = seeded().await;

        let first = store
            .insert_book(NewBook {
                title: "Masumiyet Müzesi".to_string(),
                description: None,
                author_id: author.id,
                category_id: category.id,
            })
            .await
            .unwrap();
        let second = store
            .insert_book(NewBook {
                title: "Kar".to_string(),
                description: None,
                author_id: author.id,
                category_id: category.id,
            })
            .await
            .unwrap();

        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn insert_rejects_unknown_references() {
        let (store, author, _category) = seeded().await;

        let err = store
            .insert_book(NewBook {
                title: "Kar".to_string(),
                description: None,
                author_id: author.id,
                category_id: 999,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::CategoryNotFound(999)));
    }

    #[tokio::test]
    async fn remove_returns_the_record_once() {
        let (store, author, category) = seeded().await;
        let book = store
            .insert_book(NewBook {
                title: "Kar".to_string(),
                description: None,
                author_id: author.id,
                category_id: category.id,
            })
            .await
            .unwrap();

        let removed = store.remove_book(book.id).await.unwrap();
        assert_eq!(removed.title, "Kar");

        let err = store.remove_book(book.id).await.unwrap_err();
        assert!(matches!(err, StoreError::BookNotFound(_)));
    }

    #[tokio::test]
    async fn matching_scans_title_and_description_case_insensitively() {
        let (store, author, category) = seeded().await;
        store
            .insert_book(NewBook {
                title: "Masumiyet Müzesi".to_string(),
                description: Some("Bir aşk romanı.".to_string()),
                author_id: author.id,
                category_id: category.id,
            })
            .await
            .unwrap();
        store
            .insert_book(NewBook {
                title: "Benim Adım Kırmızı".to_string(),
                description: Some("Sanat ve cinayet, Pamuk'tan.".to_string()),
                author_id: author.id,
                category_id: category.id,
            })
            .await
            .unwrap();

        let hits = store.books_matching("pamuk").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Benim Adım Kırmızı");

        let hits = store.books_matching("masumiyet").await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
