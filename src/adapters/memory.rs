//! In-memory search index
//!
//! A [`SearchIndex`] over a plain map, for tests and local development.
//! Matching is a case-insensitive substring scan rather than real full-text
//! analysis, and results come back in id order.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::domain::IndexedBook;
use crate::index::{IndexError, SearchIndex};

/// In-memory implementation of [`SearchIndex`]
#[derive(Default)]
pub struct MemoryIndex {
    documents: RwLock<BTreeMap<i32, IndexedBook>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document for an id, if indexed
    pub fn document(&self, book_id: i32) -> Option<IndexedBook> {
        self.documents.read().unwrap().get(&book_id).cloned()
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn ensure_index(&self) -> Result<(), IndexError> {
        Ok(())
    }

    async fn upsert(&self, document: &IndexedBook) -> Result<(), IndexError> {
        self.documents
            .write()
            .unwrap()
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn remove(&self, book_id: i32) -> Result<(), IndexError> {
        self.documents.write().unwrap().remove(&book_id);
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<IndexedBook>, IndexError> {
        let needle = query.to_lowercase();
        let documents = self.documents.read().unwrap();

        Ok(documents
            .values()
            .filter(|doc| {
                doc.title.to_lowercase().contains(&needle)
                    || doc
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "memory-index"
    }
}
