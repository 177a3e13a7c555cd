// Copyright (c) 2025 - Cowboy AI, Inc.
//! Catalog domain records
//!
//! The primary store owns these records and assigns their integer ids.
//! Wire casing is PascalCase (`Id`, `Title`, ...) on both change events and
//! index documents, so the structs carry the casing directly.

use serde::{Deserialize, Serialize};

/// A book in the catalog
///
/// `author` and `category` are object-graph references hydrated from the
/// primary store on the read path; they are never carried by change events
/// or index documents, which reference the related records by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Book {
    pub id: i32,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub author_id: i32,

    pub category_id: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// An author referenced by books via `author_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Author {
    pub id: i32,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

/// A category referenced by books via `category_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    pub id: i32,

    pub name: String,
}

/// Payload for creating a book; the primary store assigns the id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewBook {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub author_id: i32,

    pub category_id: i32,
}

/// Payload for registering an author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewAuthor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
}

/// Payload for registering a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewCategory {
    pub name: String,
}

/// The narrow projection of a book held by the search index
///
/// Deliberately flat: related records appear as ids only, and the read path
/// re-hydrates them from the primary store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexedBook {
    pub id: i32,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub author_id: i32,

    pub category_id: i32,
}

impl From<&Book> for IndexedBook {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            description: book.description.clone(),
            author_id: book.author_id,
            category_id: book.category_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_book() -> Book {
        Book {
            id: 7,
            title: "Masumiyet Müzesi".to_string(),
            description: Some("Bir aşk romanı.".to_string()),
            author_id: 1,
            category_id: 1,
            author: None,
            category: None,
        }
    }

    #[test]
    fn book_serializes_with_pascal_case_fields() {
        let json = serde_json::to_value(sample_book()).unwrap();

        assert_eq!(json["Id"], 7);
        assert_eq!(json["Title"], "Masumiyet Müzesi");
        assert_eq!(json["AuthorId"], 1);
        assert_eq!(json["CategoryId"], 1);
    }

    #[test]
    fn unhydrated_references_are_omitted_from_the_wire() {
        let json = serde_json::to_value(sample_book()).unwrap();

        assert!(json.get("Author").is_none());
        assert!(json.get("Category").is_none());
    }

    #[test]
    fn book_decodes_without_optional_fields() {
        let book: Book = serde_json::from_str(
            r#"{"Id": 3, "Title": "Kar", "AuthorId": 1, "CategoryId": 2}"#,
        )
        .unwrap();

        assert_eq!(book.id, 3);
        assert_eq!(book.description, None);
        assert_eq!(book.author, None);
    }

    #[test]
    fn indexed_book_projects_the_flat_fields() {
        let mut book = sample_book();
        book.author = Some(Author {
            id: 1,
            name: "Orhan Pamuk".to_string(),
            biography: None,
        });

        let doc = IndexedBook::from(&book);

        assert_eq!(doc.id, book.id);
        assert_eq!(doc.title, book.title);
        assert_eq!(doc.description, book.description);
        assert_eq!(doc.author_id, 1);

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("Author").is_none(), "projection must stay flat");
    }
}
