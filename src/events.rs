// Copyright (c) 2025 - Cowboy AI, Inc.
//! Catalog change events
//!
//! The envelope carried on the book events subject. The `Event` field selects
//! the variant and `Data` carries the payload:
//!
//! ```text
//! {"Event": "BookCreated", "Data": {"Id": 7, "Title": "...", ...}}
//! {"Event": "BookDeleted", "Data": {"Id": 7}}
//! ```
//!
//! Events are append-only facts; the channel does not deduplicate them.
//! Decoding is deliberately tolerant: anything that is not one of the two
//! known variants is rejected with a typed [`EnvelopeError`] so the consumer
//! can log and drop it instead of crashing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::Book;
use crate::errors::CatalogResult;

/// Reference to a book by id, the `BookDeleted` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    #[serde(rename = "Id")]
    pub id: i32,
}

/// A catalog mutation, as published on the event channel
///
/// `BookCreated` carries the full (flat) book record; `BookDeleted` carries
/// only the id. Related authors and categories are referenced by id, never
/// embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Event", content = "Data")]
pub enum CatalogEvent {
    /// A book was committed to the primary store
    BookCreated(Book),

    /// A book was removed from the primary store
    BookDeleted(BookRef),
}

/// Errors raised while decoding an event envelope
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The payload is not JSON at all
    #[error("event payload is not valid JSON: {0}")]
    Malformed(serde_json::Error),

    /// The envelope has no `Event` field
    #[error("event envelope has no 'Event' field")]
    MissingEventType,

    /// The `Event` field names a variant this consumer does not know
    #[error("unknown event type: {0}")]
    UnknownEventType(String),

    /// The `Data` payload does not decode into the variant's record
    #[error("invalid '{event_type}' payload: {source}")]
    InvalidData {
        event_type: &'static str,
        source: serde_json::Error,
    },
}

impl CatalogEvent {
    /// Human-readable event type name, as carried in the `Event` field
    pub fn event_type_name(&self) -> &'static str {
        match self {
            CatalogEvent::BookCreated(_) => "BookCreated",
            CatalogEvent::BookDeleted(_) => "BookDeleted",
        }
    }

    /// The id of the book this event concerns
    pub fn book_id(&self) -> i32 {
        match self {
            CatalogEvent::BookCreated(book) => book.id,
            CatalogEvent::BookDeleted(book_ref) => book_ref.id,
        }
    }

    /// Serialize the envelope for the wire
    pub fn to_bytes(&self) -> CatalogResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode an envelope from raw payload bytes
    ///
    /// Two-phase: the `Event` discriminator is inspected first so that a
    /// missing or unrecognized type is distinguishable from a payload that
    /// fails to decode into the selected variant.
    pub fn decode(payload: &[u8]) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_slice(payload).map_err(EnvelopeError::Malformed)?;

        let event_type = value
            .get("Event")
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::MissingEventType)?;

        let data = value.get("Data").cloned().unwrap_or(Value::Null);

        match event_type {
            "BookCreated" => serde_json::from_value::<Book>(data)
                .map(CatalogEvent::BookCreated)
                .map_err(|source| EnvelopeError::InvalidData {
                    event_type: "BookCreated",
                    source,
                }),
            "BookDeleted" => serde_json::from_value::<BookRef>(data)
                .map(CatalogEvent::BookDeleted)
                .map_err(|source| EnvelopeError::InvalidData {
                    event_type: "BookDeleted",
                    source,
                }),
            other => Err(EnvelopeError::UnknownEventType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn sample_book() -> Book {
        Book {
            id: 101,
            title: "Masumiyet Müzesi".to_string(),
            description: Some("Bir aşk romanı.".to_string()),
            author_id: 1,
            category_id: 1,
            author: None,
            category: None,
        }
    }

    #[test]
    fn created_envelope_matches_the_wire_format() {
        let event = CatalogEvent::BookCreated(sample_book());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["Event"], "BookCreated");
        assert_eq!(json["Data"]["Id"], 101);
        assert_eq!(json["Data"]["Title"], "Masumiyet Müzesi");
        assert_eq!(json["Data"]["AuthorId"], 1);
    }

    #[test]
    fn deleted_envelope_carries_only_the_id() {
        let event = CatalogEvent::BookDeleted(BookRef { id: 101 });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["Event"], "BookDeleted");
        assert_eq!(json["Data"], serde_json::json!({"Id": 101}));
    }

    #[test]
    fn decode_round_trips_a_created_event() {
        let event = CatalogEvent::BookCreated(sample_book());
        let bytes = event.to_bytes().unwrap();

        let decoded = CatalogEvent::decode(&bytes).unwrap();

        assert_eq!(decoded, event);
        assert_eq!(decoded.event_type_name(), "BookCreated");
        assert_eq!(decoded.book_id(), 101);
    }

    #[test]
    fn decode_round_trips_a_deleted_event() {
        let bytes = CatalogEvent::BookDeleted(BookRef { id: 9 })
            .to_bytes()
            .unwrap();

        let decoded = CatalogEvent::decode(&bytes).unwrap();

        assert_eq!(decoded, CatalogEvent::BookDeleted(BookRef { id: 9 }));
    }

    #[test]
    fn unknown_event_type_is_reported_as_such() {
        let err = CatalogEvent::decode(br#"{"Event": "BookArchived", "Data": {"Id": 1}}"#)
            .unwrap_err();

        match err {
            EnvelopeError::UnknownEventType(name) => assert_eq!(name, "BookArchived"),
            other => panic!("expected UnknownEventType, got {other:?}"),
        }
    }

    #[test]
    fn missing_event_field_is_reported_as_such() {
        let err = CatalogEvent::decode(br#"{"Data": {"Id": 1}}"#).unwrap_err();

        assert!(matches!(err, EnvelopeError::MissingEventType));
    }

    #[test_case(br#"not json at all"# ; "not json")]
    #[test_case(br#"{"Event": "BookCreated", "Data": "oops"}"# ; "data is not an object")]
    #[test_case(br#"{"Event": "BookCreated", "Data": {"Title": "no id"}}"# ; "data misses required fields")]
    #[test_case(br#"{"Event": "BookDeleted"}"# ; "deleted without data")]
    #[test_case(br#"{"Event": 42, "Data": {}}"# ; "event field is not a string")]
    fn decode_rejects_malformed_payloads(payload: &[u8]) {
        assert!(CatalogEvent::decode(payload).is_err());
    }
}
