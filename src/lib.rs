//! Library catalog with an event-driven, eventually consistent search index.
//!
//! The catalog of books, authors, and categories lives in a primary store
//! (the source of truth). Every book mutation that commits there is published
//! as a change event on a durable NATS stream; a background consumer applies
//! those events to a separate full-text index. Search prefers the index and
//! falls back to a primary-store substring scan when the index is absent or
//! misbehaving.
//!
//! # Architecture
//!
//! ```text
//! mutation → CatalogStore (commit) → BookEventPublisher → JetStream
//!                                                             │
//!                                    BookEventConsumer ←──────┘
//!                                         │
//!                                    IndexWriter → SearchIndex
//!
//! query → QueryRouter → SearchIndex (preferred) | CatalogStore (fallback)
//! ```
//!
//! The two stores are never synchronized by locking; the index converges to
//! the primary store within the propagation delay of the stream.

pub mod adapters;
pub mod channel;
pub mod consumer;
pub mod domain;
pub mod errors;
pub mod events;
pub mod index;
pub mod publisher;
pub mod query;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use channel::{ChannelClient, ChannelConfig, TopicConfig};
pub use consumer::{BookEventConsumer, ConsumerConfig};
pub use domain::{Author, Book, Category, IndexedBook, NewAuthor, NewBook, NewCategory};
pub use errors::{CatalogError, CatalogResult};
pub use events::CatalogEvent;
pub use index::{IndexWriter, SearchIndex};
pub use publisher::BookEventPublisher;
pub use query::QueryRouter;
pub use service::CatalogService;
pub use store::{CatalogStore, MemoryCatalog};
