// Copyright (c) 2025 - Cowboy AI, Inc.
//! Book event publisher
//!
//! Called by the write path only after the primary-store commit succeeded.
//! Each publish awaits the transport acknowledgment but carries no
//! transactional tie to the store write: when the commit lands and the
//! publish fails, the search index silently falls behind until the next
//! mutation for that book. The publisher itself never retries; the caller
//! decides whether a send failure is fatal (for catalog mutations it is not).

use tracing::debug;

use crate::channel::{ChannelClient, TopicConfig};
use crate::domain::Book;
use crate::errors::CatalogResult;
use crate::events::{BookRef, CatalogEvent};

/// Publishes catalog change events on the book events subject
#[derive(Clone)]
pub struct BookEventPublisher {
    channel: ChannelClient,
    subject: String,
}

impl BookEventPublisher {
    /// Create a publisher for the given topic
    pub fn new(channel: ChannelClient, topic: &TopicConfig) -> Self {
        Self {
            channel,
            subject: topic.subject.clone(),
        }
    }

    /// Publish a `BookCreated` event carrying the committed record
    pub async fn publish_created(&self, book: &Book) -> CatalogResult<()> {
        let event = CatalogEvent::BookCreated(book.clone());
        self.publish(event).await
    }

    /// Publish a `BookDeleted` event carrying only the id
    pub async fn publish_deleted(&self, book_id: i32) -> CatalogResult<()> {
        let event = CatalogEvent::BookDeleted(BookRef { id: book_id });
        self.publish(event).await
    }

    async fn publish(&self, event: CatalogEvent) -> CatalogResult<()> {
        debug!(
            subject = %self.subject,
            event_type = event.event_type_name(),
            book_id = event.book_id(),
            "publishing catalog event"
        );

        self.channel.publish(&self.subject, &event).await?;

        debug!(
            event_type = event.event_type_name(),
            book_id = event.book_id(),
            "catalog event acknowledged by channel"
        );
        Ok(())
    }
}
