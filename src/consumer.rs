// Copyright (c) 2025 - Cowboy AI, Inc.
//! Book event consumer
//!
//! One long-lived worker per process, fully decoupled from request handling:
//! it talks to the rest of the system only through the event channel. The
//! loop polls a durable pull consumer with a bounded expiry so a shutdown
//! signal is observed within one poll interval; a batch that has already
//! been received is always processed to completion before the loop exits.
//!
//! Failure policy, in order of appearance:
//! - fetch/transport errors: logged, brief backoff, keep polling
//! - undecodable envelopes (missing/unknown `Event`, bad `Data`): logged,
//!   acknowledged, dropped and never retried
//! - index write failures: absorbed by [`IndexWriter`], message still
//!   acknowledged; the next mutation for that book is the de facto retry
//!
//! Ordering: events for different books are unordered relative to each
//! other. For a single book id the stream is one FIFO log, which is what
//! keeps a later `BookDeleted` from being overtaken by an in-flight
//! `BookCreated`. A transport without that guarantee could resurface a
//! stale create after a delete; that risk is documented here, not patched.

use async_nats::jetstream::{
    self,
    consumer::{pull, AckPolicy, DeliverPolicy},
};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::channel::TopicConfig;
use crate::errors::{CatalogError, CatalogResult};
use crate::events::CatalogEvent;
use crate::index::IndexWriter;

/// Configuration for the book event consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Durable consumer (group) name; one active instance per group
    pub group: String,

    /// Bounded poll expiry; also the shutdown observation latency
    pub poll_interval: Duration,

    /// Maximum messages fetched per poll
    pub batch_size: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group: "book-index-group".to_string(),
            poll_interval: Duration::from_millis(500),
            batch_size: 16,
        }
    }
}

/// Long-running worker applying catalog change events to the search index
pub struct BookEventConsumer {
    writer: IndexWriter,
    topic: TopicConfig,
    config: ConsumerConfig,
}

impl BookEventConsumer {
    /// Create a consumer that feeds the given index writer
    pub fn new(writer: IndexWriter, topic: TopicConfig, config: ConsumerConfig) -> Self {
        Self {
            writer,
            topic,
            config,
        }
    }

    /// Decode one envelope and dispatch it to the index writer
    ///
    /// Transport-independent so the tolerance properties are testable
    /// without a running channel. Never returns an error: everything below
    /// the primary-store boundary is logged and absorbed.
    pub async fn handle_message(&self, payload: &[u8]) {
        match CatalogEvent::decode(payload) {
            Ok(CatalogEvent::BookCreated(book)) => {
                debug!(book_id = book.id, "consuming BookCreated");
                self.writer.upsert(&book).await;
            }
            Ok(CatalogEvent::BookDeleted(book_ref)) => {
                debug!(book_id = book_ref.id, "consuming BookDeleted");
                self.writer.remove(book_ref.id).await;
            }
            Err(e) => {
                warn!(error = %e, "discarding undecodable book event");
            }
        }
    }

    /// Run the polling loop until the shutdown signal flips
    ///
    /// Binds the durable pull consumer (creating it on first start), then
    /// races each bounded fetch against the shutdown signal.
    pub async fn run(
        self,
        jetstream: jetstream::Context,
        mut shutdown: watch::Receiver<bool>,
    ) -> CatalogResult<()> {
        let stream = jetstream
            .get_stream(&self.topic.stream_name)
            .await
            .map_err(|e| CatalogError::ChannelConsume(e.to_string()))?;

        let consumer: jetstream::consumer::PullConsumer =
            match stream.get_consumer(&self.config.group).await {
                Ok(consumer) => consumer,
                Err(_) => stream
                    .create_consumer(pull::Config {
                        durable_name: Some(self.config.group.clone()),
                        deliver_policy: DeliverPolicy::All,
                        ack_policy: AckPolicy::Explicit,
                        ..Default::default()
                    })
                    .await
                    .map_err(|e| CatalogError::ChannelConsume(e.to_string()))?,
            };

        info!(
            group = %self.config.group,
            stream = %self.topic.stream_name,
            "book event consumer started, waiting for messages"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                batch = consumer
                    .fetch()
                    .max_messages(self.config.batch_size)
                    .expires(self.config.poll_interval)
                    .messages() =>
                {
                    match batch {
                        Ok(mut messages) => {
                            while let Some(message) = messages.next().await {
                                match message {
                                    Ok(message) => {
                                        self.handle_message(&message.payload).await;

                                        if let Err(e) = message.ack().await {
                                            warn!(error = %e, "failed to acknowledge book event");
                                        }
                                    }
                                    Err(e) => {
                                        error!(error = %e, "error receiving book event");
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "book event fetch failed; continuing to poll");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }

        info!("book event consumer stopped");
        Ok(())
    }

    /// Spawn the loop as a dedicated background task
    ///
    /// Returns immediately so process startup is never blocked on the first
    /// poll; the handle resolves once the shutdown signal has been observed.
    pub fn spawn(
        self,
        jetstream: jetstream::Context,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run(jetstream, shutdown).await {
                error!(error = %e, "book event consumer terminated");
            }
        })
    }
}
