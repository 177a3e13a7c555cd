//! Integration tests against a live event channel
//!
//! These tests require a running NATS server with JetStream enabled:
//! ```bash
//! nats-server -js
//! ```
//!
//! Run with: cargo test --test nats_integration -- --ignored

use std::sync::Arc;
use std::time::Duration;

use library_catalog::adapters::MemoryIndex;
use library_catalog::channel::ensure_book_topic;
use library_catalog::domain::Book;
use library_catalog::{
    BookEventConsumer, BookEventPublisher, ChannelClient, ChannelConfig, ConsumerConfig,
    IndexWriter, TopicConfig,
};
use tokio::sync::watch;

/// Helper to check if NATS is available
async fn nats_available() -> bool {
    async_nats::connect("nats://localhost:4222").await.is_ok()
}

async fn channel() -> ChannelClient {
    ChannelClient::new(ChannelConfig::default())
        .await
        .expect("failed to connect to NATS")
}

fn test_topic(stream_name: &str, subject: &str) -> TopicConfig {
    TopicConfig {
        stream_name: stream_name.to_string(),
        subject: subject.to_string(),
        ..TopicConfig::default()
    }
}

#[tokio::test]
#[ignore] // Requires running NATS server
async fn topic_bootstrap_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    if !nats_available().await {
        eprintln!("Skipping test: NATS server not available at localhost:4222");
        return Ok(());
    }

    let channel = channel().await;
    let jetstream = channel.jetstream();
    let topic = test_topic("BOOK_EVENTS_BOOT", "library.books.boot");

    // Creating the topic twice must succeed both times
    ensure_book_topic(&jetstream, &topic).await?;
    ensure_book_topic(&jetstream, &topic).await?;

    jetstream.delete_stream(&topic.stream_name).await?;
    Ok(())
}

#[tokio::test]
#[ignore] // Requires running NATS server
async fn publish_consume_round_trip_updates_the_index(
) -> Result<(), Box<dyn std::error::Error>> {
    if !nats_available().await {
        eprintln!("Skipping test: NATS server not available at localhost:4222");
        return Ok(());
    }

    let channel = channel().await;
    let jetstream = channel.jetstream();
    let topic = test_topic("BOOK_EVENTS_E2E", "library.books.e2e");
    ensure_book_topic(&jetstream, &topic).await?;

    let index = Arc::new(MemoryIndex::new());
    let consumer = BookEventConsumer::new(
        IndexWriter::new(index.clone()),
        topic.clone(),
        ConsumerConfig {
            group: "book-index-e2e".to_string(),
            ..ConsumerConfig::default()
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = consumer.spawn(jetstream.clone(), shutdown_rx);

    // Publish a create followed by a delete for the same book
    let publisher = BookEventPublisher::new(channel.clone(), &topic);
    let book = Book {
        id: 101,
        title: "Masumiyet Müzesi".to_string(),
        description: Some("Bir aşk romanı.".to_string()),
        author_id: 1,
        category_id: 1,
        author: None,
        category: None,
    };

    publisher.publish_created(&book).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        index.document(101).map(|d| d.title),
        Some("Masumiyet Müzesi".to_string()),
        "created book should reach the index"
    );

    publisher.publish_deleted(101).await?;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(
        index.document(101).is_none(),
        "deleted book should leave the index"
    );

    // Shutdown is observed within a poll interval
    shutdown_tx.send(true)?;
    worker.await?;

    jetstream.delete_stream(&topic.stream_name).await?;
    Ok(())
}
