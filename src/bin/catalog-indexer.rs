// Copyright (c) 2025 - Cowboy AI, Inc.
//! Catalog Indexer Service
//!
//! Listens to the book events stream and projects catalog changes into the
//! search index:
//! - Events → JetStream → BookEventConsumer → IndexWriter → Elasticsearch
//!
//! Run with: cargo run --bin catalog-indexer
//!
//! Prerequisites:
//! 1. NATS server with JetStream running (default: localhost:4222)
//! 2. Elasticsearch reachable (via ELASTICSEARCH_URL environment variable)
//!
//! Exactly one instance should run per consumer group; the idempotent index
//! writes keep the end state correct if more do, but intermediate states
//! may flap.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use library_catalog::adapters::{ElasticsearchConfig, ElasticsearchIndex};
use library_catalog::channel::ensure_book_topic;
use library_catalog::{
    BookEventConsumer, ChannelClient, ChannelConfig, ConsumerConfig, IndexWriter, TopicConfig,
};

/// Configuration for the indexer service
#[derive(Debug, Clone)]
struct IndexerConfig {
    /// Event channel connection
    channel: ChannelConfig,
    /// Book events topic
    topic: TopicConfig,
    /// Consumer group settings
    consumer: ConsumerConfig,
    /// Search backend; absent means there is nothing to index into
    search: Option<ElasticsearchConfig>,
}

impl IndexerConfig {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut channel = ChannelConfig {
            name: "catalog-indexer".to_string(),
            ..ChannelConfig::default()
        };
        if let Ok(url) = std::env::var("NATS_URL") {
            channel.servers = vec![url];
        }

        let mut topic = TopicConfig::default();
        if let Ok(stream_name) = std::env::var("NATS_STREAM") {
            topic.stream_name = stream_name;
        }

        let mut consumer = ConsumerConfig::default();
        if let Ok(group) = std::env::var("NATS_CONSUMER") {
            consumer.group = group;
        }

        let search = std::env::var("ELASTICSEARCH_URL")
            .ok()
            .map(|base_url| ElasticsearchConfig {
                base_url,
                username: std::env::var("ELASTICSEARCH_USERNAME").ok(),
                password: std::env::var("ELASTICSEARCH_PASSWORD").ok(),
                ..ElasticsearchConfig::default()
            });

        Self {
            channel,
            topic,
            consumer,
            search,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("🚀 Starting Catalog Indexer Service");

    let config = IndexerConfig::from_env();
    info!("📋 Configuration loaded:");
    info!("  - Channel: {:?}", config.channel.servers);
    info!("  - Stream: {}", config.topic.stream_name);
    info!("  - Consumer group: {}", config.consumer.group);

    let Some(search_config) = config.search else {
        warn!("ELASTICSEARCH_URL not set; there is no index to maintain, exiting");
        return Ok(());
    };
    info!("  - Search backend: {}", search_config.base_url);

    // Connect to the event channel
    let channel = ChannelClient::new(config.channel)
        .await
        .context("failed to connect to the event channel")?;
    let jetstream = channel.jetstream();

    // Make sure the topic exists before consuming from it
    ensure_book_topic(&jetstream, &config.topic)
        .await
        .context("failed to bootstrap the book events topic")?;

    // Build the index side; initialization is best-effort by design
    let index = Arc::new(
        ElasticsearchIndex::new(search_config)
            .context("failed to build the search backend client")?,
    );
    let writer = IndexWriter::new(index);
    writer.initialize().await;

    // Run the consumer until Ctrl-C
    let consumer = BookEventConsumer::new(writer, config.topic, config.consumer);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = consumer.spawn(jetstream, shutdown_rx);

    info!("🎧 Catalog indexer running; press Ctrl-C to stop");

    signal::ctrl_c()
        .await
        .context("failed to listen for the shutdown signal")?;

    info!("Shutdown signal received, draining");
    let _ = shutdown_tx.send(true);
    worker.await.context("consumer task panicked")?;

    info!("✅ Catalog indexer stopped");
    Ok(())
}
