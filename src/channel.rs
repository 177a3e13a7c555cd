//! Event channel client for catalog change events
//!
//! Thin wrapper over NATS with the JetStream bootstrap for the single
//! well-known book events topic. The stream is the durable, ordered log the
//! publisher writes to and the consumer reads from; it must exist before
//! either side touches it, so both call [`ensure_book_topic`] first.

use async_nats::jetstream::{self, stream::Stream};
use async_nats::{Client, ConnectOptions};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{CatalogError, CatalogResult};

/// Configuration for the channel connection
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "library-catalog".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Configuration for the book events topic
#[derive(Debug, Clone)]
pub struct TopicConfig {
    /// Stream name holding the catalog change log
    pub stream_name: String,
    /// Subject change events are published on
    pub subject: String,
    /// Maximum age of retained events
    pub max_age: Duration,
    /// Number of stream replicas (for clustered servers)
    pub replicas: usize,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            stream_name: "BOOK_EVENTS".to_string(),
            subject: "library.books".to_string(),
            max_age: Duration::from_secs(30 * 24 * 60 * 60),
            replicas: 1,
        }
    }
}

/// Channel client wrapper providing catalog-specific operations
#[derive(Clone)]
pub struct ChannelClient {
    client: Client,
}

impl ChannelClient {
    /// Connect to the channel with the given configuration
    pub async fn new(config: ChannelConfig) -> CatalogResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| CatalogError::ChannelConnection(e.to_string()))?;

        info!("Connected to event channel at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Wrap an already connected client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Publish a message to a subject, awaiting transport acknowledgment
    pub async fn publish<T>(&self, subject: &str, message: &T) -> CatalogResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| CatalogError::ChannelPublish(e.to_string()))?;

        debug!("Published message to subject: {}", subject);
        Ok(())
    }

    /// JetStream context for stream and consumer management
    pub fn jetstream(&self) -> jetstream::Context {
        jetstream::new(self.client.clone())
    }

    /// Get the underlying client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Create the book events stream if it does not exist yet
///
/// Checks for the stream first and treats an existing one as success, so the
/// bootstrap is safe to run from every process on every start.
pub async fn ensure_book_topic(
    jetstream: &jetstream::Context,
    config: &TopicConfig,
) -> CatalogResult<Stream> {
    match jetstream.get_stream(&config.stream_name).await {
        Ok(stream) => {
            info!("Book events stream '{}' already exists", config.stream_name);
            Ok(stream)
        }
        Err(_) => {
            let stream = jetstream
                .create_stream(jetstream::stream::Config {
                    name: config.stream_name.clone(),
                    subjects: vec![config.subject.clone()],
                    max_age: config.max_age,
                    storage: jetstream::stream::StorageType::File,
                    num_replicas: config.replicas,
                    retention: jetstream::stream::RetentionPolicy::Limits,
                    ..Default::default()
                })
                .await
                .map_err(|e| CatalogError::ChannelConnection(e.to_string()))?;

            info!("Created book events stream '{}'", config.stream_name);
            Ok(stream)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_config_defaults() {
        let config = ChannelConfig::default();

        assert_eq!(config.servers, vec!["nats://localhost:4222"]);
        assert_eq!(config.name, "library-catalog");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn topic_config_defaults_to_a_single_replica() {
        let config = TopicConfig::default();

        assert_eq!(config.stream_name, "BOOK_EVENTS");
        assert_eq!(config.subject, "library.books");
        assert_eq!(config.replicas, 1);
    }
}
