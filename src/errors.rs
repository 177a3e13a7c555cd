//! Error types for catalog infrastructure operations

use thiserror::Error;

/// Errors that can occur while talking to the event channel
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Channel connection error
    #[error("channel connection error: {0}")]
    ChannelConnection(String),

    /// Channel publish error
    #[error("channel publish error: {0}")]
    ChannelPublish(String),

    /// Channel subscribe/consume error
    #[error("channel consume error: {0}")]
    ChannelConsume(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type for catalog infrastructure operations
pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Serialization(err.to_string())
    }
}
