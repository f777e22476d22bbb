//! Messaging error types.

use thiserror::Error;

/// Errors that can occur when publishing or consuming messages.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The bus rejected a publish.
    #[error("Publish to '{routing_key}' failed: {reason}")]
    Publish {
        routing_key: String,
        reason: String,
    },

    /// Failed to serialize or deserialize a message payload.
    #[error("Message serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The inbound handler rejected a message.
    #[error("Message handler failed: {0}")]
    Handler(String),
}

/// Result type for messaging operations.
pub type Result<T> = std::result::Result<T, MessagingError>;
