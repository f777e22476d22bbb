//! Projection error types.

use thiserror::Error;

/// Errors that can occur while reading or writing shipment views.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// An error occurred in the database.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize or deserialize a view record.
    #[error("View serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
