use thiserror::Error;

/// Errors that can occur when interacting with the event log.
///
/// Note that a duplicate event id is deliberately *not* an error: retried
/// delivery of the same event is absorbed by [`crate::EventLog::append`]
/// and reported through [`crate::AppendOutcome`].
#[derive(Debug, Error)]
pub enum EventLogError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventLogError>;
