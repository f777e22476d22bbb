//! Repository error types.

use common::ShipmentId;
use thiserror::Error;

/// Errors surfaced by the repository and service layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A domain guard or validation rejected the command.
    #[error(transparent)]
    Domain(#[from] domain::ShipmentError),

    /// The event log failed.
    #[error("Event log error: {0}")]
    EventLog(#[from] event_log::EventLogError),

    /// The projection store failed.
    #[error("Projection error: {0}")]
    Projection(#[from] projections::ProjectionError),

    /// A critical notification could not be published.
    #[error("Messaging error: {0}")]
    Messaging(#[from] messaging::MessagingError),

    /// No events exist for the shipment.
    #[error("Shipment {shipment_id} not found")]
    NotFound { shipment_id: ShipmentId },

    /// Failed to convert between domain and stored events.
    #[error("Event conversion error: {0}")]
    Conversion(#[from] serde_json::Error),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
