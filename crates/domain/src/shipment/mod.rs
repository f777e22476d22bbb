//! Shipment aggregate and related types.

mod aggregate;
mod events;
mod status;
mod value_objects;

pub use aggregate::Shipment;
pub use events::{
    ErrorRecordedData, ExchangeFinalizedData, ExchangeInitiatedData, ExchangeProcessedData,
    ReturnCompletedData, ReturnInitiatedData, ShipmentCancelledData, ShipmentCreatedData,
    ShipmentDeliveredData, ShipmentEvent, ShipmentInTransitData, ShipmentPreparedData,
};
pub use status::ShipmentStatus;
pub use value_objects::{
    Actor, ArticleId, CustomerInfo, LineItem, Money, ProductCondition, ShipmentKind, TrackingEntry,
};

use thiserror::Error;

/// Errors that can occur during shipment operations.
#[derive(Debug, Error)]
pub enum ShipmentError {
    /// The requested status change is not in the transition table, or a
    /// stricter operation guard rejected it.
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ShipmentStatus,
        to: ShipmentStatus,
    },

    /// Reconstruction was given an empty event sequence.
    #[error("Cannot reconstruct a shipment from an empty event history")]
    EmptyHistory,

    /// Reconstruction was given a sequence whose first event lacks the
    /// creation snapshot.
    #[error("Shipment history does not start with a creation event")]
    MalformedHistory,

    /// Malformed command input, rejected before touching the aggregate state.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The exchange completion policy for this product condition is
    /// documented but not implemented.
    #[error("Exchange completion for condition {condition} is not implemented")]
    NotImplemented { condition: ProductCondition },
}
