//! Shipment status state machine.

use serde::{Deserialize, Serialize};

/// The status of a shipment in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Prepared ──┬──► InTransit ──► Delivered ──► Returning ──┬──► Returned
///           │               │                                            │
///           └───────────────┴──► Cancelled                               └──► ExchangeProcessed
/// ```
///
/// `Cancelled`, `Returned` and `ExchangeProcessed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    /// Payment confirmed, shipment registered but not yet picked.
    #[default]
    Pending,

    /// Picked and packed, waiting for carrier handover.
    Prepared,

    /// Handed to the carrier.
    InTransit,

    /// Confirmed received by the customer.
    Delivered,

    /// Cancelled before carrier handover (terminal).
    Cancelled,

    /// A return or exchange is underway, goods travelling back.
    Returning,

    /// Returned goods received and the return settled (terminal).
    Returned,

    /// Exchange settled, a replacement shipment exists (terminal).
    ExchangeProcessed,
}

impl ShipmentStatus {
    /// Returns the statuses legally reachable from this one.
    pub fn successors(&self) -> &'static [ShipmentStatus] {
        use ShipmentStatus::*;
        match self {
            Pending => &[Prepared, Cancelled],
            Prepared => &[InTransit, Cancelled],
            InTransit => &[Delivered],
            Delivered => &[Returning],
            Returning => &[Returned, ExchangeProcessed],
            Cancelled | Returned | ExchangeProcessed => &[],
        }
    }

    /// Returns true if the transition table allows moving to `target`.
    pub fn can_transition_to(&self, target: ShipmentStatus) -> bool {
        self.successors().contains(&target)
    }

    /// Returns true if the shipment can still be cancelled.
    ///
    /// Stricter than raw reachability of `Cancelled`: only `Pending` and
    /// `Prepared` qualify, and this predicate must be checked before a
    /// cancellation event is emitted.
    pub fn can_be_cancelled(&self) -> bool {
        matches!(self, ShipmentStatus::Pending | ShipmentStatus::Prepared)
    }

    /// Returns true if the shipment has been delivered.
    pub fn is_delivered(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered)
    }

    /// Returns true if a return can be initiated from this status.
    pub fn can_initiate_return(&self) -> bool {
        self.is_delivered()
    }

    /// Returns true if an exchange can be initiated from this status.
    ///
    /// The `Returning` case covers a return already underway being turned
    /// into an exchange.
    pub fn can_initiate_exchange(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Returning)
    }

    /// Returns true if this is a terminal status (no outbound transitions).
    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }

    /// Returns the status name as used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "PENDING",
            ShipmentStatus::Prepared => "PREPARED",
            ShipmentStatus::InTransit => "IN_TRANSIT",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Cancelled => "CANCELLED",
            ShipmentStatus::Returning => "RETURNING",
            ShipmentStatus::Returned => "RETURNED",
            ShipmentStatus::ExchangeProcessed => "EXCHANGE_PROCESSED",
        }
    }

    /// Parses a status from its wire name.
    pub fn parse(s: &str) -> Option<ShipmentStatus> {
        match s {
            "PENDING" => Some(ShipmentStatus::Pending),
            "PREPARED" => Some(ShipmentStatus::Prepared),
            "IN_TRANSIT" => Some(ShipmentStatus::InTransit),
            "DELIVERED" => Some(ShipmentStatus::Delivered),
            "CANCELLED" => Some(ShipmentStatus::Cancelled),
            "RETURNING" => Some(ShipmentStatus::Returning),
            "RETURNED" => Some(ShipmentStatus::Returned),
            "EXCHANGE_PROCESSED" => Some(ShipmentStatus::ExchangeProcessed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
