//! Shipment domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, ShipmentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Actor, CustomerInfo, LineItem, ProductCondition, ShipmentKind, ShipmentStatus};

/// Events that can occur on a shipment aggregate.
///
/// Events represent facts that have happened and are immutable once stored.
/// Status-changing events carry the previous and new status; non-status
/// events (`ExchangeFinalized`, `ErrorRecorded`) carry no new status.
///
/// Every event carries a unique id, minted exactly once when the event is
/// constructed. The id travels with the event through persistence, so a
/// retried save of the same event is absorbed by the log's duplicate-key
/// handling instead of creating a second entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShipmentEvent {
    /// Shipment was created from a paid order.
    ShipmentCreated(ShipmentCreatedData),

    /// Shipment was picked and packed.
    ShipmentPrepared(ShipmentPreparedData),

    /// Shipment was handed to the carrier.
    ShipmentInTransit(ShipmentInTransitData),

    /// Shipment was delivered to the customer.
    ShipmentDelivered(ShipmentDeliveredData),

    /// Shipment was cancelled before carrier handover.
    ShipmentCancelled(ShipmentCancelledData),

    /// Customer initiated a return of a delivered shipment.
    ReturnInitiated(ReturnInitiatedData),

    /// Returned goods arrived and the return was settled.
    ReturnCompleted(ReturnCompletedData),

    /// An exchange was initiated; a replacement shipment exists.
    ExchangeInitiated(ExchangeInitiatedData),

    /// The exchange path settled the original shipment.
    ExchangeProcessed(ExchangeProcessedData),

    /// Returned exchange goods were inspected and the exchange closed out.
    ExchangeFinalized(ExchangeFinalizedData),

    /// A downstream failure was recorded for audit purposes.
    ErrorRecorded(ErrorRecordedData),
}

/// Data for the ShipmentCreated event.
///
/// Carries the full customer and line-item snapshot; replay of any shipment
/// must start with this event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentCreatedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// The new shipment's ID.
    pub shipment_id: ShipmentId,

    /// The order the shipment fulfils.
    pub order_id: OrderId,

    /// Normal shipment or the replacement leg of an exchange.
    pub kind: ShipmentKind,

    /// Customer contact/address snapshot.
    pub customer: CustomerInfo,

    /// Ordered line items, immutable after creation.
    pub items: Vec<LineItem>,

    /// For `Exchange` kind: the original shipment being replaced.
    pub related_shipment_id: Option<ShipmentId>,

    /// Who created the shipment.
    pub actor: Actor,

    /// Free-text note.
    pub note: String,

    /// When the shipment was created.
    pub created_at: DateTime<Utc>,
}

/// Data for the ShipmentPrepared event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentPreparedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// Who prepared the shipment.
    pub actor: Actor,

    /// Free-text note.
    pub note: String,

    /// When the shipment was prepared.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ShipmentInTransit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentInTransitData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// Who handed the shipment to the carrier.
    pub actor: Actor,

    /// Free-text note (e.g. carrier reference).
    pub note: String,

    /// When the handover happened.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ShipmentDelivered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentDeliveredData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// Who confirmed delivery.
    pub actor: Actor,

    /// Free-text note.
    pub note: String,

    /// When delivery was confirmed.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ShipmentCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentCancelledData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// Reason for cancellation.
    pub reason: String,

    /// Who cancelled the shipment.
    pub actor: Actor,

    /// When the shipment was cancelled.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ReturnInitiated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnInitiatedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// Reason given for the return.
    pub reason: String,

    /// Who initiated the return.
    pub actor: Actor,

    /// When the return was initiated.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ReturnCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnCompletedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// Inspection note about the returned goods.
    pub note: String,

    /// Who completed the return.
    pub actor: Actor,

    /// When the return was completed.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ExchangeInitiated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInitiatedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// The replacement shipment created for this exchange.
    pub replacement_shipment_id: ShipmentId,

    /// Reason given for the exchange.
    pub reason: String,

    /// Who initiated the exchange.
    pub actor: Actor,

    /// When the exchange was initiated.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ExchangeProcessed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeProcessedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Status before the event.
    pub previous_status: ShipmentStatus,

    /// Who processed the exchange.
    pub actor: Actor,

    /// Free-text note.
    pub note: String,

    /// When the exchange was processed.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ExchangeFinalized event. Non-status event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeFinalizedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Assessed condition of the returned goods.
    pub condition: ProductCondition,

    /// Who finalized the exchange.
    pub actor: Actor,

    /// Inspection note.
    pub note: String,

    /// When the exchange was finalized.
    pub occurred_at: DateTime<Utc>,
}

/// Data for the ErrorRecorded event. Non-status event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecordedData {
    /// Unique event id; the log's idempotency key.
    pub event_id: Uuid,

    /// Description of the failure.
    pub message: String,

    /// Who recorded the error.
    pub actor: Actor,

    /// When the error was recorded.
    pub occurred_at: DateTime<Utc>,
}

impl ShipmentEvent {
    /// Returns the event's unique id, assigned at construction.
    ///
    /// Stable across clones and serialization, so the same event retried
    /// against the log is recognized as a duplicate.
    pub fn event_id(&self) -> Uuid {
        match self {
            ShipmentEvent::ShipmentCreated(d) => d.event_id,
            ShipmentEvent::ShipmentPrepared(d) => d.event_id,
            ShipmentEvent::ShipmentInTransit(d) => d.event_id,
            ShipmentEvent::ShipmentDelivered(d) => d.event_id,
            ShipmentEvent::ShipmentCancelled(d) => d.event_id,
            ShipmentEvent::ReturnInitiated(d) => d.event_id,
            ShipmentEvent::ReturnCompleted(d) => d.event_id,
            ShipmentEvent::ExchangeInitiated(d) => d.event_id,
            ShipmentEvent::ExchangeProcessed(d) => d.event_id,
            ShipmentEvent::ExchangeFinalized(d) => d.event_id,
            ShipmentEvent::ErrorRecorded(d) => d.event_id,
        }
    }

    /// Returns the event type name, used for storage and routing.
    pub fn event_type(&self) -> &'static str {
        match self {
            ShipmentEvent::ShipmentCreated(_) => "ShipmentCreated",
            ShipmentEvent::ShipmentPrepared(_) => "ShipmentPrepared",
            ShipmentEvent::ShipmentInTransit(_) => "ShipmentInTransit",
            ShipmentEvent::ShipmentDelivered(_) => "ShipmentDelivered",
            ShipmentEvent::ShipmentCancelled(_) => "ShipmentCancelled",
            ShipmentEvent::ReturnInitiated(_) => "ReturnInitiated",
            ShipmentEvent::ReturnCompleted(_) => "ReturnCompleted",
            ShipmentEvent::ExchangeInitiated(_) => "ExchangeInitiated",
            ShipmentEvent::ExchangeProcessed(_) => "ExchangeProcessed",
            ShipmentEvent::ExchangeFinalized(_) => "ExchangeFinalized",
            ShipmentEvent::ErrorRecorded(_) => "ErrorRecorded",
        }
    }

    /// Returns the status before the event, if the event carries one.
    pub fn previous_status(&self) -> Option<ShipmentStatus> {
        match self {
            ShipmentEvent::ShipmentCreated(_)
            | ShipmentEvent::ExchangeFinalized(_)
            | ShipmentEvent::ErrorRecorded(_) => None,
            ShipmentEvent::ShipmentPrepared(d) => Some(d.previous_status),
            ShipmentEvent::ShipmentInTransit(d) => Some(d.previous_status),
            ShipmentEvent::ShipmentDelivered(d) => Some(d.previous_status),
            ShipmentEvent::ShipmentCancelled(d) => Some(d.previous_status),
            ShipmentEvent::ReturnInitiated(d) => Some(d.previous_status),
            ShipmentEvent::ReturnCompleted(d) => Some(d.previous_status),
            ShipmentEvent::ExchangeInitiated(d) => Some(d.previous_status),
            ShipmentEvent::ExchangeProcessed(d) => Some(d.previous_status),
        }
    }

    /// Returns the status after the event; None for non-status events.
    pub fn new_status(&self) -> Option<ShipmentStatus> {
        match self {
            ShipmentEvent::ShipmentCreated(_) => Some(ShipmentStatus::Pending),
            ShipmentEvent::ShipmentPrepared(_) => Some(ShipmentStatus::Prepared),
            ShipmentEvent::ShipmentInTransit(_) => Some(ShipmentStatus::InTransit),
            ShipmentEvent::ShipmentDelivered(_) => Some(ShipmentStatus::Delivered),
            ShipmentEvent::ShipmentCancelled(_) => Some(ShipmentStatus::Cancelled),
            ShipmentEvent::ReturnInitiated(_) => Some(ShipmentStatus::Returning),
            ShipmentEvent::ReturnCompleted(_) => Some(ShipmentStatus::Returned),
            ShipmentEvent::ExchangeInitiated(_) => Some(ShipmentStatus::Returning),
            ShipmentEvent::ExchangeProcessed(_) => Some(ShipmentStatus::ExchangeProcessed),
            ShipmentEvent::ExchangeFinalized(_) | ShipmentEvent::ErrorRecorded(_) => None,
        }
    }

    /// Returns the acting party that triggered the event.
    pub fn actor(&self) -> &Actor {
        match self {
            ShipmentEvent::ShipmentCreated(d) => &d.actor,
            ShipmentEvent::ShipmentPrepared(d) => &d.actor,
            ShipmentEvent::ShipmentInTransit(d) => &d.actor,
            ShipmentEvent::ShipmentDelivered(d) => &d.actor,
            ShipmentEvent::ShipmentCancelled(d) => &d.actor,
            ShipmentEvent::ReturnInitiated(d) => &d.actor,
            ShipmentEvent::ReturnCompleted(d) => &d.actor,
            ShipmentEvent::ExchangeInitiated(d) => &d.actor,
            ShipmentEvent::ExchangeProcessed(d) => &d.actor,
            ShipmentEvent::ExchangeFinalized(d) => &d.actor,
            ShipmentEvent::ErrorRecorded(d) => &d.actor,
        }
    }

    /// Returns the human-readable note attached to the event.
    pub fn note(&self) -> &str {
        match self {
            ShipmentEvent::ShipmentCreated(d) => &d.note,
            ShipmentEvent::ShipmentPrepared(d) => &d.note,
            ShipmentEvent::ShipmentInTransit(d) => &d.note,
            ShipmentEvent::ShipmentDelivered(d) => &d.note,
            ShipmentEvent::ShipmentCancelled(d) => &d.reason,
            ShipmentEvent::ReturnInitiated(d) => &d.reason,
            ShipmentEvent::ReturnCompleted(d) => &d.note,
            ShipmentEvent::ExchangeInitiated(d) => &d.reason,
            ShipmentEvent::ExchangeProcessed(d) => &d.note,
            ShipmentEvent::ExchangeFinalized(d) => &d.note,
            ShipmentEvent::ErrorRecorded(d) => &d.message,
        }
    }

    /// Returns when the event occurred.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ShipmentEvent::ShipmentCreated(d) => d.created_at,
            ShipmentEvent::ShipmentPrepared(d) => d.occurred_at,
            ShipmentEvent::ShipmentInTransit(d) => d.occurred_at,
            ShipmentEvent::ShipmentDelivered(d) => d.occurred_at,
            ShipmentEvent::ShipmentCancelled(d) => d.occurred_at,
            ShipmentEvent::ReturnInitiated(d) => d.occurred_at,
            ShipmentEvent::ReturnCompleted(d) => d.occurred_at,
            ShipmentEvent::ExchangeInitiated(d) => d.occurred_at,
            ShipmentEvent::ExchangeProcessed(d) => d.occurred_at,
            ShipmentEvent::ExchangeFinalized(d) => d.occurred_at,
            ShipmentEvent::ErrorRecorded(d) => d.occurred_at,
        }
    }
}

// Convenience constructors for events
impl ShipmentEvent {
    /// Creates a ShipmentCreated event.
    #[allow(clippy::too_many_arguments)]
    pub fn shipment_created(
        shipment_id: ShipmentId,
        order_id: OrderId,
        kind: ShipmentKind,
        customer: CustomerInfo,
        items: Vec<LineItem>,
        related_shipment_id: Option<ShipmentId>,
        actor: Actor,
        note: impl Into<String>,
    ) -> Self {
        ShipmentEvent::ShipmentCreated(ShipmentCreatedData {
            event_id: Uuid::new_v4(),
            shipment_id,
            order_id,
            kind,
            customer,
            items,
            related_shipment_id,
            actor,
            note: note.into(),
            created_at: Utc::now(),
        })
    }

    /// Creates a ShipmentPrepared event.
    pub fn shipment_prepared(
        previous_status: ShipmentStatus,
        actor: Actor,
        note: impl Into<String>,
    ) -> Self {
        ShipmentEvent::ShipmentPrepared(ShipmentPreparedData {
            event_id: Uuid::new_v4(),
            previous_status,
            actor,
            note: note.into(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ShipmentInTransit event.
    pub fn shipment_in_transit(
        previous_status: ShipmentStatus,
        actor: Actor,
        note: impl Into<String>,
    ) -> Self {
        ShipmentEvent::ShipmentInTransit(ShipmentInTransitData {
            event_id: Uuid::new_v4(),
            previous_status,
            actor,
            note: note.into(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ShipmentDelivered event.
    pub fn shipment_delivered(
        previous_status: ShipmentStatus,
        actor: Actor,
        note: impl Into<String>,
    ) -> Self {
        ShipmentEvent::ShipmentDelivered(ShipmentDeliveredData {
            event_id: Uuid::new_v4(),
            previous_status,
            actor,
            note: note.into(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ShipmentCancelled event.
    pub fn shipment_cancelled(
        previous_status: ShipmentStatus,
        reason: impl Into<String>,
        actor: Actor,
    ) -> Self {
        ShipmentEvent::ShipmentCancelled(ShipmentCancelledData {
            event_id: Uuid::new_v4(),
            previous_status,
            reason: reason.into(),
            actor,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ReturnInitiated event.
    pub fn return_initiated(
        previous_status: ShipmentStatus,
        reason: impl Into<String>,
        actor: Actor,
    ) -> Self {
        ShipmentEvent::ReturnInitiated(ReturnInitiatedData {
            event_id: Uuid::new_v4(),
            previous_status,
            reason: reason.into(),
            actor,
            occurred_at: Utc::now(),
        })
    }

    /// Creates a ReturnCompleted event.
    pub fn return_completed(
        previous_status: ShipmentStatus,
        note: impl Into<String>,
        actor: Actor,
    ) -> Self {
        ShipmentEvent::ReturnCompleted(ReturnCompletedData {
            event_id: Uuid::new_v4(),
            previous_status,
            note: note.into(),
            actor,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an ExchangeInitiated event.
    pub fn exchange_initiated(
        previous_status: ShipmentStatus,
        replacement_shipment_id: ShipmentId,
        reason: impl Into<String>,
        actor: Actor,
    ) -> Self {
        ShipmentEvent::ExchangeInitiated(ExchangeInitiatedData {
            event_id: Uuid::new_v4(),
            previous_status,
            replacement_shipment_id,
            reason: reason.into(),
            actor,
            occurred_at: Utc::now(),
        })
    }

    /// Creates an ExchangeProcessed event.
    pub fn exchange_processed(
        previous_status: ShipmentStatus,
        actor: Actor,
        note: impl Into<String>,
    ) -> Self {
        ShipmentEvent::ExchangeProcessed(ExchangeProcessedData {
            event_id: Uuid::new_v4(),
            previous_status,
            actor,
            note: note.into(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates an ExchangeFinalized event.
    pub fn exchange_finalized(
        condition: ProductCondition,
        actor: Actor,
        note: impl Into<String>,
    ) -> Self {
        ShipmentEvent::ExchangeFinalized(ExchangeFinalizedData {
            event_id: Uuid::new_v4(),
            condition,
            actor,
            note: note.into(),
            occurred_at: Utc::now(),
        })
    }

    /// Creates an ErrorRecorded event.
    pub fn error_recorded(message: impl Into<String>, actor: Actor) -> Self {
        ShipmentEvent::ErrorRecorded(ErrorRecordedData {
            event_id: Uuid::new_v4(),
            message: message.into(),
            actor,
            occurred_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shipment::Money;
    use common::CustomerId;

    fn customer() -> CustomerInfo {
        CustomerInfo::new(CustomerId::new(), "Jane Doe", "jane@example.com", "1 Main St")
    }

    #[test]
    fn event_type_names() {
        let event = ShipmentEvent::shipment_prepared(
            ShipmentStatus::Pending,
            Actor::new("warehouse"),
            "",
        );
        assert_eq!(event.event_type(), "ShipmentPrepared");

        let event = ShipmentEvent::error_recorded("publish failed", Actor::system());
        assert_eq!(event.event_type(), "ErrorRecorded");
    }

    #[test]
    fn status_fields() {
        let event = ShipmentEvent::shipment_delivered(
            ShipmentStatus::InTransit,
            Actor::new("carrier"),
            "left at door",
        );
        assert_eq!(event.previous_status(), Some(ShipmentStatus::InTransit));
        assert_eq!(event.new_status(), Some(ShipmentStatus::Delivered));
        assert_eq!(event.note(), "left at door");
    }

    #[test]
    fn non_status_events_have_no_new_status() {
        let finalized = ShipmentEvent::exchange_finalized(
            ProductCondition::Good,
            Actor::system(),
            "resellable",
        );
        assert_eq!(finalized.new_status(), None);
        assert_eq!(finalized.previous_status(), None);

        let error = ShipmentEvent::error_recorded("boom", Actor::system());
        assert_eq!(error.new_status(), None);
    }

    #[test]
    fn created_event_carries_snapshot() {
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();
        let items = vec![LineItem::new("SKU-001", 2, Money::from_cents(1000))];

        let event = ShipmentEvent::shipment_created(
            shipment_id,
            order_id,
            ShipmentKind::Normal,
            customer(),
            items,
            None,
            Actor::system(),
            "payment approved",
        );

        assert_eq!(event.new_status(), Some(ShipmentStatus::Pending));
        if let ShipmentEvent::ShipmentCreated(data) = &event {
            assert_eq!(data.shipment_id, shipment_id);
            assert_eq!(data.order_id, order_id);
            assert_eq!(data.items.len(), 1);
            assert!(data.related_shipment_id.is_none());
        } else {
            panic!("expected ShipmentCreated");
        }
    }

    #[test]
    fn event_id_is_stable() {
        let event = ShipmentEvent::shipment_prepared(
            ShipmentStatus::Pending,
            Actor::new("warehouse"),
            "picked",
        );
        let id = event.event_id();

        assert_eq!(event.clone().event_id(), id);

        let json = serde_json::to_string(&event).unwrap();
        let back: ShipmentEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_id(), id);
    }

    #[test]
    fn distinct_events_get_distinct_ids() {
        let first = ShipmentEvent::error_recorded("boom", Actor::system());
        let second = ShipmentEvent::error_recorded("boom", Actor::system());
        assert_ne!(first.event_id(), second.event_id());
    }

    #[test]
    fn serialization_is_tagged() {
        let event = ShipmentEvent::shipment_cancelled(
            ShipmentStatus::Pending,
            "customer changed mind",
            Actor::new("customer"),
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ShipmentCancelled\""));

        let back: ShipmentEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_type(), "ShipmentCancelled");
        if let ShipmentEvent::ShipmentCancelled(data) = back {
            assert_eq!(data.reason, "customer changed mind");
        } else {
            panic!("expected ShipmentCancelled");
        }
    }
}
