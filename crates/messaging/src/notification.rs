//! Outbound shipment notifications.

use chrono::{DateTime, Utc};
use common::{OrderId, ShipmentId};
use domain::{ShipmentEvent, ShipmentStatus};
use serde::{Deserialize, Serialize};

/// How a publish failure for a notification kind is handled.
///
/// Critical notifications feed downstream refund logic; losing one is an
/// escalation, not a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Publish failure propagates to the caller.
    Critical,

    /// Publish failure is logged and swallowed.
    BestEffort,
}

/// Kind of outbound notification, one per domain event type.
///
/// Intermediate transitions collapse into the generic `StateChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Created,
    StateChanged,
    Delivered,
    Cancelled,
    ReturnInitiated,
    ReturnCompleted,
    ExchangeInitiated,
    ExchangeCompleted,
    ExchangeFinalized,
    Error,
}

impl NotificationKind {
    /// Returns the routing key under which this kind is published.
    pub fn routing_key(&self) -> &'static str {
        match self {
            NotificationKind::Created => "shipment.created",
            NotificationKind::StateChanged => "shipment.state-changed",
            NotificationKind::Delivered => "shipment.delivered",
            NotificationKind::Cancelled => "shipment.cancelled",
            NotificationKind::ReturnInitiated => "shipment.return-initiated",
            NotificationKind::ReturnCompleted => "shipment.return-completed",
            NotificationKind::ExchangeInitiated => "shipment.exchange-initiated",
            NotificationKind::ExchangeCompleted => "shipment.exchange-completed",
            NotificationKind::ExchangeFinalized => "shipment.exchange-finalized",
            NotificationKind::Error => "shipment.error",
        }
    }

    /// Returns the priority hint for brokers that support one.
    pub fn priority(&self) -> u8 {
        match self {
            NotificationKind::Error => 9,
            NotificationKind::Delivered
            | NotificationKind::Cancelled
            | NotificationKind::ReturnCompleted => 8,
            NotificationKind::ExchangeCompleted | NotificationKind::ExchangeFinalized => 6,
            NotificationKind::Created
            | NotificationKind::ReturnInitiated
            | NotificationKind::ExchangeInitiated => 5,
            NotificationKind::StateChanged => 3,
        }
    }

    /// Returns the delivery policy for this kind.
    ///
    /// Delivery confirmations, cancellations and completed returns gate
    /// refunds downstream, so those are the critical ones.
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        match self {
            NotificationKind::Delivered
            | NotificationKind::Cancelled
            | NotificationKind::ReturnCompleted => DeliveryPolicy::Critical,
            _ => DeliveryPolicy::BestEffort,
        }
    }
}

/// Notification published after a domain event is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentNotification {
    pub kind: NotificationKind,
    pub shipment_id: ShipmentId,
    pub order_id: OrderId,
    pub previous_status: Option<ShipmentStatus>,
    pub new_status: Option<ShipmentStatus>,
    pub note: String,
    pub priority: u8,
    pub occurred_at: DateTime<Utc>,
}

impl ShipmentNotification {
    /// Builds the notification for a persisted domain event.
    pub fn from_event(
        shipment_id: ShipmentId,
        order_id: OrderId,
        event: &ShipmentEvent,
    ) -> Self {
        let kind = match event {
            ShipmentEvent::ShipmentCreated(_) => NotificationKind::Created,
            ShipmentEvent::ShipmentPrepared(_) | ShipmentEvent::ShipmentInTransit(_) => {
                NotificationKind::StateChanged
            }
            ShipmentEvent::ShipmentDelivered(_) => NotificationKind::Delivered,
            ShipmentEvent::ShipmentCancelled(_) => NotificationKind::Cancelled,
            ShipmentEvent::ReturnInitiated(_) => NotificationKind::ReturnInitiated,
            ShipmentEvent::ReturnCompleted(_) => NotificationKind::ReturnCompleted,
            ShipmentEvent::ExchangeInitiated(_) => NotificationKind::ExchangeInitiated,
            ShipmentEvent::ExchangeProcessed(_) => NotificationKind::ExchangeCompleted,
            ShipmentEvent::ExchangeFinalized(_) => NotificationKind::ExchangeFinalized,
            ShipmentEvent::ErrorRecorded(_) => NotificationKind::Error,
        };

        Self {
            kind,
            shipment_id,
            order_id,
            previous_status: event.previous_status(),
            new_status: event.new_status(),
            note: event.note().to_string(),
            priority: kind.priority(),
            occurred_at: event.occurred_at(),
        }
    }

    /// Returns the routing key for this notification.
    pub fn routing_key(&self) -> &'static str {
        self.kind.routing_key()
    }

    /// Returns the delivery policy for this notification.
    pub fn delivery_policy(&self) -> DeliveryPolicy {
        self.kind.delivery_policy()
    }
}
