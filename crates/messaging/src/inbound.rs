//! Inbound notifications consumed from the bus.

use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};

/// Payload of a "payment approved" notification.
///
/// Carries everything needed to create the shipment; the customer and item
/// fields become the aggregate's immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentApprovedData {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_address: String,
    pub items: Vec<PaymentApprovedItem>,
}

/// One ordered line item in a payment approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentApprovedItem {
    pub article_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

/// Payload of a "refund processed" notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundProcessedData {
    pub order_id: OrderId,
}

/// Notifications this subsystem consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundNotification {
    /// Payment cleared; a shipment should be created for the order.
    PaymentApproved(PaymentApprovedData),

    /// A refund went through; audit the order's shipments.
    RefundProcessed(RefundProcessedData),
}

impl InboundNotification {
    /// Returns the notification type name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundNotification::PaymentApproved(_) => "PaymentApproved",
            InboundNotification::RefundProcessed(_) => "RefundProcessed",
        }
    }
}

/// A notification plus its delivery bookkeeping.
///
/// Consumption is at-least-once; `redeliveries` counts how many times this
/// message has already failed and been requeued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEnvelope {
    pub notification: InboundNotification,
    pub redeliveries: u32,
}

impl InboundEnvelope {
    /// Wraps a fresh, never-delivered notification.
    pub fn new(notification: InboundNotification) -> Self {
        Self {
            notification,
            redeliveries: 0,
        }
    }

    /// Returns the envelope as it would arrive on redelivery.
    pub fn redelivered(mut self) -> Self {
        self.redeliveries += 1;
        self
    }
}
