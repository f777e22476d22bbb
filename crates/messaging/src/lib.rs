//! Message delivery adapter.
//!
//! Outbound: domain transitions are published as [`ShipmentNotification`]s
//! through a [`MessageBus`], fire-and-forget with an explicit
//! critical/best-effort policy per notification kind. Inbound: payment and
//! refund notifications are consumed at-least-once by a [`DeliveryWorker`]
//! that enforces bounded retry and dead-letters exhausted messages.

mod bus;
mod error;
mod inbound;
mod notification;
mod notifier;
mod worker;

pub use bus::{InMemoryMessageBus, MessageBus, PublishedMessage};
pub use error::{MessagingError, Result};
pub use inbound::{
    InboundEnvelope, InboundNotification, PaymentApprovedData, PaymentApprovedItem,
    RefundProcessedData,
};
pub use notification::{DeliveryPolicy, NotificationKind, ShipmentNotification};
pub use notifier::ShipmentNotifier;
pub use worker::{DeadLetter, DeliveryWorker, InboundHandler, ProcessOutcome};
