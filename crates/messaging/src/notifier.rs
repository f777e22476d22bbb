//! Outbound notifier enforcing the critical/best-effort policy.

use std::sync::Arc;

use crate::Result;
use crate::bus::MessageBus;
use crate::notification::{DeliveryPolicy, ShipmentNotification};

/// Publishes shipment notifications after events are persisted.
///
/// Publication is fire-and-forget and never retried here. What a failure
/// means depends on the notification kind: best-effort failures are logged
/// and swallowed, critical ones (delivery, cancellation, return
/// completion) propagate so the caller can record them.
#[derive(Clone)]
pub struct ShipmentNotifier {
    bus: Arc<dyn MessageBus>,
}

impl ShipmentNotifier {
    /// Creates a notifier publishing to the given bus.
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    /// Publishes a notification under its kind's routing key.
    pub async fn notify(&self, notification: &ShipmentNotification) -> Result<()> {
        let routing_key = notification.routing_key();
        let payload = serde_json::to_value(notification)?;

        match self.bus.publish(routing_key, payload).await {
            Ok(()) => {
                metrics::counter!("notifications_published_total").increment(1);
                tracing::debug!(
                    routing_key,
                    shipment_id = %notification.shipment_id,
                    "notification published"
                );
                Ok(())
            }
            Err(error) => {
                metrics::counter!("notification_publish_failures_total").increment(1);
                match notification.delivery_policy() {
                    DeliveryPolicy::Critical => {
                        tracing::error!(
                            routing_key,
                            shipment_id = %notification.shipment_id,
                            %error,
                            "critical notification lost"
                        );
                        Err(error)
                    }
                    DeliveryPolicy::BestEffort => {
                        tracing::warn!(
                            routing_key,
                            shipment_id = %notification.shipment_id,
                            %error,
                            "best-effort notification dropped"
                        );
                        Ok(())
                    }
                }
            }
        }
    }
}
