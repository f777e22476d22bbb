//! Conversion between domain events and stored events.

use common::{OrderId, ShipmentId};
use domain::ShipmentEvent;
use event_log::{EventId, StoredEvent};

use crate::Result;

/// Wraps a domain event into its stored form.
///
/// The full event is serialized as the payload; the fields the log's read
/// paths filter on are denormalized alongside it. The stored event keeps
/// the id the domain event was constructed with, so converting the same
/// event twice yields the same idempotency key and the log absorbs the
/// duplicate.
pub fn to_stored_event(
    shipment_id: ShipmentId,
    order_id: OrderId,
    event: &ShipmentEvent,
) -> Result<StoredEvent> {
    let mut builder = StoredEvent::builder()
        .event_id(EventId::from_uuid(event.event_id()))
        .event_type(event.event_type())
        .shipment_id(shipment_id)
        .order_id(order_id)
        .actor(event.actor().as_str())
        .note(event.note())
        .occurred_at(event.occurred_at())
        .payload(event)?;

    if let Some(status) = event.previous_status() {
        builder = builder.previous_status(status.as_str());
    }
    if let Some(status) = event.new_status() {
        builder = builder.new_status(status.as_str());
    }

    Ok(builder.build())
}

/// Recovers the domain event from a stored event's payload.
pub fn to_domain_event(stored: &StoredEvent) -> Result<ShipmentEvent> {
    Ok(serde_json::from_value(stored.payload.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Actor, ShipmentStatus};

    #[test]
    fn stored_event_carries_denormalized_fields() {
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();
        let event = ShipmentEvent::shipment_delivered(
            ShipmentStatus::InTransit,
            Actor::new("carrier"),
            "left at door",
        );

        let stored = to_stored_event(shipment_id, order_id, &event).unwrap();
        assert_eq!(stored.event_type, "ShipmentDelivered");
        assert_eq!(stored.shipment_id, shipment_id);
        assert_eq!(stored.order_id, order_id);
        assert_eq!(stored.previous_status.as_deref(), Some("IN_TRANSIT"));
        assert_eq!(stored.new_status.as_deref(), Some("DELIVERED"));
        assert_eq!(stored.actor, "carrier");
        assert_eq!(stored.note, "left at door");
    }

    #[test]
    fn non_status_event_has_no_new_status() {
        let event = ShipmentEvent::error_recorded("publish failed", Actor::system());
        let stored = to_stored_event(ShipmentId::new(), OrderId::new(), &event).unwrap();

        assert_eq!(stored.new_status, None);
        assert_eq!(stored.previous_status, None);
        assert_eq!(stored.note, "publish failed");
    }

    #[test]
    fn stored_event_keeps_the_domain_event_id() {
        let event = ShipmentEvent::shipment_prepared(
            ShipmentStatus::Pending,
            Actor::new("warehouse"),
            "picked",
        );
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();

        let first = to_stored_event(shipment_id, order_id, &event).unwrap();
        let second = to_stored_event(shipment_id, order_id, &event).unwrap();

        assert_eq!(first.event_id.as_uuid(), event.event_id());
        assert_eq!(first.event_id, second.event_id);
    }

    #[test]
    fn domain_event_round_trips_through_payload() {
        let event = ShipmentEvent::shipment_cancelled(
            ShipmentStatus::Pending,
            "changed mind",
            Actor::new("customer"),
        );
        let stored = to_stored_event(ShipmentId::new(), OrderId::new(), &event).unwrap();

        let recovered = to_domain_event(&stored).unwrap();
        assert_eq!(recovered.event_type(), "ShipmentCancelled");
        assert_eq!(recovered.new_status(), Some(ShipmentStatus::Cancelled));
    }
}
