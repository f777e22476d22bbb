//! Denormalized shipment view record.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ShipmentId};
use domain::{CustomerInfo, LineItem, Shipment, ShipmentKind, ShipmentStatus};
use serde::{Deserialize, Serialize};

/// One entry of a view's tracking trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingEntryView {
    pub status: ShipmentStatus,
    pub note: String,
    pub at: DateTime<Utc>,
    pub by: String,
}

/// Current state of a shipment, flattened for reads.
///
/// A view is a full snapshot rather than a delta: the write path replaces
/// the whole record after every state change, so upserts are
/// create-or-replace and order of arrival does not matter beyond the last
/// write winning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentView {
    pub shipment_id: ShipmentId,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub status: ShipmentStatus,
    pub kind: ShipmentKind,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub related_shipment_id: Option<ShipmentId>,
    pub tracking: Vec<TrackingEntryView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Shipment> for ShipmentView {
    fn from(shipment: &Shipment) -> Self {
        Self {
            shipment_id: shipment.id(),
            order_id: shipment.order_id(),
            customer_id: shipment.customer().customer_id,
            status: shipment.status(),
            kind: shipment.kind(),
            customer: shipment.customer().clone(),
            items: shipment.items().to_vec(),
            related_shipment_id: shipment.related_shipment_id(),
            tracking: shipment
                .history()
                .iter()
                .map(|entry| TrackingEntryView {
                    status: entry.status,
                    note: entry.note.clone(),
                    at: entry.at,
                    by: entry.by.as_str().to_string(),
                })
                .collect(),
            created_at: shipment.created_at(),
            updated_at: shipment.updated_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Actor, Money};

    fn shipment() -> Shipment {
        let customer = CustomerInfo::new(
            CustomerId::new(),
            "Jane Doe",
            "jane@example.com",
            "1 Main St",
        );
        let items = vec![LineItem::new("SKU-001", 2, Money::from_cents(1000))];
        Shipment::create(OrderId::new(), customer, items, Actor::system(), "created").unwrap()
    }

    #[test]
    fn view_mirrors_aggregate() {
        let mut shipment = shipment();
        shipment.mark_prepared(Actor::new("warehouse"), "packed").unwrap();

        let view = ShipmentView::from(&shipment);
        assert_eq!(view.shipment_id, shipment.id());
        assert_eq!(view.status, ShipmentStatus::Prepared);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.tracking.len(), 2);
        assert_eq!(view.tracking[1].note, "packed");
    }

    #[test]
    fn view_round_trips_through_json() {
        let view = ShipmentView::from(&shipment());
        let json = serde_json::to_value(&view).unwrap();
        let back: ShipmentView = serde_json::from_value(json).unwrap();
        assert_eq!(back.shipment_id, view.shipment_id);
        assert_eq!(back.status, view.status);
    }
}
