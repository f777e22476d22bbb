//! Shipment aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, ShipmentId};
use serde::{Deserialize, Serialize};

use super::{
    Actor, CustomerInfo, LineItem, ProductCondition, ShipmentError, ShipmentEvent, ShipmentKind,
    ShipmentStatus, TrackingEntry,
    events::{ShipmentCreatedData, ShipmentEvent as Event},
};

/// Shipment aggregate root.
///
/// Represents a shipment through its full lifecycle from creation to a
/// terminal state. Command methods validate against the status transition
/// table, apply the resulting event to in-memory state and buffer it in
/// `pending_events` until the repository persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique shipment identifier.
    id: ShipmentId,

    /// The order this shipment fulfils.
    order_id: OrderId,

    /// Normal shipment or the replacement leg of an exchange.
    kind: ShipmentKind,

    /// Current lifecycle status.
    status: ShipmentStatus,

    /// Customer contact/address snapshot taken at creation.
    customer: CustomerInfo,

    /// Ordered line items, immutable after creation.
    items: Vec<LineItem>,

    /// For exchange shipments: the original shipment being replaced.
    /// For originals with an initiated exchange: the replacement.
    related_shipment_id: Option<ShipmentId>,

    /// Chronological trail of tracking entries, one per applied event.
    history: Vec<TrackingEntry>,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,

    /// Events applied but not yet persisted.
    #[serde(skip)]
    pending_events: Vec<ShipmentEvent>,
}

// Constructors and reconstruction
impl Shipment {
    /// Creates a new shipment for a paid order.
    ///
    /// The shipment starts in `Pending` with a buffered `ShipmentCreated`
    /// event.
    pub fn create(
        order_id: OrderId,
        customer: CustomerInfo,
        items: Vec<LineItem>,
        actor: Actor,
        note: impl Into<String>,
    ) -> Result<Self, ShipmentError> {
        Self::create_with_kind(order_id, ShipmentKind::Normal, customer, items, None, actor, note)
    }

    /// Creates the replacement shipment for an exchange.
    ///
    /// The replacement is an ordinary `Pending` shipment of kind `Exchange`
    /// linked back to the original via `related_shipment_id`.
    pub fn create_for_exchange(
        order_id: OrderId,
        customer: CustomerInfo,
        items: Vec<LineItem>,
        original_shipment_id: ShipmentId,
        actor: Actor,
        note: impl Into<String>,
    ) -> Result<Self, ShipmentError> {
        Self::create_with_kind(
            order_id,
            ShipmentKind::Exchange,
            customer,
            items,
            Some(original_shipment_id),
            actor,
            note,
        )
    }

    fn create_with_kind(
        order_id: OrderId,
        kind: ShipmentKind,
        customer: CustomerInfo,
        items: Vec<LineItem>,
        related_shipment_id: Option<ShipmentId>,
        actor: Actor,
        note: impl Into<String>,
    ) -> Result<Self, ShipmentError> {
        if items.is_empty() {
            return Err(ShipmentError::Validation(
                "shipment must contain at least one line item".to_string(),
            ));
        }

        let event = Event::shipment_created(
            ShipmentId::new(),
            order_id,
            kind,
            customer,
            items,
            related_shipment_id,
            actor,
            note,
        );

        let mut shipment = match &event {
            Event::ShipmentCreated(data) => Self::from_created(data.clone()),
            _ => unreachable!(),
        };
        shipment.pending_events.push(event);
        Ok(shipment)
    }

    /// Reconstructs a shipment by replaying its event history in order.
    ///
    /// The history must be non-empty and start with a `ShipmentCreated`
    /// event; replayed events are not re-buffered.
    pub fn from_events(events: Vec<ShipmentEvent>) -> Result<Self, ShipmentError> {
        let mut iter = events.into_iter();
        let first = iter.next().ok_or(ShipmentError::EmptyHistory)?;

        let Event::ShipmentCreated(data) = first else {
            return Err(ShipmentError::MalformedHistory);
        };

        let mut shipment = Self::from_created(data);
        for event in iter {
            shipment.apply(&event);
        }
        Ok(shipment)
    }

    fn from_created(data: ShipmentCreatedData) -> Self {
        let mut shipment = Self {
            id: data.shipment_id,
            order_id: data.order_id,
            kind: data.kind,
            status: ShipmentStatus::Pending,
            customer: data.customer,
            items: data.items,
            related_shipment_id: data.related_shipment_id,
            history: Vec::new(),
            created_at: data.created_at,
            updated_at: data.created_at,
            pending_events: Vec::new(),
        };
        shipment.history.push(TrackingEntry {
            status: ShipmentStatus::Pending,
            note: data.note,
            at: data.created_at,
            by: data.actor,
        });
        shipment
    }
}

// Query methods
impl Shipment {
    /// Returns the shipment ID.
    pub fn id(&self) -> ShipmentId {
        self.id
    }

    /// Returns the order ID.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Returns the shipment kind.
    pub fn kind(&self) -> ShipmentKind {
        self.kind
    }

    /// Returns the current status.
    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    /// Returns the customer snapshot.
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Returns the line items.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the linked shipment, if any.
    pub fn related_shipment_id(&self) -> Option<ShipmentId> {
        self.related_shipment_id
    }

    /// Returns the tracking history, oldest first.
    pub fn history(&self) -> &[TrackingEntry] {
        &self.history
    }

    /// Returns when the shipment was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the shipment last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the shipment is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns true if there are applied but unpersisted events.
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Returns the buffered events without draining them.
    ///
    /// Persistence reads from this and drains with [`take_pending_events`]
    /// only once the events are durably stored, so a failed save leaves the
    /// buffer intact for a retry.
    ///
    /// [`take_pending_events`]: Shipment::take_pending_events
    pub fn pending_events(&self) -> &[ShipmentEvent] {
        &self.pending_events
    }

    /// Drains the buffered events for persistence.
    pub fn take_pending_events(&mut self) -> Vec<ShipmentEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

// Command methods
impl Shipment {
    /// Marks the shipment as picked and packed.
    pub fn mark_prepared(
        &mut self,
        actor: Actor,
        note: impl Into<String>,
    ) -> Result<(), ShipmentError> {
        self.ensure_transition(ShipmentStatus::Prepared)?;
        self.record(Event::shipment_prepared(self.status, actor, note));
        Ok(())
    }

    /// Marks the shipment as handed to the carrier.
    pub fn mark_in_transit(
        &mut self,
        actor: Actor,
        note: impl Into<String>,
    ) -> Result<(), ShipmentError> {
        self.ensure_transition(ShipmentStatus::InTransit)?;
        self.record(Event::shipment_in_transit(self.status, actor, note));
        Ok(())
    }

    /// Marks the shipment as delivered to the customer.
    pub fn mark_delivered(
        &mut self,
        actor: Actor,
        note: impl Into<String>,
    ) -> Result<(), ShipmentError> {
        self.ensure_transition(ShipmentStatus::Delivered)?;
        self.record(Event::shipment_delivered(self.status, actor, note));
        Ok(())
    }

    /// Cancels the shipment.
    ///
    /// Cancellation is only possible before carrier handover, a stricter
    /// gate than the raw transition table.
    pub fn cancel(
        &mut self,
        reason: impl Into<String>,
        actor: Actor,
    ) -> Result<(), ShipmentError> {
        if !self.status.can_be_cancelled() {
            return Err(ShipmentError::InvalidTransition {
                from: self.status,
                to: ShipmentStatus::Cancelled,
            });
        }
        self.record(Event::shipment_cancelled(self.status, reason, actor));
        Ok(())
    }

    /// Starts a return of a delivered shipment.
    pub fn initiate_return(
        &mut self,
        reason: impl Into<String>,
        actor: Actor,
    ) -> Result<(), ShipmentError> {
        if !self.status.can_initiate_return() {
            return Err(ShipmentError::InvalidTransition {
                from: self.status,
                to: ShipmentStatus::Returning,
            });
        }
        self.record(Event::return_initiated(self.status, reason, actor));
        Ok(())
    }

    /// Settles a return once the goods have arrived back.
    pub fn complete_return(
        &mut self,
        note: impl Into<String>,
        actor: Actor,
    ) -> Result<(), ShipmentError> {
        self.ensure_transition(ShipmentStatus::Returned)?;
        self.record(Event::return_completed(self.status, note, actor));
        Ok(())
    }

    /// Routes the shipment down the exchange path.
    ///
    /// Appends two events: `ExchangeInitiated` moving the shipment into
    /// `Returning`, then `ExchangeProcessed` settling it. The replacement
    /// shipment is created separately by the caller and linked here.
    pub fn initiate_exchange(
        &mut self,
        replacement_shipment_id: ShipmentId,
        reason: impl Into<String>,
        actor: Actor,
    ) -> Result<(), ShipmentError> {
        if !self.status.can_initiate_exchange() {
            return Err(ShipmentError::InvalidTransition {
                from: self.status,
                to: ShipmentStatus::Returning,
            });
        }
        let reason = reason.into();
        self.record(Event::exchange_initiated(
            self.status,
            replacement_shipment_id,
            reason.clone(),
            actor.clone(),
        ));
        self.record(Event::exchange_processed(self.status, actor, reason));
        Ok(())
    }

    /// Closes out an exchange after inspecting the returned goods.
    ///
    /// Only goods assessed as `Good` can be finalized today; the damaged
    /// and defective paths are policy decisions that have not been made.
    pub fn complete_exchange(
        &mut self,
        condition: ProductCondition,
        actor: Actor,
        note: impl Into<String>,
    ) -> Result<(), ShipmentError> {
        if self.status != ShipmentStatus::ExchangeProcessed {
            return Err(ShipmentError::InvalidTransition {
                from: self.status,
                to: ShipmentStatus::ExchangeProcessed,
            });
        }
        match condition {
            ProductCondition::Good => {
                self.record(Event::exchange_finalized(condition, actor, note));
                Ok(())
            }
            ProductCondition::Damaged | ProductCondition::Defective => {
                Err(ShipmentError::NotImplemented { condition })
            }
        }
    }

    /// Records a downstream failure on the shipment's history without
    /// changing its status.
    pub fn record_error(&mut self, message: impl Into<String>, actor: Actor) {
        self.record(Event::error_recorded(message, actor));
    }

    fn ensure_transition(&self, to: ShipmentStatus) -> Result<(), ShipmentError> {
        if !self.status.can_transition_to(to) {
            return Err(ShipmentError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    fn record(&mut self, event: ShipmentEvent) {
        self.apply(&event);
        self.pending_events.push(event);
    }
}

// Event application
impl Shipment {
    fn apply(&mut self, event: &ShipmentEvent) {
        if let Some(status) = event.new_status() {
            self.status = status;
        }
        if let Event::ExchangeInitiated(data) = event {
            self.related_shipment_id = Some(data.replacement_shipment_id);
        }
        let at = event.occurred_at();
        self.history.push(TrackingEntry {
            status: self.status,
            note: event.note().to_string(),
            at,
            by: event.actor().clone(),
        });
        self.updated_at = at;
    }
}
