use chrono::{DateTime, Utc};
use common::{OrderId, ShipmentId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stored event.
///
/// Doubles as the idempotency key: appending two events with the same id
/// stores exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EventId> for Uuid {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// A domain event as persisted in the event log.
///
/// Carries the event payload as JSON together with the denormalized fields
/// the read paths filter on (shipment id, order id, event type, statuses,
/// timestamp). Stored events are immutable; the log never updates or
/// deletes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Unique identifier and idempotency key for this event.
    pub event_id: EventId,

    /// The type of the event (e.g. "ShipmentCreated", "ShipmentDelivered").
    pub event_type: String,

    /// The shipment this event belongs to.
    pub shipment_id: ShipmentId,

    /// The order the shipment was created for.
    pub order_id: OrderId,

    /// Status before the event, if any.
    pub previous_status: Option<String>,

    /// Status after the event. Absent for non-status events such as an
    /// error record.
    pub new_status: Option<String>,

    /// The acting party that triggered the event.
    pub actor: String,

    /// Human-readable note attached to the event.
    pub note: String,

    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,

    /// The full event payload as JSON.
    pub payload: serde_json::Value,
}

impl StoredEvent {
    /// Creates a new stored event builder.
    pub fn builder() -> StoredEventBuilder {
        StoredEventBuilder::default()
    }
}

/// Builder for constructing stored events.
#[derive(Debug, Default)]
pub struct StoredEventBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    shipment_id: Option<ShipmentId>,
    order_id: Option<OrderId>,
    previous_status: Option<String>,
    new_status: Option<String>,
    actor: Option<String>,
    note: Option<String>,
    occurred_at: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
}

impl StoredEventBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the shipment ID.
    pub fn shipment_id(mut self, id: ShipmentId) -> Self {
        self.shipment_id = Some(id);
        self
    }

    /// Sets the correlated order ID.
    pub fn order_id(mut self, id: OrderId) -> Self {
        self.order_id = Some(id);
        self
    }

    /// Sets the status before the event.
    pub fn previous_status(mut self, status: impl Into<String>) -> Self {
        self.previous_status = Some(status.into());
        self
    }

    /// Sets the status after the event.
    pub fn new_status(mut self, status: impl Into<String>) -> Self {
        self.new_status = Some(status.into());
        self
    }

    /// Sets the acting party.
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Sets the note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Sets the occurrence timestamp. If not set, the current time is used.
    pub fn occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(at);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Builds the stored event.
    ///
    /// # Panics
    ///
    /// Panics if required fields (event_type, shipment_id, order_id, payload)
    /// are not set.
    pub fn build(self) -> StoredEvent {
        StoredEvent {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type.expect("event_type is required"),
            shipment_id: self.shipment_id.expect("shipment_id is required"),
            order_id: self.order_id.expect("order_id is required"),
            previous_status: self.previous_status,
            new_status: self.new_status,
            actor: self.actor.unwrap_or_default(),
            note: self.note.unwrap_or_default(),
            occurred_at: self.occurred_at.unwrap_or_else(Utc::now),
            payload: self.payload.expect("payload is required"),
        }
    }
}
