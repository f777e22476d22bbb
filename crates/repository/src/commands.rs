//! Shipment commands.

use common::{OrderId, ShipmentId};
use domain::{Actor, CustomerInfo, LineItem, ProductCondition, ShipmentError};

/// Command to create a new shipment for a paid order.
#[derive(Debug, Clone)]
pub struct CreateShipment {
    pub order_id: OrderId,
    pub customer: CustomerInfo,
    pub items: Vec<LineItem>,
    pub actor: Actor,
    pub note: String,
}

impl CreateShipment {
    /// Creates a new CreateShipment command.
    pub fn new(
        order_id: OrderId,
        customer: CustomerInfo,
        items: Vec<LineItem>,
        actor: Actor,
    ) -> Self {
        Self {
            order_id,
            customer,
            items,
            actor,
            note: String::new(),
        }
    }

    /// Attaches a note to the command.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Rejects malformed input before it reaches the aggregate.
    pub fn validate(&self) -> Result<(), ShipmentError> {
        if self.items.is_empty() {
            return Err(ShipmentError::Validation(
                "shipment must contain at least one line item".to_string(),
            ));
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err(ShipmentError::Validation(
                "line item quantity must be positive".to_string(),
            ));
        }
        if self.customer.name.trim().is_empty() {
            return Err(ShipmentError::Validation(
                "customer name must not be empty".to_string(),
            ));
        }
        if self.customer.address.trim().is_empty() {
            return Err(ShipmentError::Validation(
                "customer address must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command for the plain status transitions (prepared, in transit,
/// delivered, return completion).
#[derive(Debug, Clone)]
pub struct TransitionShipment {
    pub shipment_id: ShipmentId,
    pub actor: Actor,
    pub note: String,
}

impl TransitionShipment {
    /// Creates a new transition command.
    pub fn new(shipment_id: ShipmentId, actor: Actor) -> Self {
        Self {
            shipment_id,
            actor,
            note: String::new(),
        }
    }

    /// Attaches a note to the command.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Command to cancel a shipment before carrier handover.
#[derive(Debug, Clone)]
pub struct CancelShipment {
    pub shipment_id: ShipmentId,
    pub reason: String,
    pub actor: Actor,
}

impl CancelShipment {
    /// Creates a new CancelShipment command.
    pub fn new(shipment_id: ShipmentId, reason: impl Into<String>, actor: Actor) -> Self {
        Self {
            shipment_id,
            reason: reason.into(),
            actor,
        }
    }
}

/// Command to start a return of a delivered shipment.
#[derive(Debug, Clone)]
pub struct InitiateReturn {
    pub shipment_id: ShipmentId,
    pub reason: String,
    pub actor: Actor,
}

impl InitiateReturn {
    /// Creates a new InitiateReturn command.
    pub fn new(shipment_id: ShipmentId, reason: impl Into<String>, actor: Actor) -> Self {
        Self {
            shipment_id,
            reason: reason.into(),
            actor,
        }
    }
}

/// Command to settle a return after the goods arrive back.
#[derive(Debug, Clone)]
pub struct CompleteReturn {
    pub shipment_id: ShipmentId,
    pub note: String,
    pub actor: Actor,
}

impl CompleteReturn {
    /// Creates a new CompleteReturn command.
    pub fn new(shipment_id: ShipmentId, actor: Actor) -> Self {
        Self {
            shipment_id,
            note: String::new(),
            actor,
        }
    }

    /// Attaches an inspection note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// Command to exchange a delivered shipment for a replacement.
#[derive(Debug, Clone)]
pub struct InitiateExchange {
    pub shipment_id: ShipmentId,
    pub reason: String,
    pub actor: Actor,

    /// Items for the replacement shipment. Defaults to the original's
    /// items when absent.
    pub replacement_items: Option<Vec<LineItem>>,
}

impl InitiateExchange {
    /// Creates a new InitiateExchange command.
    pub fn new(shipment_id: ShipmentId, reason: impl Into<String>, actor: Actor) -> Self {
        Self {
            shipment_id,
            reason: reason.into(),
            actor,
            replacement_items: None,
        }
    }

    /// Ships different items as the replacement.
    pub fn with_replacement_items(mut self, items: Vec<LineItem>) -> Self {
        self.replacement_items = Some(items);
        self
    }
}

/// Command to close out an exchange after inspecting the returned goods.
#[derive(Debug, Clone)]
pub struct CompleteExchange {
    pub shipment_id: ShipmentId,
    pub condition: ProductCondition,
    pub note: String,
    pub actor: Actor,
}

impl CompleteExchange {
    /// Creates a new CompleteExchange command.
    pub fn new(shipment_id: ShipmentId, condition: ProductCondition, actor: Actor) -> Self {
        Self {
            shipment_id,
            condition,
            note: String::new(),
            actor,
        }
    }

    /// Attaches an inspection note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}
