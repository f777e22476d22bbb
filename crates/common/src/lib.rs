//! Shared identifier types for the shipment tracking system.

mod types;

pub use types::{CustomerId, OrderId, ShipmentId};
