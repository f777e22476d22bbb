//! Domain layer for the shipment tracking system.
//!
//! This crate provides the core of the event-sourced model:
//! - [`ShipmentStatus`] state machine with transition guards
//! - [`ShipmentEvent`] domain events with per-variant payloads
//! - [`Shipment`] aggregate with an uncommitted-event buffer and
//!   replay-based reconstruction

pub mod shipment;

pub use shipment::{
    Actor, ArticleId, CustomerInfo, LineItem, Money, ProductCondition, Shipment,
    ShipmentCancelledData, ShipmentCreatedData, ShipmentError, ShipmentEvent, ShipmentKind,
    ShipmentStatus, TrackingEntry,
};
