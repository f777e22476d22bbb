//! Shipment repository and command-level service.
//!
//! The repository owns the write path: buffered domain events are appended
//! to the event log first, then the projection is upserted from the
//! aggregate's post-mutation state. The service wires the repository to the
//! outbound notifier and exposes one method per inbound command.

mod commands;
mod convert;
mod error;
mod repository;
mod service;

pub use commands::{
    CancelShipment, CompleteExchange, CompleteReturn, CreateShipment, InitiateExchange,
    InitiateReturn, TransitionShipment,
};
pub use convert::{to_domain_event, to_stored_event};
pub use error::{RepositoryError, Result};
pub use repository::{ConsistencyReport, ShipmentRepository};
pub use service::ShipmentService;
