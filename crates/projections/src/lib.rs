//! Query-side shipment views.
//!
//! The projection store holds one denormalized [`ShipmentView`] per
//! shipment, kept in sync by the write path after every successful append.
//! Views are derived data: the event log remains the source of truth and
//! any view can be rebuilt from it.

mod error;
mod memory;
mod postgres;
mod store;
mod view;

pub use error::{ProjectionError, Result};
pub use memory::InMemoryProjectionStore;
pub use postgres::PostgresProjectionStore;
pub use store::{Page, ProjectionStore};
pub use view::{ShipmentView, TrackingEntryView};
