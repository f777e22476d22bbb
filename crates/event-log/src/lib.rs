pub mod error;
pub mod event;
pub mod log;
pub mod memory;
pub mod postgres;

pub use common::{OrderId, ShipmentId};
pub use error::{EventLogError, Result};
pub use event::{EventId, StoredEvent, StoredEventBuilder};
pub use log::{AppendOutcome, EventLog, EventStream, TimeRange};
pub use memory::InMemoryEventLog;
pub use postgres::PostgresEventLog;
