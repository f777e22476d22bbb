use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, ShipmentId};
use futures_core::Stream;

use crate::{Result, StoredEvent};

/// Outcome of an append call.
///
/// An append never fails on duplicate event ids; instead the duplicates are
/// absorbed and counted here so callers (and logs) can tell a clean append
/// from a redelivered one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Number of events newly written by this call.
    pub appended: usize,

    /// Number of events skipped because their id was already present.
    pub duplicates: usize,
}

impl AppendOutcome {
    /// Returns true if at least one event in the batch was already stored.
    pub fn had_duplicates(&self) -> bool {
        self.duplicates > 0
    }
}

/// Inclusive time range filter for event queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange {
    /// Events at or after this timestamp.
    pub from: Option<DateTime<Utc>>,

    /// Events at or before this timestamp.
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Creates a range bounded on both ends.
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// Creates a range bounded only from below.
    pub fn since(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }

    /// Returns true if the timestamp falls within the range.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(from) = self.from
            && at < from
        {
            return false;
        }
        if let Some(to) = self.to
            && at > to
        {
            return false;
        }
        true
    }
}

/// A stream of stored events, in chronological order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StoredEvent>> + Send>>;

/// Core trait for event log implementations.
///
/// The event log is the source of truth for shipment state: append-only,
/// idempotent by event id, never updated or deleted except via full rebuild.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends a batch of events to the log.
    ///
    /// Idempotent: an event whose id is already present is skipped, not an
    /// error. Partial success (some of a batch already present) is allowed
    /// and logged, never retried here.
    async fn append(&self, events: Vec<StoredEvent>) -> Result<AppendOutcome>;

    /// Replays all events for a shipment in strict chronological order.
    ///
    /// An empty result means the aggregate does not exist.
    async fn replay(&self, shipment_id: ShipmentId) -> Result<Vec<StoredEvent>>;

    /// Returns all events correlated with an order id, chronologically.
    async fn replay_by_order(&self, order_id: OrderId) -> Result<Vec<StoredEvent>>;

    /// Returns all events of a given type, chronologically.
    async fn events_by_type(&self, event_type: &str) -> Result<Vec<StoredEvent>>;

    /// Returns all events within a time range, chronologically.
    async fn events_in_range(&self, range: TimeRange) -> Result<Vec<StoredEvent>>;

    /// Streams every event in the log in chronological order.
    ///
    /// Used for full projection rebuilds; never part of the append path.
    async fn stream_all(&self) -> Result<EventStream>;

    /// Returns true if at least one event exists for the shipment.
    async fn exists(&self, shipment_id: ShipmentId) -> Result<bool> {
        Ok(!self.replay(shipment_id).await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn outcome_reports_duplicates() {
        let outcome = AppendOutcome {
            appended: 2,
            duplicates: 1,
        };
        assert!(outcome.had_duplicates());

        let clean = AppendOutcome {
            appended: 3,
            duplicates: 0,
        };
        assert!(!clean.had_duplicates());
    }

    #[test]
    fn time_range_contains() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let range = TimeRange::between(from, to);

        assert!(range.contains(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()));
        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2023, 12, 31, 0, 0, 0).unwrap()));
    }

    #[test]
    fn open_ended_range() {
        let from = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let range = TimeRange::since(from);

        assert!(range.contains(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap()));
    }
}
