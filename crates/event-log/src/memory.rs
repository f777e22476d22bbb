use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, ShipmentId};
use tokio::sync::RwLock;

use crate::{
    EventId, Result, StoredEvent,
    log::{AppendOutcome, EventLog, EventStream, TimeRange},
};

/// In-memory event log implementation for testing.
///
/// Stores events in insertion order and mirrors the idempotency behavior of
/// the PostgreSQL implementation: duplicate event ids are absorbed.
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<StoredEvent>>>,
    seen: Arc<RwLock<HashSet<EventId>>>,
}

impl InMemoryEventLog {
    /// Creates a new empty in-memory event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
        self.seen.write().await.clear();
    }
}

fn sort_chronological(events: &mut [StoredEvent]) {
    // Stable sort keeps insertion order for equal timestamps.
    events.sort_by_key(|e| e.occurred_at);
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, events: Vec<StoredEvent>) -> Result<AppendOutcome> {
        let mut store = self.events.write().await;
        let mut seen = self.seen.write().await;
        let mut outcome = AppendOutcome::default();

        for event in events {
            if seen.contains(&event.event_id) {
                tracing::debug!(event_id = %event.event_id, event_type = %event.event_type,
                    "duplicate event absorbed");
                metrics::counter!("event_log_duplicates_total").increment(1);
                outcome.duplicates += 1;
                continue;
            }
            seen.insert(event.event_id);
            store.push(event);
            outcome.appended += 1;
        }

        metrics::counter!("event_log_appends_total").increment(outcome.appended as u64);
        if outcome.had_duplicates() {
            tracing::info!(
                appended = outcome.appended,
                duplicates = outcome.duplicates,
                "partial append, duplicates skipped"
            );
        }
        Ok(outcome)
    }

    async fn replay(&self, shipment_id: ShipmentId) -> Result<Vec<StoredEvent>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| e.shipment_id == shipment_id)
            .cloned()
            .collect();
        sort_chronological(&mut events);
        Ok(events)
    }

    async fn replay_by_order(&self, order_id: OrderId) -> Result<Vec<StoredEvent>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect();
        sort_chronological(&mut events);
        Ok(events)
    }

    async fn events_by_type(&self, event_type: &str) -> Result<Vec<StoredEvent>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect();
        sort_chronological(&mut events);
        Ok(events)
    }

    async fn events_in_range(&self, range: TimeRange) -> Result<Vec<StoredEvent>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| range.contains(e.occurred_at))
            .cloned()
            .collect();
        sort_chronological(&mut events);
        Ok(events)
    }

    async fn stream_all(&self) -> Result<EventStream> {
        use futures_util::stream;

        let store = self.events.read().await;
        let mut events = store.clone();
        sort_chronological(&mut events);

        let stream = stream::iter(events.into_iter().map(Ok));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn create_test_event(shipment_id: ShipmentId, order_id: OrderId, kind: &str) -> StoredEvent {
        StoredEvent::builder()
            .shipment_id(shipment_id)
            .order_id(order_id)
            .event_type(kind)
            .payload_raw(serde_json::json!({"test": true}))
            .build()
    }

    #[tokio::test]
    async fn append_and_replay() {
        let log = InMemoryEventLog::new();
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();

        let outcome = log
            .append(vec![
                create_test_event(shipment_id, order_id, "ShipmentCreated"),
                create_test_event(shipment_id, order_id, "ShipmentPrepared"),
            ])
            .await
            .unwrap();
        assert_eq!(outcome.appended, 2);
        assert_eq!(outcome.duplicates, 0);

        let events = log.replay(shipment_id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "ShipmentCreated");
        assert_eq!(events[1].event_type, "ShipmentPrepared");
    }

    #[tokio::test]
    async fn duplicate_event_id_is_absorbed() {
        let log = InMemoryEventLog::new();
        let event = create_test_event(ShipmentId::new(), OrderId::new(), "ShipmentCreated");

        let first = log.append(vec![event.clone()]).await.unwrap();
        assert_eq!(first.appended, 1);

        let second = log.append(vec![event.clone()]).await.unwrap();
        assert_eq!(second.appended, 0);
        assert_eq!(second.duplicates, 1);

        assert_eq!(log.event_count().await, 1);
    }

    #[tokio::test]
    async fn partial_batch_duplicate() {
        let log = InMemoryEventLog::new();
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();
        let first = create_test_event(shipment_id, order_id, "ShipmentCreated");
        log.append(vec![first.clone()]).await.unwrap();

        let fresh = create_test_event(shipment_id, order_id, "ShipmentPrepared");
        let outcome = log.append(vec![first, fresh]).await.unwrap();
        assert_eq!(outcome.appended, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(log.event_count().await, 2);
    }

    #[tokio::test]
    async fn replay_unknown_shipment_is_empty() {
        let log = InMemoryEventLog::new();
        let events = log.replay(ShipmentId::new()).await.unwrap();
        assert!(events.is_empty());
        assert!(!log.exists(ShipmentId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn replay_by_order_spans_shipments() {
        let log = InMemoryEventLog::new();
        let order_id = OrderId::new();
        let s1 = ShipmentId::new();
        let s2 = ShipmentId::new();

        log.append(vec![
            create_test_event(s1, order_id, "ShipmentCreated"),
            create_test_event(s2, order_id, "ShipmentCreated"),
            create_test_event(ShipmentId::new(), OrderId::new(), "ShipmentCreated"),
        ])
        .await
        .unwrap();

        let events = log.replay_by_order(order_id).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn events_by_type_filters() {
        let log = InMemoryEventLog::new();
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();

        log.append(vec![
            create_test_event(shipment_id, order_id, "ShipmentCreated"),
            create_test_event(shipment_id, order_id, "ShipmentCancelled"),
        ])
        .await
        .unwrap();

        let cancelled = log.events_by_type("ShipmentCancelled").await.unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].event_type, "ShipmentCancelled");
    }

    #[tokio::test]
    async fn events_in_range_filters_by_time() {
        let log = InMemoryEventLog::new();
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();
        let now = Utc::now();

        let old = StoredEvent::builder()
            .shipment_id(shipment_id)
            .order_id(order_id)
            .event_type("ShipmentCreated")
            .occurred_at(now - Duration::days(10))
            .payload_raw(serde_json::json!({}))
            .build();
        let recent = StoredEvent::builder()
            .shipment_id(shipment_id)
            .order_id(order_id)
            .event_type("ShipmentPrepared")
            .occurred_at(now)
            .payload_raw(serde_json::json!({}))
            .build();
        log.append(vec![old, recent]).await.unwrap();

        let events = log
            .events_in_range(TimeRange::since(now - Duration::days(1)))
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "ShipmentPrepared");
    }

    #[tokio::test]
    async fn stream_all_is_chronological() {
        use futures_util::StreamExt;

        let log = InMemoryEventLog::new();
        let shipment_id = ShipmentId::new();
        let order_id = OrderId::new();
        let now = Utc::now();

        // Appended out of order on purpose.
        let later = StoredEvent::builder()
            .shipment_id(shipment_id)
            .order_id(order_id)
            .event_type("ShipmentPrepared")
            .occurred_at(now)
            .payload_raw(serde_json::json!({}))
            .build();
        let earlier = StoredEvent::builder()
            .shipment_id(shipment_id)
            .order_id(order_id)
            .event_type("ShipmentCreated")
            .occurred_at(now - Duration::minutes(5))
            .payload_raw(serde_json::json!({}))
            .build();
        log.append(vec![later, earlier]).await.unwrap();

        let stream = log.stream_all().await.unwrap();
        let events: Vec<_> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(events[0].event_type, "ShipmentCreated");
        assert_eq!(events[1].event_type, "ShipmentPrepared");
    }
}
