use async_trait::async_trait;
use common::{OrderId, ShipmentId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    EventId, Result, StoredEvent,
    log::{AppendOutcome, EventLog, EventStream, TimeRange},
};

const SELECT_COLUMNS: &str = "id, event_type, shipment_id, order_id, previous_status, \
     new_status, actor, note, occurred_at, payload";

/// PostgreSQL-backed event log implementation.
///
/// Idempotency is enforced by the primary key on the event id: a conflicting
/// insert is absorbed with `ON CONFLICT DO NOTHING` rather than surfaced.
#[derive(Clone)]
pub struct PostgresEventLog {
    pool: PgPool,
}

impl PostgresEventLog {
    /// Creates a new PostgreSQL event log.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_event(row: PgRow) -> Result<StoredEvent> {
        Ok(StoredEvent {
            event_id: EventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            event_type: row.try_get("event_type")?,
            shipment_id: ShipmentId::from_uuid(row.try_get::<Uuid, _>("shipment_id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            previous_status: row.try_get("previous_status")?,
            new_status: row.try_get("new_status")?,
            actor: row.try_get("actor")?,
            note: row.try_get("note")?,
            occurred_at: row.try_get("occurred_at")?,
            payload: row.try_get("payload")?,
        })
    }
}

#[async_trait]
impl EventLog for PostgresEventLog {
    async fn append(&self, events: Vec<StoredEvent>) -> Result<AppendOutcome> {
        let mut tx = self.pool.begin().await?;
        let mut outcome = AppendOutcome::default();

        for event in &events {
            let result = sqlx::query(
                r#"
                INSERT INTO shipment_events
                    (id, event_type, shipment_id, order_id, previous_status,
                     new_status, actor, note, occurred_at, payload)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(event.event_id.as_uuid())
            .bind(&event.event_type)
            .bind(event.shipment_id.as_uuid())
            .bind(event.order_id.as_uuid())
            .bind(&event.previous_status)
            .bind(&event.new_status)
            .bind(&event.actor)
            .bind(&event.note)
            .bind(event.occurred_at)
            .bind(&event.payload)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                tracing::debug!(event_id = %event.event_id, event_type = %event.event_type,
                    "duplicate event absorbed");
                metrics::counter!("event_log_duplicates_total").increment(1);
                outcome.duplicates += 1;
            } else {
                outcome.appended += 1;
            }
        }

        tx.commit().await?;

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
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM shipment_events \
             WHERE shipment_id = $1 ORDER BY occurred_at ASC, global_seq ASC"
        ))
        .bind(shipment_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn replay_by_order(&self, order_id: OrderId) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM shipment_events \
             WHERE order_id = $1 ORDER BY occurred_at ASC, global_seq ASC"
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn events_by_type(&self, event_type: &str) -> Result<Vec<StoredEvent>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM shipment_events \
             WHERE event_type = $1 ORDER BY occurred_at ASC, global_seq ASC"
        ))
        .bind(event_type)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn events_in_range(&self, range: TimeRange) -> Result<Vec<StoredEvent>> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM shipment_events WHERE 1=1");
        let mut param_count = 0;

        if range.from.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND occurred_at >= ${param_count}"));
        }
        if range.to.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND occurred_at <= ${param_count}"));
        }
        sql.push_str(" ORDER BY occurred_at ASC, global_seq ASC");

        let mut query = sqlx::query(&sql);
        if let Some(from) = range.from {
            query = query.bind(from);
        }
        if let Some(to) = range.to {
            query = query.bind(to);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn stream_all(&self) -> Result<EventStream> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM shipment_events \
             ORDER BY occurred_at ASC, global_seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let events: Vec<Result<StoredEvent>> =
            rows.into_iter().map(Self::row_to_event).collect();
        Ok(Box::pin(futures_util::stream::iter(events)))
    }

    async fn exists(&self, shipment_id: ShipmentId) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shipment_events WHERE shipment_id = $1")
                .bind(shipment_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}
