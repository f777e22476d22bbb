use async_trait::async_trait;
use common::{CustomerId, OrderId, ShipmentId};
use domain::ShipmentStatus;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::Result;
use crate::store::{Page, ProjectionStore};
use crate::view::ShipmentView;

/// PostgreSQL-backed projection store.
///
/// The full view is stored as a JSONB record; the columns queried by the
/// read side (order, customer, status) are extracted and indexed alongside
/// it.
#[derive(Clone)]
pub struct PostgresProjectionStore {
    pool: PgPool,
}

impl PostgresProjectionStore {
    /// Creates a new PostgreSQL projection store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_view(row: PgRow) -> Result<ShipmentView> {
        let record: serde_json::Value = row.try_get("record")?;
        Ok(serde_json::from_value(record)?)
    }
}

#[async_trait]
impl ProjectionStore for PostgresProjectionStore {
    async fn upsert(&self, view: &ShipmentView) -> Result<()> {
        let record = serde_json::to_value(view)?;

        sqlx::query(
            r#"
            INSERT INTO shipment_views
                (shipment_id, order_id, customer_id, status, kind, record,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (shipment_id) DO UPDATE SET
                status = EXCLUDED.status,
                record = EXCLUDED.record,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(view.shipment_id.as_uuid())
        .bind(view.order_id.as_uuid())
        .bind(view.customer_id.as_uuid())
        .bind(view.status.as_str())
        .bind(view.kind.as_str())
        .bind(record)
        .bind(view.created_at)
        .bind(view.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, shipment_id: ShipmentId) -> Result<Option<ShipmentView>> {
        let row = sqlx::query("SELECT record FROM shipment_views WHERE shipment_id = $1")
            .bind(shipment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_view).transpose()
    }

    async fn by_order(&self, order_id: OrderId) -> Result<Vec<ShipmentView>> {
        let rows = sqlx::query(
            "SELECT record FROM shipment_views WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_view).collect()
    }

    async fn by_customer(&self, customer_id: CustomerId) -> Result<Vec<ShipmentView>> {
        let rows = sqlx::query(
            "SELECT record FROM shipment_views WHERE customer_id = $1 ORDER BY created_at ASC",
        )
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_view).collect()
    }

    async fn by_status(&self, status: ShipmentStatus) -> Result<Vec<ShipmentView>> {
        let rows = sqlx::query(
            "SELECT record FROM shipment_views WHERE status = $1 ORDER BY updated_at DESC",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_view).collect()
    }

    async fn list(&self, limit: u32, offset: u64) -> Result<Page> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shipment_views")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT record FROM shipment_views \
             ORDER BY updated_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        let views = rows
            .into_iter()
            .map(Self::row_to_view)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page {
            views,
            total: total as u64,
        })
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shipment_views")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_by_status(&self, status: ShipmentStatus) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shipment_views WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM shipment_views")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
