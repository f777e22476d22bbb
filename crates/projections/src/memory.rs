//! In-memory projection store for testing and development.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CustomerId, OrderId, ShipmentId};
use domain::ShipmentStatus;
use tokio::sync::RwLock;

use crate::Result;
use crate::store::{Page, ProjectionStore};
use crate::view::ShipmentView;

/// In-memory implementation of [`ProjectionStore`].
///
/// Views are held in a `HashMap` behind an async `RwLock`. Cloning the
/// store shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryProjectionStore {
    views: Arc<RwLock<HashMap<ShipmentId, ShipmentView>>>,
}

impl InMemoryProjectionStore {
    /// Creates a new empty projection store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectionStore for InMemoryProjectionStore {
    async fn upsert(&self, view: &ShipmentView) -> Result<()> {
        self.views
            .write()
            .await
            .insert(view.shipment_id, view.clone());
        Ok(())
    }

    async fn get(&self, shipment_id: ShipmentId) -> Result<Option<ShipmentView>> {
        Ok(self.views.read().await.get(&shipment_id).cloned())
    }

    async fn by_order(&self, order_id: OrderId) -> Result<Vec<ShipmentView>> {
        Ok(self
            .views
            .read()
            .await
            .values()
            .filter(|view| view.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn by_customer(&self, customer_id: CustomerId) -> Result<Vec<ShipmentView>> {
        Ok(self
            .views
            .read()
            .await
            .values()
            .filter(|view| view.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn by_status(&self, status: ShipmentStatus) -> Result<Vec<ShipmentView>> {
        Ok(self
            .views
            .read()
            .await
            .values()
            .filter(|view| view.status == status)
            .cloned()
            .collect())
    }

    async fn list(&self, limit: u32, offset: u64) -> Result<Page> {
        let views = self.views.read().await;
        let total = views.len() as u64;

        let mut all: Vec<ShipmentView> = views.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let views = all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok(Page { views, total })
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.views.read().await.len() as u64)
    }

    async fn count_by_status(&self, status: ShipmentStatus) -> Result<u64> {
        Ok(self
            .views
            .read()
            .await
            .values()
            .filter(|view| view.status == status)
            .count() as u64)
    }

    async fn clear(&self) -> Result<()> {
        self.views.write().await.clear();
        Ok(())
    }
}
