//! Projection store trait.

use async_trait::async_trait;
use common::{CustomerId, OrderId, ShipmentId};
use domain::ShipmentStatus;

use crate::Result;
use crate::view::ShipmentView;

/// A page of views from a listing query.
#[derive(Debug, Clone)]
pub struct Page {
    /// Views in this page, most recently updated first.
    pub views: Vec<ShipmentView>,

    /// Total number of views across all pages.
    pub total: u64,
}

/// Storage for the shipment read model.
///
/// Writes are whole-record upserts keyed by shipment ID: applying the same
/// view twice is a no-op and a newer snapshot replaces an older one
/// entirely. The store carries no history, only current state.
#[async_trait]
pub trait ProjectionStore: Send + Sync {
    /// Inserts or replaces the view for a shipment.
    async fn upsert(&self, view: &ShipmentView) -> Result<()>;

    /// Returns the view for a shipment, if one exists.
    async fn get(&self, shipment_id: ShipmentId) -> Result<Option<ShipmentView>>;

    /// Returns all views belonging to an order.
    async fn by_order(&self, order_id: OrderId) -> Result<Vec<ShipmentView>>;

    /// Returns all views belonging to a customer.
    async fn by_customer(&self, customer_id: CustomerId) -> Result<Vec<ShipmentView>>;

    /// Returns all views currently in the given status.
    async fn by_status(&self, status: ShipmentStatus) -> Result<Vec<ShipmentView>>;

    /// Returns a page of views ordered by last update, newest first.
    async fn list(&self, limit: u32, offset: u64) -> Result<Page>;

    /// Returns the total number of views.
    async fn count(&self) -> Result<u64>;

    /// Returns the number of views in the given status.
    async fn count_by_status(&self, status: ShipmentStatus) -> Result<u64>;

    /// Removes every view. Used before a full rebuild from the event log.
    async fn clear(&self) -> Result<()>;
}
