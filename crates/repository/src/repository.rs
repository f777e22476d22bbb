//! Shipment repository: replay-based loads and append-then-upsert saves.

use std::collections::HashMap;
use std::sync::Arc;

use common::ShipmentId;
use domain::{Shipment, ShipmentStatus};
use event_log::EventLog;
use futures_util::StreamExt;
use projections::{ProjectionStore, ShipmentView};

use crate::convert::{to_domain_event, to_stored_event};
use crate::error::{RepositoryError, Result};

/// Result of comparing the log against the projection for one shipment.
#[derive(Debug, Clone)]
pub struct ConsistencyReport {
    pub shipment_id: ShipmentId,

    /// Status derived by replaying the event log.
    pub log_status: ShipmentStatus,

    /// Status held by the projection, if a view exists.
    pub projection_status: Option<ShipmentStatus>,

    /// True when the projection matches the log.
    pub consistent: bool,
}

/// Persists and reconstructs shipment aggregates.
///
/// On save, buffered events go to the event log before the projection is
/// upserted: a crash between the two steps leaves the source of truth
/// ahead of the repairable read model, never the reverse.
#[derive(Clone)]
pub struct ShipmentRepository {
    log: Arc<dyn EventLog>,
    projections: Arc<dyn ProjectionStore>,
}

impl ShipmentRepository {
    /// Creates a repository over the given stores.
    pub fn new(log: Arc<dyn EventLog>, projections: Arc<dyn ProjectionStore>) -> Self {
        Self { log, projections }
    }

    /// Returns the underlying event log.
    pub fn event_log(&self) -> &Arc<dyn EventLog> {
        &self.log
    }

    /// Returns the underlying projection store.
    pub fn projection_store(&self) -> &Arc<dyn ProjectionStore> {
        &self.projections
    }

    /// Persists the aggregate's buffered events and refreshes its view.
    ///
    /// Returns the events that were persisted so the caller can publish
    /// notifications for them. Saving with an empty buffer only refreshes
    /// the projection.
    ///
    /// The buffer is drained only after both the append and the upsert
    /// succeed. A failed save leaves the events buffered on the aggregate,
    /// and because each event carries a stable id, a retried save is
    /// absorbed by the log for anything that did land on the first attempt.
    #[tracing::instrument(skip(self, shipment), fields(shipment_id = %shipment.id()))]
    pub async fn save(&self, shipment: &mut Shipment) -> Result<Vec<domain::ShipmentEvent>> {
        if shipment.has_pending_events() {
            let stored = shipment
                .pending_events()
                .iter()
                .map(|event| to_stored_event(shipment.id(), shipment.order_id(), event))
                .collect::<Result<Vec<_>>>()?;

            let outcome = self.log.append(stored).await?;
            tracing::debug!(
                appended = outcome.appended,
                duplicates = outcome.duplicates,
                "events persisted"
            );
        }

        self.projections
            .upsert(&ShipmentView::from(&*shipment))
            .await?;

        Ok(shipment.take_pending_events())
    }

    /// Reconstructs a shipment by replaying its full event history.
    #[tracing::instrument(skip(self))]
    pub async fn load_by_id(&self, shipment_id: ShipmentId) -> Result<Shipment> {
        let stored = self.log.replay(shipment_id).await?;
        if stored.is_empty() {
            return Err(RepositoryError::NotFound { shipment_id });
        }

        let events = stored
            .iter()
            .map(to_domain_event)
            .collect::<Result<Vec<_>>>()?;

        Ok(Shipment::from_events(events)?)
    }

    /// Fast read of the projection; absent views are not an error.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, shipment_id: ShipmentId) -> Result<Option<ShipmentView>> {
        Ok(self.projections.get(shipment_id).await?)
    }

    /// Compares the replayed status against the projection's status.
    ///
    /// Divergence is reported, not repaired; use [`rebuild_projection`]
    /// for that.
    ///
    /// [`rebuild_projection`]: Self::rebuild_projection
    #[tracing::instrument(skip(self))]
    pub async fn validate_consistency(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<ConsistencyReport> {
        let shipment = self.load_by_id(shipment_id).await?;
        let view = self.projections.get(shipment_id).await?;

        let projection_status = view.map(|v| v.status);
        let consistent = projection_status == Some(shipment.status());

        if !consistent {
            tracing::warn!(
                %shipment_id,
                log_status = %shipment.status(),
                ?projection_status,
                "projection diverged from event log"
            );
        }

        Ok(ConsistencyReport {
            shipment_id,
            log_status: shipment.status(),
            projection_status,
            consistent,
        })
    }

    /// Repairs one shipment's view by replaying and re-upserting.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_projection(&self, shipment_id: ShipmentId) -> Result<ShipmentView> {
        let shipment = self.load_by_id(shipment_id).await?;
        let view = ShipmentView::from(&shipment);
        self.projections.upsert(&view).await?;
        Ok(view)
    }

    /// Rebuilds the entire read model from the event log.
    ///
    /// Streams the full log in chronological order, folds events per
    /// shipment, wipes the projection store and reinserts every view.
    /// Disaster recovery only, never the hot path.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all_projections(&self) -> Result<usize> {
        let mut stream = self.log.stream_all().await?;

        let mut histories: HashMap<ShipmentId, Vec<domain::ShipmentEvent>> = HashMap::new();
        let mut order: Vec<ShipmentId> = Vec::new();

        while let Some(stored) = stream.next().await {
            let stored = stored?;
            let event = to_domain_event(&stored)?;
            let history = histories.entry(stored.shipment_id).or_insert_with(|| {
                order.push(stored.shipment_id);
                Vec::new()
            });
            history.push(event);
        }

        self.projections.clear().await?;

        let mut rebuilt = 0;
        for shipment_id in order {
            let events = histories.remove(&shipment_id).unwrap_or_default();
            match Shipment::from_events(events) {
                Ok(shipment) => {
                    self.projections
                        .upsert(&ShipmentView::from(&shipment))
                        .await?;
                    rebuilt += 1;
                }
                Err(error) => {
                    tracing::error!(%shipment_id, %error, "skipping unreplayable history");
                }
            }
        }

        tracing::info!(rebuilt, "projection rebuild complete");
        Ok(rebuilt)
    }
}
