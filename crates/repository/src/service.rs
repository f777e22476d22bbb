//! Shipment service: the command-level API.
//!
//! Each operation loads the aggregate by replay, runs one domain
//! operation, persists through the repository and publishes outbound
//! notifications for the persisted events. The payment-approved and
//! refund-processed inbound paths live here too.

use async_trait::async_trait;
use common::ShipmentId;
use domain::{Actor, CustomerInfo, LineItem, Money, Shipment, ShipmentError};
use messaging::{
    InboundHandler, InboundNotification, MessagingError, PaymentApprovedData,
    RefundProcessedData, ShipmentNotification, ShipmentNotifier,
};

use crate::commands::{
    CancelShipment, CompleteExchange, CompleteReturn, CreateShipment, InitiateExchange,
    InitiateReturn, TransitionShipment,
};
use crate::error::Result;
use crate::repository::ShipmentRepository;

/// High-level API for shipment operations.
#[derive(Clone)]
pub struct ShipmentService {
    repository: ShipmentRepository,
    notifier: ShipmentNotifier,
}

impl ShipmentService {
    /// Creates a service over the given repository and notifier.
    pub fn new(repository: ShipmentRepository, notifier: ShipmentNotifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &ShipmentRepository {
        &self.repository
    }

    /// Creates a new shipment.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn create_shipment(&self, cmd: CreateShipment) -> Result<Shipment> {
        cmd.validate()?;

        let mut shipment =
            Shipment::create(cmd.order_id, cmd.customer, cmd.items, cmd.actor, cmd.note)?;
        self.persist_and_notify(&mut shipment).await?;

        metrics::counter!("shipments_created_total").increment(1);
        Ok(shipment)
    }

    /// Marks a shipment as picked and packed.
    #[tracing::instrument(skip(self))]
    pub async fn mark_prepared(&self, cmd: TransitionShipment) -> Result<Shipment> {
        self.transition(cmd.shipment_id, |shipment| {
            shipment.mark_prepared(cmd.actor.clone(), cmd.note.clone())
        })
        .await
    }

    /// Marks a shipment as handed to the carrier.
    #[tracing::instrument(skip(self))]
    pub async fn mark_in_transit(&self, cmd: TransitionShipment) -> Result<Shipment> {
        self.transition(cmd.shipment_id, |shipment| {
            shipment.mark_in_transit(cmd.actor.clone(), cmd.note.clone())
        })
        .await
    }

    /// Marks a shipment as delivered.
    #[tracing::instrument(skip(self))]
    pub async fn mark_delivered(&self, cmd: TransitionShipment) -> Result<Shipment> {
        self.transition(cmd.shipment_id, |shipment| {
            shipment.mark_delivered(cmd.actor.clone(), cmd.note.clone())
        })
        .await
    }

    /// Cancels a shipment.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_shipment(&self, cmd: CancelShipment) -> Result<Shipment> {
        self.transition(cmd.shipment_id, |shipment| {
            shipment.cancel(cmd.reason.clone(), cmd.actor.clone())
        })
        .await
    }

    /// Starts a return of a delivered shipment.
    #[tracing::instrument(skip(self))]
    pub async fn initiate_return(&self, cmd: InitiateReturn) -> Result<Shipment> {
        self.transition(cmd.shipment_id, |shipment| {
            shipment.initiate_return(cmd.reason.clone(), cmd.actor.clone())
        })
        .await
    }

    /// Settles a return once the goods have arrived back.
    #[tracing::instrument(skip(self))]
    pub async fn complete_return(&self, cmd: CompleteReturn) -> Result<Shipment> {
        self.transition(cmd.shipment_id, |shipment| {
            shipment.complete_return(cmd.note.clone(), cmd.actor.clone())
        })
        .await
    }

    /// Exchanges a delivered shipment for a replacement.
    ///
    /// Touches two aggregates: the original is settled through the
    /// exchange path and a fresh `EXCHANGE`-kind shipment is created,
    /// linked both ways. Returns `(original, replacement)`.
    #[tracing::instrument(skip(self))]
    pub async fn initiate_exchange(
        &self,
        cmd: InitiateExchange,
    ) -> Result<(Shipment, Shipment)> {
        let mut original = self.repository.load_by_id(cmd.shipment_id).await?;

        let items = cmd
            .replacement_items
            .unwrap_or_else(|| original.items().to_vec());
        let mut replacement = Shipment::create_for_exchange(
            original.order_id(),
            original.customer().clone(),
            items,
            original.id(),
            cmd.actor.clone(),
            format!("replacement for shipment {}", original.id()),
        )?;

        original.initiate_exchange(replacement.id(), cmd.reason, cmd.actor)?;

        self.persist_and_notify(&mut original).await?;
        self.persist_and_notify(&mut replacement).await?;

        metrics::counter!("exchanges_initiated_total").increment(1);
        Ok((original, replacement))
    }

    /// Closes out an exchange after inspecting the returned goods.
    #[tracing::instrument(skip(self))]
    pub async fn complete_exchange(&self, cmd: CompleteExchange) -> Result<Shipment> {
        self.transition(cmd.shipment_id, |shipment| {
            shipment.complete_exchange(cmd.condition, cmd.actor.clone(), cmd.note.clone())
        })
        .await
    }

    /// Consumes a "payment approved" notification by creating a shipment.
    ///
    /// Delivery is at-least-once; a redelivered approval for an order that
    /// already has a shipment is absorbed without creating a second one.
    #[tracing::instrument(skip(self, data), fields(order_id = %data.order_id))]
    pub async fn handle_payment_approved(
        &self,
        data: &PaymentApprovedData,
    ) -> Result<Option<Shipment>> {
        let existing = self
            .repository
            .projection_store()
            .by_order(data.order_id)
            .await?;
        if !existing.is_empty() {
            tracing::info!(
                order_id = %data.order_id,
                "payment approval redelivered, shipment already exists"
            );
            return Ok(None);
        }

        let customer = CustomerInfo::new(
            data.customer_id,
            data.customer_name.clone(),
            data.customer_email.clone(),
            data.customer_address.clone(),
        );
        let items = data
            .items
            .iter()
            .map(|item| {
                LineItem::new(
                    item.article_id.as_str(),
                    item.quantity,
                    Money::from_cents(item.unit_price_cents),
                )
            })
            .collect();

        let cmd = CreateShipment::new(data.order_id, customer, items, Actor::system())
            .with_note("payment approved");
        let shipment = self.create_shipment(cmd).await?;
        Ok(Some(shipment))
    }

    /// Consumes a "refund processed" notification.
    ///
    /// Pure audit path: the order's shipments are inspected and logged, no
    /// event is emitted.
    #[tracing::instrument(skip(self, data), fields(order_id = %data.order_id))]
    pub async fn handle_refund_processed(&self, data: &RefundProcessedData) -> Result<()> {
        let views = self
            .repository
            .projection_store()
            .by_order(data.order_id)
            .await?;

        if views.is_empty() {
            tracing::warn!(order_id = %data.order_id, "refund for order with no shipments");
            return Ok(());
        }

        for view in &views {
            tracing::info!(
                order_id = %data.order_id,
                shipment_id = %view.shipment_id,
                status = %view.status,
                "refund processed for order with shipment"
            );
        }
        Ok(())
    }

    async fn transition<F>(&self, shipment_id: ShipmentId, operation: F) -> Result<Shipment>
    where
        F: FnOnce(&mut Shipment) -> std::result::Result<(), ShipmentError>,
    {
        let mut shipment = self.repository.load_by_id(shipment_id).await?;
        operation(&mut shipment)?;
        self.persist_and_notify(&mut shipment).await?;
        Ok(shipment)
    }

    /// Saves buffered events, then publishes one notification per event.
    ///
    /// A lost critical notification is recorded as an `ErrorRecorded`
    /// event on the shipment before the failure is surfaced, so the loss
    /// is auditable in the log.
    async fn persist_and_notify(&self, shipment: &mut Shipment) -> Result<()> {
        let events = self.repository.save(shipment).await?;

        for event in &events {
            let notification =
                ShipmentNotification::from_event(shipment.id(), shipment.order_id(), event);

            if let Err(error) = self.notifier.notify(&notification).await {
                shipment.record_error(
                    format!("notification {} lost: {error}", notification.routing_key()),
                    Actor::system(),
                );
                let error_events = self.repository.save(shipment).await?;
                for error_event in &error_events {
                    let error_notification = ShipmentNotification::from_event(
                        shipment.id(),
                        shipment.order_id(),
                        error_event,
                    );
                    // Error notifications are best-effort by policy
                    self.notifier.notify(&error_notification).await.ok();
                }
                return Err(error.into());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl InboundHandler for ShipmentService {
    async fn handle(&self, notification: &InboundNotification) -> messaging::Result<()> {
        match notification {
            InboundNotification::PaymentApproved(data) => self
                .handle_payment_approved(data)
                .await
                .map(|_| ())
                .map_err(|error| MessagingError::Handler(error.to_string())),
            InboundNotification::RefundProcessed(data) => self
                .handle_refund_processed(data)
                .await
                .map_err(|error| MessagingError::Handler(error.to_string())),
        }
    }
}
