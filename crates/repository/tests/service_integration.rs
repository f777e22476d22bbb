//! Integration tests for the shipment service over in-memory stores.

use std::sync::Arc;

use common::{CustomerId, OrderId, ShipmentId};
use domain::{
    Actor, CustomerInfo, LineItem, Money, ProductCondition, ShipmentError, ShipmentKind,
    ShipmentStatus,
};
use event_log::{EventLog, InMemoryEventLog};
use messaging::{
    DeliveryWorker, InMemoryMessageBus, InboundEnvelope, InboundNotification, PaymentApprovedData,
    PaymentApprovedItem, ProcessOutcome, RefundProcessedData, ShipmentNotifier,
};
use projections::{InMemoryProjectionStore, ProjectionStore};
use repository::{
    CancelShipment, CompleteExchange, CompleteReturn, CreateShipment, InitiateExchange,
    InitiateReturn, RepositoryError, ShipmentRepository, ShipmentService, TransitionShipment,
};

struct TestHarness {
    service: ShipmentService,
    log: Arc<InMemoryEventLog>,
    views: Arc<InMemoryProjectionStore>,
    bus: InMemoryMessageBus,
}

impl TestHarness {
    fn new() -> Self {
        let log = Arc::new(InMemoryEventLog::new());
        let views = Arc::new(InMemoryProjectionStore::new());
        let bus = InMemoryMessageBus::new();

        let repository = ShipmentRepository::new(log.clone(), views.clone());
        let notifier = ShipmentNotifier::new(Arc::new(bus.clone()));
        let service = ShipmentService::new(repository, notifier);

        Self {
            service,
            log,
            views,
            bus,
        }
    }

    fn create_command(&self) -> CreateShipment {
        let customer = CustomerInfo::new(
            CustomerId::new(),
            "Jane Doe",
            "jane@example.com",
            "1 Main St",
        );
        let items = vec![LineItem::new("SKU-001", 1, Money::from_cents(2500))];
        CreateShipment::new(OrderId::new(), customer, items, Actor::system())
    }

    async fn delivered_shipment(&self) -> ShipmentId {
        let shipment = self
            .service
            .create_shipment(self.create_command())
            .await
            .unwrap();
        let id = shipment.id();

        self.service
            .mark_prepared(TransitionShipment::new(id, Actor::new("warehouse")))
            .await
            .unwrap();
        self.service
            .mark_in_transit(TransitionShipment::new(id, Actor::new("carrier")))
            .await
            .unwrap();
        self.service
            .mark_delivered(TransitionShipment::new(id, Actor::new("carrier")))
            .await
            .unwrap();
        id
    }
}

#[tokio::test]
async fn lifecycle_scenario_with_guard_rejections() {
    let h = TestHarness::new();

    let shipment = h
        .service
        .create_shipment(h.create_command())
        .await
        .unwrap();
    let id = shipment.id();
    assert_eq!(shipment.status(), ShipmentStatus::Pending);

    h.service
        .mark_prepared(TransitionShipment::new(id, Actor::new("warehouse")))
        .await
        .unwrap();

    // Delivery straight from PREPARED is not a legal transition
    let result = h
        .service
        .mark_delivered(TransitionShipment::new(id, Actor::new("carrier")))
        .await;
    assert!(matches!(
        result,
        Err(RepositoryError::Domain(ShipmentError::InvalidTransition {
            from: ShipmentStatus::Prepared,
            to: ShipmentStatus::Delivered,
        }))
    ));

    h.service
        .mark_in_transit(TransitionShipment::new(id, Actor::new("carrier")))
        .await
        .unwrap();
    let shipment = h
        .service
        .mark_delivered(TransitionShipment::new(id, Actor::new("carrier")))
        .await
        .unwrap();
    assert_eq!(shipment.status(), ShipmentStatus::Delivered);

    // No longer cancellable after carrier handover
    let result = h
        .service
        .cancel_shipment(CancelShipment::new(id, "too late", Actor::new("customer")))
        .await;
    assert!(matches!(
        result,
        Err(RepositoryError::Domain(
            ShipmentError::InvalidTransition { .. }
        ))
    ));

    // The rejected commands appended nothing
    let history = h.log.replay(id).await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn save_load_round_trip_preserves_state() {
    let h = TestHarness::new();
    let id = h.delivered_shipment().await;

    let loaded = h.service.repository().load_by_id(id).await.unwrap();
    assert_eq!(loaded.status(), ShipmentStatus::Delivered);
    assert_eq!(loaded.kind(), ShipmentKind::Normal);
    assert_eq!(loaded.items().len(), 1);
    assert_eq!(loaded.history().len(), 4);

    let view = h.views.get(id).await.unwrap().unwrap();
    assert_eq!(view.status, ShipmentStatus::Delivered);
    assert_eq!(view.tracking.len(), 4);
}

#[tokio::test]
async fn return_flow_publishes_critical_completion() {
    let h = TestHarness::new();
    let id = h.delivered_shipment().await;

    h.service
        .initiate_return(InitiateReturn::new(id, "wrong size", Actor::new("customer")))
        .await
        .unwrap();
    let shipment = h
        .service
        .complete_return(CompleteReturn::new(id, Actor::new("warehouse")).with_note("received"))
        .await
        .unwrap();

    assert_eq!(shipment.status(), ShipmentStatus::Returned);
    assert_eq!(h.bus.published_to("shipment.return-initiated").len(), 1);
    assert_eq!(h.bus.published_to("shipment.return-completed").len(), 1);
}

#[tokio::test]
async fn exchange_scenario_links_both_shipments() {
    let h = TestHarness::new();
    let original_id = h.delivered_shipment().await;

    let (original, replacement) = h
        .service
        .initiate_exchange(InitiateExchange::new(
            original_id,
            "defective",
            Actor::new("customer"),
        ))
        .await
        .unwrap();

    assert_eq!(original.status(), ShipmentStatus::ExchangeProcessed);
    assert_eq!(original.related_shipment_id(), Some(replacement.id()));

    assert_eq!(replacement.kind(), ShipmentKind::Exchange);
    assert_eq!(replacement.status(), ShipmentStatus::Pending);
    assert_eq!(replacement.related_shipment_id(), Some(original_id));
    assert_eq!(replacement.items(), original.items());

    // Two events on the original, one creation event on the replacement
    assert_eq!(h.log.replay(original_id).await.unwrap().len(), 6);
    assert_eq!(h.log.replay(replacement.id()).await.unwrap().len(), 1);

    assert_eq!(h.bus.published_to("shipment.exchange-initiated").len(), 1);
    assert_eq!(h.bus.published_to("shipment.exchange-completed").len(), 1);

    // Both aggregates share the order, so the order view shows two shipments
    let order_views = h.views.by_order(original.order_id()).await.unwrap();
    assert_eq!(order_views.len(), 2);
}

#[tokio::test]
async fn exchange_completion_branches_on_condition() {
    let h = TestHarness::new();
    let original_id = h.delivered_shipment().await;
    h.service
        .initiate_exchange(InitiateExchange::new(
            original_id,
            "defective",
            Actor::new("customer"),
        ))
        .await
        .unwrap();

    let result = h
        .service
        .complete_exchange(CompleteExchange::new(
            original_id,
            ProductCondition::Defective,
            Actor::new("warehouse"),
        ))
        .await;
    assert!(matches!(
        result,
        Err(RepositoryError::Domain(ShipmentError::NotImplemented {
            condition: ProductCondition::Defective
        }))
    ));

    let shipment = h
        .service
        .complete_exchange(
            CompleteExchange::new(original_id, ProductCondition::Good, Actor::new("warehouse"))
                .with_note("resellable"),
        )
        .await
        .unwrap();
    assert_eq!(shipment.status(), ShipmentStatus::ExchangeProcessed);
    assert_eq!(h.bus.published_to("shipment.exchange-finalized").len(), 1);
}

#[tokio::test]
async fn critical_publish_failure_is_recorded_and_surfaced() {
    let h = TestHarness::new();
    let shipment = h
        .service
        .create_shipment(h.create_command())
        .await
        .unwrap();
    let id = shipment.id();

    h.service
        .mark_prepared(TransitionShipment::new(id, Actor::new("warehouse")))
        .await
        .unwrap();
    h.service
        .mark_in_transit(TransitionShipment::new(id, Actor::new("carrier")))
        .await
        .unwrap();

    h.bus.set_fail_on_publish(true);
    let result = h
        .service
        .mark_delivered(TransitionShipment::new(id, Actor::new("carrier")))
        .await;
    assert!(matches!(result, Err(RepositoryError::Messaging(_))));

    // The transition itself persisted, and the lost notification left an
    // audit trail in the log
    let history = h.log.replay(id).await.unwrap();
    let types: Vec<&str> = history.iter().map(|e| e.event_type.as_str()).collect();
    assert!(types.contains(&"ShipmentDelivered"));
    assert_eq!(*types.last().unwrap(), "ErrorRecorded");

    let loaded = h.service.repository().load_by_id(id).await.unwrap();
    assert_eq!(loaded.status(), ShipmentStatus::Delivered);
}

#[tokio::test]
async fn best_effort_publish_failure_does_not_fail_command() {
    let h = TestHarness::new();
    h.bus.set_fail_on_publish(true);

    // Created and state-changed notifications are best-effort
    let shipment = h
        .service
        .create_shipment(h.create_command())
        .await
        .unwrap();
    let prepared = h
        .service
        .mark_prepared(TransitionShipment::new(
            shipment.id(),
            Actor::new("warehouse"),
        ))
        .await
        .unwrap();
    assert_eq!(prepared.status(), ShipmentStatus::Prepared);
}

#[tokio::test]
async fn payment_approved_creates_shipment_once() {
    let h = TestHarness::new();
    let data = PaymentApprovedData {
        order_id: OrderId::new(),
        customer_id: CustomerId::new(),
        customer_name: "Jane Doe".to_string(),
        customer_email: "jane@example.com".to_string(),
        customer_address: "1 Main St".to_string(),
        items: vec![PaymentApprovedItem {
            article_id: "SKU-001".to_string(),
            quantity: 2,
            unit_price_cents: 1000,
        }],
    };

    let created = h.service.handle_payment_approved(&data).await.unwrap();
    let shipment = created.expect("first approval creates a shipment");
    assert_eq!(shipment.order_id(), data.order_id);
    assert_eq!(shipment.status(), ShipmentStatus::Pending);

    // Redelivery is absorbed
    let redelivered = h.service.handle_payment_approved(&data).await.unwrap();
    assert!(redelivered.is_none());
    assert_eq!(h.views.by_order(data.order_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn refund_processed_emits_no_events() {
    let h = TestHarness::new();
    let shipment = h
        .service
        .create_shipment(h.create_command())
        .await
        .unwrap();
    let before = h.log.replay(shipment.id()).await.unwrap().len();

    // Audit-only by design: the refund path inspects and logs, it never
    // appends
    h.service
        .handle_refund_processed(&RefundProcessedData {
            order_id: shipment.order_id(),
        })
        .await
        .unwrap();

    assert_eq!(h.log.replay(shipment.id()).await.unwrap().len(), before);

    // A refund for an unknown order is also not an error
    h.service
        .handle_refund_processed(&RefundProcessedData {
            order_id: OrderId::new(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn worker_retries_inbound_transition_against_moved_on_aggregate() {
    let h = TestHarness::new();
    let data = PaymentApprovedData {
        order_id: OrderId::new(),
        customer_id: CustomerId::new(),
        customer_name: "Jane Doe".to_string(),
        customer_email: "jane@example.com".to_string(),
        customer_address: "1 Main St".to_string(),
        items: vec![PaymentApprovedItem {
            article_id: "SKU-001".to_string(),
            quantity: 1,
            unit_price_cents: 500,
        }],
    };

    let worker = DeliveryWorker::new(Arc::new(h.service.clone()), 2);

    let outcome = worker
        .process(InboundEnvelope::new(InboundNotification::PaymentApproved(
            data.clone(),
        )))
        .await;
    assert!(matches!(outcome, ProcessOutcome::Handled));

    // Redelivered approval is handled (absorbed) rather than failing
    let outcome = worker
        .process(InboundEnvelope::new(InboundNotification::PaymentApproved(
            data,
        )))
        .await;
    assert!(matches!(outcome, ProcessOutcome::Handled));
    assert!(worker.dead_letters().is_empty());
}
