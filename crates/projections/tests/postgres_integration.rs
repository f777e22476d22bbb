//! PostgreSQL integration tests for the projection store.
//!
//! These tests share one PostgreSQL container. Run with:
//!
//! ```bash
//! cargo test -p projections --test postgres_integration
//! ```

use std::sync::Arc;

use common::{CustomerId, OrderId, ShipmentId};
use domain::{Actor, CustomerInfo, LineItem, Money, Shipment, ShipmentStatus};
use projections::{PostgresProjectionStore, ProjectionStore, ShipmentView};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/0002_create_shipment_views.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> PostgresProjectionStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE shipment_views")
        .execute(&pool)
        .await
        .unwrap();

    PostgresProjectionStore::new(pool)
}

fn shipment_for(order_id: OrderId, customer_id: CustomerId) -> Shipment {
    let customer = CustomerInfo::new(customer_id, "Jane Doe", "jane@example.com", "1 Main St");
    let items = vec![LineItem::new("SKU-001", 2, Money::from_cents(1000))];
    Shipment::create(order_id, customer, items, Actor::system(), "").unwrap()
}

#[tokio::test]
#[serial]
async fn upsert_and_get_round_trip() {
    let store = get_test_store().await;
    let shipment = shipment_for(OrderId::new(), CustomerId::new());
    let view = ShipmentView::from(&shipment);

    store.upsert(&view).await.unwrap();

    let fetched = store.get(shipment.id()).await.unwrap().unwrap();
    assert_eq!(fetched.shipment_id, shipment.id());
    assert_eq!(fetched.status, ShipmentStatus::Pending);
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.tracking.len(), 1);
}

#[tokio::test]
#[serial]
async fn upsert_replaces_full_record() {
    let store = get_test_store().await;
    let mut shipment = shipment_for(OrderId::new(), CustomerId::new());

    store.upsert(&ShipmentView::from(&shipment)).await.unwrap();
    shipment.mark_prepared(Actor::new("warehouse"), "packed").unwrap();
    store.upsert(&ShipmentView::from(&shipment)).await.unwrap();

    let fetched = store.get(shipment.id()).await.unwrap().unwrap();
    assert_eq!(fetched.status, ShipmentStatus::Prepared);
    assert_eq!(fetched.tracking.len(), 2);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn get_unknown_returns_none() {
    let store = get_test_store().await;
    assert!(store.get(ShipmentId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn indexed_filters() {
    let store = get_test_store().await;
    let order_id = OrderId::new();
    let customer_id = CustomerId::new();

    let first = shipment_for(order_id, customer_id);
    let mut second = shipment_for(order_id, customer_id);
    second.mark_prepared(Actor::new("warehouse"), "").unwrap();
    let other = shipment_for(OrderId::new(), CustomerId::new());

    for shipment in [&first, &second, &other] {
        store.upsert(&ShipmentView::from(shipment)).await.unwrap();
    }

    assert_eq!(store.by_order(order_id).await.unwrap().len(), 2);
    assert_eq!(store.by_customer(customer_id).await.unwrap().len(), 2);

    let prepared = store.by_status(ShipmentStatus::Prepared).await.unwrap();
    assert_eq!(prepared.len(), 1);
    assert_eq!(prepared[0].shipment_id, second.id());

    assert_eq!(store.count().await.unwrap(), 3);
    assert_eq!(
        store.count_by_status(ShipmentStatus::Pending).await.unwrap(),
        2
    );
}

#[tokio::test]
#[serial]
async fn list_pages_newest_first() {
    let store = get_test_store().await;

    for _ in 0..5 {
        let shipment = shipment_for(OrderId::new(), CustomerId::new());
        store.upsert(&ShipmentView::from(&shipment)).await.unwrap();
    }

    let page = store.list(2, 0).await.unwrap();
    assert_eq!(page.views.len(), 2);
    assert_eq!(page.total, 5);
    assert!(page.views[0].updated_at >= page.views[1].updated_at);

    let rest = store.list(10, 4).await.unwrap();
    assert_eq!(rest.views.len(), 1);
}

#[tokio::test]
#[serial]
async fn clear_wipes_everything() {
    let store = get_test_store().await;
    let shipment = shipment_for(OrderId::new(), CustomerId::new());
    store.upsert(&ShipmentView::from(&shipment)).await.unwrap();

    store.clear().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(store.get(shipment.id()).await.unwrap().is_none());
}
