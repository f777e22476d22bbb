use common::{CustomerId, OrderId, ShipmentId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Actor, CustomerInfo, LineItem, Money, Shipment};

fn customer() -> CustomerInfo {
    CustomerInfo::new(CustomerId::new(), "Bench Customer", "bench@example.com", "1 Bench St")
}

fn items() -> Vec<LineItem> {
    vec![LineItem::new("SKU-BENCH", 2, Money::from_cents(1000))]
}

fn bench_create_shipment(c: &mut Criterion) {
    c.bench_function("domain/create_shipment", |b| {
        b.iter(|| {
            Shipment::create(OrderId::new(), customer(), items(), Actor::system(), "").unwrap()
        });
    });
}

fn bench_full_lifecycle(c: &mut Criterion) {
    c.bench_function("domain/full_lifecycle_to_returned", |b| {
        b.iter(|| {
            let mut shipment =
                Shipment::create(OrderId::new(), customer(), items(), Actor::system(), "")
                    .unwrap();
            shipment.mark_prepared(Actor::new("warehouse"), "").unwrap();
            shipment.mark_in_transit(Actor::new("carrier"), "").unwrap();
            shipment.mark_delivered(Actor::new("carrier"), "").unwrap();
            shipment
                .initiate_return("wrong size", Actor::new("customer"))
                .unwrap();
            shipment
                .complete_return("received", Actor::new("warehouse"))
                .unwrap();
            shipment
        });
    });
}

fn bench_replay(c: &mut Criterion) {
    let mut shipment =
        Shipment::create(OrderId::new(), customer(), items(), Actor::system(), "").unwrap();
    shipment.mark_prepared(Actor::new("warehouse"), "").unwrap();
    shipment.mark_in_transit(Actor::new("carrier"), "").unwrap();
    shipment.mark_delivered(Actor::new("carrier"), "").unwrap();
    shipment
        .initiate_exchange(ShipmentId::new(), "defective", Actor::new("customer"))
        .unwrap();
    let events = shipment.take_pending_events();

    c.bench_function("domain/replay_exchange_history", |b| {
        b.iter(|| Shipment::from_events(events.clone()).unwrap());
    });
}

criterion_group!(
    benches,
    bench_create_shipment,
    bench_full_lifecycle,
    bench_replay
);
criterion_main!(benches);
