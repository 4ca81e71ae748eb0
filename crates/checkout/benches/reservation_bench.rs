use checkout::{OrderDraft, StockReservationTransactor, reservation::reserve};
use chrono::Utc;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{CartLine, CatalogQuoteService, Ending, QuoteService, ShippingRates};
use inventory_store::{
    DeliveryMethod, InMemoryInventoryStore, InventoryStore, Money, NewSku, ShippingInfo,
};

fn shipping() -> ShippingInfo {
    ShippingInfo {
        name: "Jana".to_string(),
        phone: None,
        street: String::new(),
        city: String::new(),
        postal_code: String::new(),
        country: "CZ".to_string(),
        delivery_method: DeliveryMethod::PersonalPickup,
        pickup_point: None,
    }
}

async fn draft_with_lines(store: &InMemoryInventoryStore, lines: usize) -> OrderDraft {
    let mut cart = Vec::with_capacity(lines);
    for i in 0..lines {
        let code = format!("BULK-{i}");
        store
            .create_sku(NewSku::bulk(&code, "Blond 60 cm", i64::MAX / 2, Money::from_major(30)))
            .await
            .unwrap();
        cart.push(CartLine::new(code, 10, Ending::Keratin));
    }
    let quote = CatalogQuoteService::new(store.clone())
        .quote(&cart)
        .await
        .unwrap();
    OrderDraft::new(
        "jana@example.cz".to_string(),
        shipping(),
        quote,
        &ShippingRates::default(),
    )
}

fn bench_reserve_line(c: &mut Criterion) {
    let sku = NewSku::bulk("X", "Blond 60 cm", 10_000, Money::from_major(30)).into_sku(Utc::now());

    c.bench_function("reservation/reserve_bulk_line", |b| {
        b.iter(|| reserve(&sku, 80).unwrap());
    });
}

fn bench_place_order(c: &mut Criterion, lines: usize) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryInventoryStore::new();
    let draft = rt.block_on(draft_with_lines(&store, lines));
    let transactor = StockReservationTransactor::new(store);

    c.bench_function(&format!("reservation/place_order_{lines}_lines"), |b| {
        b.iter(|| {
            rt.block_on(async {
                transactor.place_order(draft.clone()).await.unwrap();
            });
        });
    });
}

fn bench_place_order_1(c: &mut Criterion) {
    bench_place_order(c, 1);
}

fn bench_place_order_10(c: &mut Criterion) {
    bench_place_order(c, 10);
}

criterion_group!(
    benches,
    bench_reserve_line,
    bench_place_order_1,
    bench_place_order_10
);
criterion_main!(benches);
