//! Integration tests for catalog-backed quoting.

use domain::{
    AssemblyFeeSchedule, CartLine, CatalogQuoteService, Ending, MAX_LINE_GRAMS, QuoteError,
    QuoteService,
};
use inventory_store::{InMemoryInventoryStore, InventoryStore, Money, NewSku, SaleMode};

async fn catalog() -> InMemoryInventoryStore {
    let store = InMemoryInventoryStore::new();
    store
        .create_sku(NewSku::bulk(
            "BULK-60-BLOND",
            "Blond 60 cm",
            500,
            Money::from_major(30),
        ))
        .await
        .unwrap();
    store
        .create_sku(NewSku::piece(
            "PIECE-50-DARK",
            "Dark brown 50 cm, 120 g",
            120,
            Money::from_major(25),
        ))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn prices_bulk_lines_by_requested_grams() {
    let service = CatalogQuoteService::new(catalog().await);

    let quote = service
        .quote(&[CartLine::new("BULK-60-BLOND", 80, Ending::None)])
        .await
        .unwrap();

    let line = &quote.items[0];
    assert_eq!(line.grams, 80);
    assert_eq!(line.sale_mode, SaleMode::BulkGrams);
    assert_eq!(line.line_total, Money::from_major(2_400));
    assert_eq!(line.assembly_fee, Money::zero());
    assert_eq!(line.line_grand_total, Money::from_major(2_400));
    assert_eq!(line.snapshot_name, "Blond 60 cm");
    assert_eq!(quote.subtotal, Money::from_major(2_400));
}

#[tokio::test]
async fn pieces_always_quote_their_full_weight() {
    let service = CatalogQuoteService::new(catalog().await);

    let quote = service
        .quote(&[CartLine::new("PIECE-50-DARK", 1, Ending::None)])
        .await
        .unwrap();

    assert_eq!(quote.items[0].grams, 120);
    assert_eq!(quote.items[0].line_total, Money::from_major(3_000));
}

#[tokio::test]
async fn assembly_fee_is_added_per_gram() {
    let fees = AssemblyFeeSchedule {
        keratin: Money::from_major(10),
        ..AssemblyFeeSchedule::default()
    };
    let service = CatalogQuoteService::new(catalog().await).with_fees(fees);

    let quote = service
        .quote(&[
            CartLine::new("BULK-60-BLOND", 50, Ending::Keratin),
            CartLine::new("PIECE-50-DARK", 0, Ending::Tape),
        ])
        .await
        .unwrap();

    assert_eq!(quote.items[0].assembly_fee, Money::from_major(500));
    assert_eq!(quote.items[0].line_grand_total, Money::from_major(2_000));
    assert_eq!(quote.items[1].assembly_fee, Money::from_major(720));
    assert_eq!(
        quote.subtotal,
        Money::from_major(2_000) + Money::from_major(3_000 + 720)
    );
}

#[tokio::test]
async fn unknown_code_fails_the_whole_quote() {
    let service = CatalogQuoteService::new(catalog().await);

    let result = service
        .quote(&[
            CartLine::new("BULK-60-BLOND", 10, Ending::None),
            CartLine::new("NOPE", 10, Ending::None),
        ])
        .await;

    assert!(matches!(result, Err(QuoteError::UnknownSku(code)) if code == "NOPE"));
}

#[tokio::test]
async fn zero_gram_bulk_line_is_rejected() {
    let service = CatalogQuoteService::new(catalog().await);

    let result = service
        .quote(&[CartLine::new("BULK-60-BLOND", 0, Ending::None)])
        .await;

    assert!(matches!(
        result,
        Err(QuoteError::InvalidGrams { line: 0, grams: 0, .. })
    ));
}

#[tokio::test]
async fn quantity_above_line_limit_is_rejected() {
    let service = CatalogQuoteService::new(catalog().await);

    let result = service
        .quote(&[
            CartLine::new("BULK-60-BLOND", MAX_LINE_GRAMS, Ending::None),
            CartLine::new("BULK-60-BLOND", i64::MAX / 2, Ending::Keratin),
        ])
        .await;

    assert!(matches!(
        result,
        Err(QuoteError::InvalidGrams { line: 1, grams, .. }) if grams == i64::MAX / 2
    ));
}

#[tokio::test]
async fn price_that_does_not_fit_is_reported() {
    let store = InMemoryInventoryStore::new();
    store
        .create_sku(NewSku::bulk(
            "BULK-GOLD",
            "Priced by mistake",
            500,
            Money::from_minor(i64::MAX / 100),
        ))
        .await
        .unwrap();
    let service = CatalogQuoteService::new(store);

    let result = service
        .quote(&[CartLine::new("BULK-GOLD", 1_000, Ending::None)])
        .await;

    assert!(matches!(result, Err(QuoteError::AmountOutOfRange)));
}

#[tokio::test]
async fn quoting_ignores_stock_levels() {
    let store = catalog().await;
    store
        .create_sku(NewSku::bulk("BULK-EMPTY", "Sold through", 0, Money::from_major(30)))
        .await
        .unwrap();
    let service = CatalogQuoteService::new(store);

    let quote = service
        .quote(&[CartLine::new("BULK-EMPTY", 40, Ending::None)])
        .await
        .unwrap();

    assert_eq!(quote.items[0].grams, 40);
}
