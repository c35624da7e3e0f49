//! Storefront flows against the file-backed store.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use vivalife_cart::{AddOutcome, CartConfig, CartSignal, CartStore, CheckoutOutcome, NoticeKind, OrderSummary};
use vivalife_core::{Money, ProductId};
use vivalife_events::InMemoryEventBus;
use vivalife_inventory::InventorySnapshot;
use vivalife_products::{CatalogSource, InMemoryCatalog, PharmacyProduct, load_catalog};
use vivalife_storage::{FileStore, KeyValueStore};

fn id(raw: &str) -> ProductId {
    raw.parse().unwrap()
}

fn record(id: &str, name: &str, category: &str, price: u32, stock: i64) -> PharmacyProduct {
    PharmacyProduct {
        id: Some(id.to_string()),
        sku: Some(format!("SKU-{id}")),
        name: Some(name.to_string()),
        price: Some(Money::riyals(price)),
        category: Some(category.to_string()),
        current_stock: Some(stock),
        pharmacy_id: Some("PHARM001".to_string()),
        ..PharmacyProduct::default()
    }
}

type Storefront = CartStore<
    Arc<FileStore>,
    Arc<InMemoryCatalog>,
    vivalife_inventory::PharmacyStockOracle<Arc<FileStore>, Arc<InMemoryCatalog>>,
    InMemoryEventBus<CartSignal>,
>;

fn storefront(store: &Arc<FileStore>, config: &CartConfig) -> Storefront {
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    let catalog = Arc::new(load_catalog(
        &**store,
        &config.inventory_key,
        &config.pharmacies_key,
        today,
    ));
    let oracle = config.stock_oracle(Arc::clone(store), Arc::clone(&catalog));
    CartStore::open(
        Arc::clone(store),
        catalog,
        oracle,
        Arc::new(InMemoryEventBus::new()),
        config.clone(),
    )
    .unwrap()
}

#[test]
fn integrated_cart_survives_restart_and_follows_stock() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let config = CartConfig::default();

    InventorySnapshot::new(vec![
        record("MED-1", "Panadol Extra", "medicines", 20, 6),
        record("MED-2", "Omega 3", "supplements", 60, 10),
        record("MED-3", "Amoxicillin Antibiotic", "medicines", 35, 8),
    ])
    .publish(&*store, &config.inventory_key)
    .unwrap();

    let mut cart = storefront(&store, &config);
    assert!(cart.items().is_empty());

    assert!(cart.add_item(&id("MED-1"), 2).unwrap().is_added());
    assert!(cart.add_item(&id("MED-2"), 1).unwrap().is_added());
    assert!(matches!(
        cart.add_item(&id("MED-3"), 1).unwrap(),
        AddOutcome::Rejected(_)
    ));
    assert!(matches!(
        cart.add_item(&id("PROD001"), 1).unwrap(),
        AddOutcome::UnknownProduct
    ));
    assert_eq!(cart.subtotal(), Money::riyals(100));
    assert_eq!(cart.delivery_fee(), Money::ZERO);

    // Restart: the snapshot on disk brings the same lines back.
    drop(cart);
    let mut cart = storefront(&store, &config);
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.items()[0].product_id, id("MED-1"));

    let report = cart
        .refresh_inventory(&InventorySnapshot::new(vec![
            record("MED-1", "Panadol Extra", "medicines", 20, 1),
            record("MED-2", "Omega 3", "supplements", 60, 0),
        ]))
        .unwrap();
    assert_eq!(report.withdrawn, vec![id("MED-2")]);
    assert_eq!(report.clamped.len(), 1);

    let summary = cart.summary();
    assert_eq!(summary.subtotal, Money::riyals(20));
    assert_eq!(summary.delivery_fee, Money::riyals(15));
    assert_eq!(summary.total, Money::riyals(35));

    let mut handed: Option<OrderSummary> = None;
    let outcome = cart.checkout(&mut |s: &OrderSummary| handed = Some(*s));
    assert_eq!(outcome, CheckoutOutcome::HandedOff(summary));
    assert_eq!(handed, Some(summary));

    let raw = store.get(&config.cart_key).unwrap().unwrap();
    assert!(raw.contains("\"quantity\":1"), "persisted snapshot: {raw}");
}

#[test]
fn empty_store_runs_standalone() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let config = CartConfig::default();
    let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

    let catalog = load_catalog(&*store, &config.inventory_key, &config.pharmacies_key, today);
    assert_eq!(catalog.source(), CatalogSource::Standalone);

    let mut cart = storefront(&store, &config);
    assert_eq!(
        cart.add_item(&id("PROD004"), 3).unwrap(),
        AddOutcome::Added { in_cart: 3 }
    );
    assert_eq!(cart.total(), Money::riyals(195));
}

#[tokio::test(start_paused = true)]
async fn notices_dismiss_on_their_own_clocks() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let config = CartConfig::default();
    InventorySnapshot::new(vec![record("MED-1", "Panadol Extra", "medicines", 20, 1)])
        .publish(&*store, &config.inventory_key)
        .unwrap();

    let mut cart = storefront(&store, &config);
    let signals = cart.subscribe();

    cart.add_item(&id("MED-1"), 1).unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    cart.add_item(&id("MED-1"), 1).unwrap();

    let mut posted = Vec::new();
    for signal in signals.drain() {
        if let CartSignal::Posted(notice) = signal {
            posted.push(notice);
        }
    }
    assert_eq!(posted.len(), 2);
    assert!(matches!(posted[0].kind, NoticeKind::AddedToCart { .. }));
    assert!(matches!(posted[1].kind, NoticeKind::StockUnavailable { .. }));

    // Confirmation posted at t=0 goes at t=3; the stock notice posted at
    // t=1 stays until t=6.
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(signals.drain(), vec![CartSignal::Dismissed(posted[0].id)]);

    tokio::time::sleep(Duration::from_millis(2_000)).await;
    assert!(signals.drain().is_empty());

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(signals.drain(), vec![CartSignal::Dismissed(posted[1].id)]);
}
