use std::collections::BTreeMap;
use std::sync::Arc;

use vivalife_core::ProductId;
use vivalife_products::{DeclaredStock, ProductCatalog};
use vivalife_storage::KeyValueStore;

use crate::snapshot::InventorySnapshot;

/// Quantity reported for catalog products that only carry an in-stock flag.
pub const IN_STOCK_SENTINEL: u32 = 999;

/// Current-stock collaborator consulted before the cart mutates.
pub trait InventoryOracle {
    /// Units of `product_id` available right now. Never fails; unknown
    /// products and lookup faults report zero.
    fn stock_of(&self, product_id: &ProductId) -> u32;
}

impl<O> InventoryOracle for &O
where
    O: InventoryOracle + ?Sized,
{
    fn stock_of(&self, product_id: &ProductId) -> u32 {
        (**self).stock_of(product_id)
    }
}

impl<O> InventoryOracle for Arc<O>
where
    O: InventoryOracle + ?Sized,
{
    fn stock_of(&self, product_id: &ProductId) -> u32 {
        (**self).stock_of(product_id)
    }
}

/// Fixed stock levels; products not in the map have none.
impl InventoryOracle for BTreeMap<ProductId, u32> {
    fn stock_of(&self, product_id: &ProductId) -> u32 {
        self.get(product_id).copied().unwrap_or(0)
    }
}

/// Which source answered a stock lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockSource {
    /// The pharmacy inventory snapshot.
    Integrated,
    /// The product catalog.
    Standalone,
    /// The snapshot could not be read.
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockReading {
    pub source: StockSource,
    pub available: u32,
}

/// Oracle that reads the pharmacy snapshot from the key-value store on every
/// lookup and falls back to the catalog when the snapshot is empty.
///
/// Reading on every lookup means a snapshot published by the pharmacy system
/// is seen by the very next cart operation.
#[derive(Debug, Clone)]
pub struct PharmacyStockOracle<S, C> {
    store: S,
    catalog: C,
    inventory_key: String,
    in_stock_sentinel: u32,
}

impl<S, C> PharmacyStockOracle<S, C>
where
    S: KeyValueStore,
    C: ProductCatalog,
{
    pub fn new(store: S, catalog: C, inventory_key: impl Into<String>) -> Self {
        Self {
            store,
            catalog,
            inventory_key: inventory_key.into(),
            in_stock_sentinel: IN_STOCK_SENTINEL,
        }
    }

    pub fn with_in_stock_sentinel(mut self, sentinel: u32) -> Self {
        self.in_stock_sentinel = sentinel;
        self
    }

    pub fn inventory_key(&self) -> &str {
        &self.inventory_key
    }

    /// Resolve stock and report where the answer came from.
    pub fn read(&self, product_id: &ProductId) -> StockReading {
        match InventorySnapshot::load(&self.store, &self.inventory_key) {
            Ok(snapshot) if !snapshot.is_empty() => StockReading {
                source: StockSource::Integrated,
                available: snapshot.stock_of(product_id.as_str()).unwrap_or(0),
            },
            Ok(_) => StockReading {
                source: StockSource::Standalone,
                available: self.catalog_stock(product_id),
            },
            Err(err) => {
                tracing::warn!(
                    product_id = %product_id,
                    error = %err,
                    "could not check stock; treating as unavailable"
                );
                StockReading {
                    source: StockSource::Fault,
                    available: 0,
                }
            }
        }
    }

    fn catalog_stock(&self, product_id: &ProductId) -> u32 {
        match self.catalog.get_product(product_id).map(|p| p.declared_stock()) {
            // Count(0) is sold out; the sentinel only covers flag-only entries.
            Some(DeclaredStock::Count(count)) => count,
            Some(DeclaredStock::InStock) => self.in_stock_sentinel,
            Some(DeclaredStock::OutOfStock) | None => 0,
        }
    }
}

impl<S, C> InventoryOracle for PharmacyStockOracle<S, C>
where
    S: KeyValueStore,
    C: ProductCatalog,
{
    fn stock_of(&self, product_id: &ProductId) -> u32 {
        self.read(product_id).available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vivalife_products::{InMemoryCatalog, PharmacyProduct};
    use vivalife_storage::{InMemoryStore, JsonDocuments};

    const KEY: &str = "pharmacy_products";

    fn id(raw: &str) -> ProductId {
        raw.parse().unwrap()
    }

    fn oracle(store: Arc<InMemoryStore>) -> PharmacyStockOracle<Arc<InMemoryStore>, InMemoryCatalog> {
        PharmacyStockOracle::new(store, InMemoryCatalog::standalone(), KEY)
    }

    fn publish(store: &InMemoryStore, rows: Vec<PharmacyProduct>) {
        InventorySnapshot::new(rows).publish(store, KEY).unwrap();
    }

    #[test]
    fn integrated_snapshot_is_looked_up_by_id_or_sku() {
        let store = Arc::new(InMemoryStore::new());
        publish(
            &store,
            vec![PharmacyProduct {
                id: Some("MED-1".to_string()),
                sku: Some("PAR500".to_string()),
                current_stock: Some(7),
                ..PharmacyProduct::default()
            }],
        );
        let oracle = oracle(store);

        assert_eq!(oracle.stock_of(&id("MED-1")), 7);
        assert_eq!(oracle.stock_of(&id("PAR500")), 7);
        let reading = oracle.read(&id("PROD001"));
        assert_eq!(reading.source, StockSource::Integrated);
        assert_eq!(reading.available, 0, "sample catalog is ignored in integrated mode");
    }

    #[test]
    fn standalone_uses_explicit_count_then_sentinel() {
        let oracle = oracle(Arc::new(InMemoryStore::new()));

        assert_eq!(oracle.stock_of(&id("PROD001")), 50);
        assert_eq!(oracle.stock_of(&id("PROD004")), IN_STOCK_SENTINEL);
        assert_eq!(oracle.stock_of(&id("NOPE")), 0);
        assert_eq!(oracle.read(&id("PROD001")).source, StockSource::Standalone);
    }

    #[test]
    fn empty_snapshot_array_means_standalone() {
        let store = Arc::new(InMemoryStore::new());
        store.save_json(KEY, &Vec::<PharmacyProduct>::new()).unwrap();
        let oracle = oracle(store);
        assert_eq!(oracle.read(&id("PROD002")).source, StockSource::Standalone);
        assert_eq!(oracle.stock_of(&id("PROD002")), 30);
    }

    #[test]
    fn malformed_snapshot_fails_safe_to_zero() {
        let store = Arc::new(InMemoryStore::new());
        store.set(KEY, "{\"oops\":").unwrap();
        let oracle = oracle(store);

        let reading = oracle.read(&id("PROD001"));
        assert_eq!(reading.source, StockSource::Fault);
        assert_eq!(reading.available, 0);
    }

    #[test]
    fn sentinel_is_configurable() {
        let oracle = oracle(Arc::new(InMemoryStore::new())).with_in_stock_sentinel(10);
        assert_eq!(oracle.stock_of(&id("PROD005")), 10);
    }

    #[test]
    fn fixed_levels_default_to_zero() {
        let levels = BTreeMap::from([(id("P1"), 5)]);
        assert_eq!(levels.stock_of(&id("P1")), 5);
        assert_eq!(levels.stock_of(&id("P2")), 0);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: integrated lookups report exactly the record's
            /// clamped stock, whatever the raw value.
            #[test]
            fn integrated_stock_matches_clamped_record(raw in -1_000i64..1_000_000) {
                let store = Arc::new(InMemoryStore::new());
                publish(&store, vec![PharmacyProduct {
                    id: Some("MED-1".to_string()),
                    current_stock: Some(raw),
                    ..PharmacyProduct::default()
                }]);
                let expected = raw.max(0) as u32;
                prop_assert_eq!(oracle(store).stock_of(&id("MED-1")), expected);
            }
        }
    }
}
