use serde::{Deserialize, Serialize};

use vivalife_products::PharmacyProduct;
use vivalife_storage::{JsonDocuments, KeyValueStore, StorageResult};

/// Point-in-time copy of the pharmacy inventory (`pharmacy_products`).
///
/// An empty snapshot means the storefront runs standalone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventorySnapshot {
    records: Vec<PharmacyProduct>,
}

impl InventorySnapshot {
    pub fn new(records: Vec<PharmacyProduct>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PharmacyProduct] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stock of the first record whose id or SKU is `product_id`.
    pub fn stock_of(&self, product_id: &str) -> Option<u32> {
        self.records
            .iter()
            .find(|r| r.matches(product_id))
            .map(PharmacyProduct::stock)
    }

    /// Read the snapshot under `key`. An absent key is an empty snapshot.
    pub fn load<S>(store: &S, key: &str) -> StorageResult<Self>
    where
        S: KeyValueStore + ?Sized,
    {
        Ok(store.load_json(key)?.unwrap_or_default())
    }

    /// Replace the snapshot under `key`.
    pub fn publish<S>(&self, store: &S, key: &str) -> StorageResult<()>
    where
        S: KeyValueStore + ?Sized,
    {
        store.save_json(key, self)
    }
}

impl FromIterator<PharmacyProduct> for InventorySnapshot {
    fn from_iter<I: IntoIterator<Item = PharmacyProduct>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
