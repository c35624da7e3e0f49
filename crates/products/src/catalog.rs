use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use vivalife_core::ProductId;
use vivalife_storage::{JsonDocuments, KeyValueStore, StorageResult};

use crate::pharmacy::{DEFAULT_PHARMACY_ID, Pharmacy, PharmacyProduct};
use crate::product::{Product, ProductCategory};
use crate::sample::sample_catalog;

/// Product lookup collaborator.
pub trait ProductCatalog {
    fn get_product(&self, id: &ProductId) -> Option<Product>;

    /// Every listed product, in display order.
    fn products(&self) -> Vec<Product>;

    /// Listed products in `category` (any when `None`) whose name or
    /// description contains `term`, ignoring case. A blank term matches all.
    fn search(&self, category: Option<ProductCategory>, term: &str) -> Vec<Product> {
        let term = term.trim().to_lowercase();
        self.products()
            .into_iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| {
                term.is_empty()
                    || p.name.to_lowercase().contains(&term)
                    || p.description.to_lowercase().contains(&term)
            })
            .collect()
    }

    /// Swap in a freshly loaded listing. Fixed catalogs keep their own.
    fn reload(&self, _fresh: InMemoryCatalog) {}
}

impl<C> ProductCatalog for Arc<C>
where
    C: ProductCatalog + ?Sized,
{
    fn get_product(&self, id: &ProductId) -> Option<Product> {
        (**self).get_product(id)
    }

    fn products(&self) -> Vec<Product> {
        (**self).products()
    }

    fn search(&self, category: Option<ProductCategory>, term: &str) -> Vec<Product> {
        (**self).search(category, term)
    }

    fn reload(&self, fresh: InMemoryCatalog) {
        (**self).reload(fresh)
    }
}

impl<C> ProductCatalog for &C
where
    C: ProductCatalog + ?Sized,
{
    fn get_product(&self, id: &ProductId) -> Option<Product> {
        (**self).get_product(id)
    }

    fn products(&self) -> Vec<Product> {
        (**self).products()
    }

    fn search(&self, category: Option<ProductCategory>, term: &str) -> Vec<Product> {
        (**self).search(category, term)
    }

    fn reload(&self, fresh: InMemoryCatalog) {
        (**self).reload(fresh)
    }
}

/// Where the listed products came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    /// Built from the pharmacy system's inventory snapshot.
    Integrated,
    /// The built-in sample catalog.
    Standalone,
}

/// Catalog held in memory. Shared handles see a [`reload`](ProductCatalog::reload)
/// at once.
#[derive(Debug)]
pub struct InMemoryCatalog {
    listing: RwLock<Listing>,
}

#[derive(Debug, Clone)]
struct Listing {
    source: CatalogSource,
    products: Vec<Product>,
}

impl InMemoryCatalog {
    pub fn new(source: CatalogSource, products: Vec<Product>) -> Self {
        Self {
            listing: RwLock::new(Listing { source, products }),
        }
    }

    pub fn standalone() -> Self {
        Self::new(CatalogSource::Standalone, sample_catalog())
    }

    /// Build the integrated catalog: rows of `pharmacy_id` that are in stock
    /// and suitable for online sale.
    pub fn integrated(records: &[PharmacyProduct], pharmacy_id: &str, today: NaiveDate) -> Self {
        let products = records
            .iter()
            .filter(|r| r.pharmacy_id.as_deref() == Some(pharmacy_id))
            .filter(|r| r.stock() > 0)
            .filter(|r| r.is_suitable_for_online_sale())
            .filter_map(|r| r.to_catalog_product(today))
            .collect();
        Self::new(CatalogSource::Integrated, products)
    }

    pub fn source(&self) -> CatalogSource {
        self.read().source
    }

    pub fn len(&self) -> usize {
        self.read().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().products.is_empty()
    }

    // Listings are swapped whole, so a poisoned lock still holds a complete one.
    fn read(&self) -> RwLockReadGuard<'_, Listing> {
        self.listing.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Listing> {
        self.listing.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn into_listing(self) -> Listing {
        self.listing.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clone for InMemoryCatalog {
    fn clone(&self) -> Self {
        let listing = self.read().clone();
        Self {
            listing: RwLock::new(listing),
        }
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.read().products.iter().find(|p| &p.id == id).cloned()
    }

    fn products(&self) -> Vec<Product> {
        self.read().products.clone()
    }

    fn reload(&self, fresh: InMemoryCatalog) {
        let fresh = fresh.into_listing();
        tracing::debug!(products = fresh.products.len(), source = ?fresh.source, "catalog reloaded");
        *self.write() = fresh;
    }
}

/// Load the storefront catalog from the store.
///
/// Uses the pharmacy inventory under `inventory_key` (first pharmacy listed
/// under `pharmacies_key`, else [`DEFAULT_PHARMACY_ID`]). Falls back to the
/// sample catalog when that yields nothing or cannot be read.
pub fn load_catalog<S>(
    store: &S,
    inventory_key: &str,
    pharmacies_key: &str,
    today: NaiveDate,
) -> InMemoryCatalog
where
    S: KeyValueStore + ?Sized,
{
    match load_integrated(store, inventory_key, pharmacies_key, today) {
        Ok(Some(catalog)) if !catalog.is_empty() => {
            tracing::info!(
                products = catalog.len(),
                "loaded products from pharmacy inventory (integrated mode)"
            );
            catalog
        }
        Ok(_) => {
            tracing::info!("no pharmacy data found; running in standalone mode");
            InMemoryCatalog::standalone()
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not load pharmacy inventory; running in standalone mode");
            InMemoryCatalog::standalone()
        }
    }
}

fn load_integrated<S>(
    store: &S,
    inventory_key: &str,
    pharmacies_key: &str,
    today: NaiveDate,
) -> StorageResult<Option<InMemoryCatalog>>
where
    S: KeyValueStore + ?Sized,
{
    let records: Vec<PharmacyProduct> = store.load_json(inventory_key)?.unwrap_or_default();
    if records.is_empty() {
        return Ok(None);
    }

    let pharmacies: Vec<Pharmacy> = store.load_json(pharmacies_key)?.unwrap_or_default();
    let pharmacy_id = pharmacies
        .first()
        .map(|p| p.id.as_str())
        .unwrap_or(DEFAULT_PHARMACY_ID);

    Ok(Some(InMemoryCatalog::integrated(&records, pharmacy_id, today)))
}
