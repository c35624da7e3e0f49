//! Product catalog for the storefront.
//!
//! The catalog comes from one of two places: the pharmacy system's inventory
//! snapshot (integrated mode) or a fixed sample catalog (standalone mode).
//! Product records are read models; nothing here mutates stock.

pub mod catalog;
pub mod pharmacy;
pub mod product;
pub mod sample;

pub use catalog::{CatalogSource, InMemoryCatalog, ProductCatalog, load_catalog};
pub use pharmacy::{DEFAULT_PHARMACY_ID, Pharmacy, PharmacyProduct};
pub use product::{DeclaredStock, Product, ProductCategory};
pub use sample::sample_catalog;
