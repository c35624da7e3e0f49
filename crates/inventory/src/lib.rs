//! Stock levels for the storefront.
//!
//! Answers one question, "how many of this product can be sold right now",
//! from the pharmacy inventory snapshot when there is one and from the
//! product catalog otherwise. Lookups fail safe: a fault reads as no stock.

pub mod oracle;
pub mod snapshot;

pub use oracle::{IN_STOCK_SENTINEL, InventoryOracle, PharmacyStockOracle, StockReading, StockSource};
pub use snapshot::InventorySnapshot;
