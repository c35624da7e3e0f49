//! Cart configuration.
//!
//! Defaults match the storefront. `from_env` overrides them from `VIVALIFE_*`
//! variables; unparsable values are logged and ignored.

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use vivalife_core::Money;
use vivalife_inventory::{IN_STOCK_SENTINEL, PharmacyStockOracle};
use vivalife_products::ProductCatalog;
use vivalife_storage::KeyValueStore;

use crate::notice::NoticeDelays;
use crate::summary::DeliveryPolicy;

pub const DEFAULT_CART_KEY: &str = "vivalife_cart";
pub const DEFAULT_INVENTORY_KEY: &str = "pharmacy_products";
pub const DEFAULT_PHARMACIES_KEY: &str = "pharmacy_pharmacies";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub cart_key: String,
    pub inventory_key: String,
    pub pharmacies_key: String,
    pub delivery: DeliveryPolicy,
    pub in_stock_sentinel: u32,
    pub notices: NoticeDelays,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            cart_key: DEFAULT_CART_KEY.to_string(),
            inventory_key: DEFAULT_INVENTORY_KEY.to_string(),
            pharmacies_key: DEFAULT_PHARMACIES_KEY.to_string(),
            delivery: DeliveryPolicy::default(),
            in_stock_sentinel: IN_STOCK_SENTINEL,
            notices: NoticeDelays::default(),
        }
    }
}

impl CartConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (`from_env` uses the process
    /// environment).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(key) = lookup("VIVALIFE_CART_KEY") {
            config.cart_key = key;
        }
        if let Some(key) = lookup("VIVALIFE_INVENTORY_KEY") {
            config.inventory_key = key;
        }
        if let Some(key) = lookup("VIVALIFE_PHARMACIES_KEY") {
            config.pharmacies_key = key;
        }
        if let Some(amount) = parse_var(&lookup, "VIVALIFE_FREE_DELIVERY_THRESHOLD", parse_money) {
            config.delivery.free_threshold = amount;
        }
        if let Some(amount) = parse_var(&lookup, "VIVALIFE_DELIVERY_FEE", parse_money) {
            config.delivery.fee = amount;
        }
        if let Some(sentinel) = parse_var(&lookup, "VIVALIFE_IN_STOCK_SENTINEL", |raw| raw.parse().ok()) {
            config.in_stock_sentinel = sentinel;
        }
        if let Some(delay) = parse_var(&lookup, "VIVALIFE_CONFIRMATION_NOTICE_MS", parse_millis) {
            config.notices.confirmation = delay;
        }
        if let Some(delay) = parse_var(&lookup, "VIVALIFE_STOCK_NOTICE_MS", parse_millis) {
            config.notices.stock = delay;
        }

        config
    }

    /// Stock oracle over `store` and `catalog` using this config's inventory
    /// key and sentinel.
    pub fn stock_oracle<S, C>(&self, store: S, catalog: C) -> PharmacyStockOracle<S, C>
    where
        S: KeyValueStore,
        C: ProductCatalog,
    {
        PharmacyStockOracle::new(store, catalog, self.inventory_key.clone())
            .with_in_stock_sentinel(self.in_stock_sentinel)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(name)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!(variable = name, value = %raw, "ignoring unparsable setting; using default");
    }
    parsed
}

fn parse_money(raw: &str) -> Option<Money> {
    Decimal::from_str(raw).ok().and_then(|d| Money::new(d).ok())
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.parse().ok().map(Duration::from_millis)
}
