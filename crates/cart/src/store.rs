//! `CartStore`: the cart service the storefront talks to.
//!
//! Each operation reads the facts it needs (catalog entry, current stock),
//! asks the [`Cart`] aggregate to decide, then persists the new snapshot and
//! publishes a display refresh. Rejected or no-change operations touch
//! neither storage nor the display.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;

use vivalife_core::{Aggregate, AggregateRoot, Money, ProductId};
use vivalife_events::{EventBus, Subscription};
use vivalife_inventory::{InventoryOracle, InventorySnapshot};
use vivalife_products::{ProductCatalog, load_catalog};
use vivalife_storage::{JsonDocuments, KeyValueStore};

use crate::cart::{
    AddItem, Cart, CartCommand, CartEvent, CartRejection, ClearCart, ReconcileStock, RemoveItem,
    SetQuantity,
};
use crate::checkout::{Checkout, CheckoutOutcome};
use crate::config::CartConfig;
use crate::error::{CartError, CartResult};
use crate::line_item::LineItem;
use crate::notice::{CartSignal, CartView, NoticeKind, Notifier, StockShortfall};
use crate::summary::OrderSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The product now has `in_cart` units in the cart.
    Added { in_cart: u32 },
    /// Not in the catalog; nothing happened.
    UnknownProduct,
    Rejected(CartRejection),
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamp {
    pub from: u32,
    pub to: u32,
}

/// What a stock reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub withdrawn: Vec<ProductId>,
    pub clamped: Vec<(ProductId, Clamp)>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.withdrawn.is_empty() && self.clamped.is_empty()
    }
}

pub struct CartStore<S, C, O, B> {
    cart: Cart,
    store: S,
    catalog: C,
    oracle: O,
    notifier: Notifier<B>,
    config: CartConfig,
}

impl<S, C, O, B> CartStore<S, C, O, B>
where
    S: KeyValueStore,
    C: ProductCatalog,
    O: InventoryOracle,
    B: EventBus<CartSignal> + 'static,
{
    /// An empty cart; call [`load`](Self::load) to restore the persisted one.
    pub fn new(store: S, catalog: C, oracle: O, bus: Arc<B>, config: CartConfig) -> Self {
        Self {
            cart: Cart::empty(config.cart_key.clone()),
            store,
            catalog,
            oracle,
            notifier: Notifier::new(bus, config.notices),
            config,
        }
    }

    /// `new` followed by `load`.
    pub fn open(store: S, catalog: C, oracle: O, bus: Arc<B>, config: CartConfig) -> CartResult<Self> {
        let mut cart = Self::new(store, catalog, oracle, bus, config);
        cart.load()?;
        Ok(cart)
    }

    /// Runtime that hosts notice dismissal timers.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.notifier = self.notifier.with_runtime(runtime);
        self
    }

    /// Restore the persisted snapshot and publish it for display. An absent
    /// key is an empty cart.
    pub fn load(&mut self) -> CartResult<()> {
        let key = &self.config.cart_key;
        let rows: Vec<LineItem> = self
            .store
            .load_json(key)
            .map_err(|source| CartError::Snapshot {
                key: key.clone(),
                source,
            })?
            .unwrap_or_default();

        self.cart = Cart::restore(key.clone(), rows);
        tracing::info!(cart_key = %key, lines = self.cart.items().len(), "cart loaded");
        self.notifier.refresh(self.view());
        Ok(())
    }

    pub fn subscribe(&self) -> Subscription<CartSignal> {
        self.notifier.bus().subscribe()
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[LineItem] {
        self.cart.items()
    }

    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    pub fn subtotal(&self) -> Money {
        self.cart.subtotal()
    }

    pub fn delivery_fee(&self) -> Money {
        self.config.delivery.fee_for(self.subtotal())
    }

    pub fn total(&self) -> Money {
        self.summary().total
    }

    pub fn summary(&self) -> OrderSummary {
        OrderSummary::of(self.cart.items(), &self.config.delivery)
    }

    /// Add `quantity` units, subject to current stock and the prescription
    /// rule. Refusals come back as [`AddOutcome::Rejected`] with a notice
    /// posted; only storage failures are errors.
    pub fn add_item(&mut self, product_id: &ProductId, quantity: u32) -> CartResult<AddOutcome> {
        let Some(product) = self.catalog.get_product(product_id) else {
            tracing::debug!(product_id = %product_id, "add ignored: product not in catalog");
            return Ok(AddOutcome::UnknownProduct);
        };
        let product_name = product.name.clone();
        let available = self.oracle.stock_of(product_id);

        let command = CartCommand::AddItem(AddItem {
            product,
            quantity,
            available,
            occurred_at: Utc::now(),
        });
        match self.cart.handle(&command) {
            Ok(events) => {
                self.record(&events)?;
                let in_cart = self.cart.quantity_of(product_id);
                tracing::debug!(product_id = %product_id, quantity, in_cart, "item added to cart");
                self.notifier.post(NoticeKind::AddedToCart { product_name });
                Ok(AddOutcome::Added { in_cart })
            }
            Err(rejection) => {
                tracing::warn!(
                    product_id = %product_id,
                    quantity,
                    available,
                    reason = %rejection,
                    "add to cart rejected"
                );
                if let Some(kind) = rejection_notice(&rejection) {
                    self.notifier.post(kind);
                }
                Ok(AddOutcome::Rejected(rejection))
            }
        }
    }

    /// Returns whether the product was in the cart.
    pub fn remove_item(&mut self, product_id: &ProductId) -> CartResult<bool> {
        let events = self.decide(CartCommand::RemoveItem(RemoveItem {
            product_id: product_id.clone(),
            occurred_at: Utc::now(),
        }));
        self.record(&events)
    }

    /// Overwrite the quantity of a line already in the cart; zero or less
    /// removes it. Stock is not re-checked here; [`validate`](Self::validate)
    /// reconciles. Returns whether anything changed.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> CartResult<bool> {
        let events = self.decide(CartCommand::SetQuantity(SetQuantity {
            product_id: product_id.clone(),
            quantity,
            occurred_at: Utc::now(),
        }));
        self.record(&events)
    }

    /// Empty the cart once `confirm` agrees. An empty cart is left alone
    /// without asking.
    pub fn clear(&mut self, confirm: impl FnOnce() -> bool) -> CartResult<bool> {
        if self.cart.is_empty() {
            return Ok(false);
        }
        if !confirm() {
            tracing::debug!("clear cart declined");
            return Ok(false);
        }
        let events = self.decide(CartCommand::ClearCart(ClearCart {
            occurred_at: Utc::now(),
        }));
        self.record(&events)
    }

    /// Gate the hand-off to checkout: the cart must be non-empty and hold no
    /// prescription items.
    pub fn checkout(&self, checkout: &mut impl Checkout) -> CheckoutOutcome {
        if self.cart.is_empty() {
            self.notifier.post(NoticeKind::EmptyCart);
            return CheckoutOutcome::EmptyCart;
        }

        let prescription: Vec<ProductId> = self
            .cart
            .prescription_items()
            .map(|line| line.product_id.clone())
            .collect();
        if !prescription.is_empty() {
            tracing::info!(items = prescription.len(), "checkout blocked by prescription items");
            self.notifier.post(NoticeKind::PrescriptionCheckoutBlocked);
            return CheckoutOutcome::PrescriptionRequired(prescription);
        }

        let summary = self.summary();
        tracing::info!(
            item_count = summary.item_count,
            total = %summary.total,
            "handing cart to checkout"
        );
        checkout.open_checkout(&summary);
        CheckoutOutcome::HandedOff(summary)
    }

    /// Re-check every line against current stock. Lines with no stock are
    /// removed and lines above stock are clamped, each with a notice.
    pub fn validate(&mut self) -> CartResult<Reconciliation> {
        let levels: BTreeMap<ProductId, u32> = self
            .cart
            .items()
            .iter()
            .map(|line| (line.product_id.clone(), self.oracle.stock_of(&line.product_id)))
            .collect();
        let events = self.decide(CartCommand::ReconcileStock(ReconcileStock {
            levels,
            occurred_at: Utc::now(),
        }));
        if !self.record(&events)? {
            return Ok(Reconciliation::default());
        }

        let mut report = Reconciliation::default();
        for event in events {
            match event {
                CartEvent::ItemWithdrawn(e) => {
                    self.notifier.post(NoticeKind::ItemWithdrawn {
                        product_name: e.name,
                    });
                    report.withdrawn.push(e.product_id);
                }
                CartEvent::QuantityClamped(e) => {
                    self.notifier.post(NoticeKind::QuantityReduced {
                        product_name: e.name,
                        available: e.to,
                    });
                    report.clamped.push((e.product_id, Clamp { from: e.from, to: e.to }));
                }
                _ => {}
            }
        }
        tracing::info!(
            withdrawn = report.withdrawn.len(),
            clamped = report.clamped.len(),
            "cart reconciled against stock"
        );
        Ok(report)
    }

    /// Publish a new pharmacy inventory snapshot, rebuild the catalog from
    /// it and reconcile the cart. The oracle must read from the same store
    /// for the new levels to apply.
    pub fn refresh_inventory(&mut self, snapshot: &InventorySnapshot) -> CartResult<Reconciliation> {
        snapshot.publish(&self.store, &self.config.inventory_key)?;
        tracing::debug!(records = snapshot.records().len(), "inventory snapshot published");
        self.catalog.reload(load_catalog(
            &self.store,
            &self.config.inventory_key,
            &self.config.pharmacies_key,
            Utc::now().date_naive(),
        ));
        self.validate()
    }

    fn view(&self) -> CartView {
        CartView {
            items: self.cart.items().to_vec(),
            summary: self.summary(),
        }
    }

    /// Decide a command that cannot be refused.
    fn decide(&self, command: CartCommand) -> Vec<CartEvent> {
        match self.cart.handle(&command) {
            Ok(events) => events,
            Err(rejection) => {
                tracing::warn!(reason = %rejection, "cart command refused");
                Vec::new()
            }
        }
    }

    /// Apply `events`, persist and refresh the display. The in-memory cart
    /// only changes once the snapshot is stored. Returns whether anything
    /// changed.
    fn record(&mut self, events: &[CartEvent]) -> CartResult<bool> {
        if events.is_empty() {
            return Ok(false);
        }

        let mut next = self.cart.clone();
        for event in events {
            next.apply(event);
        }
        self.store.save_json(next.id(), next.items())?;
        self.cart = next;

        self.notifier.refresh(self.view());
        Ok(true)
    }
}

fn rejection_notice(rejection: &CartRejection) -> Option<NoticeKind> {
    match rejection {
        CartRejection::OutOfStock { name, .. } => Some(NoticeKind::StockUnavailable {
            product_name: name.clone(),
            shortfall: StockShortfall::OutOfStock,
        }),
        CartRejection::InsufficientStock {
            name,
            available,
            in_cart,
            ..
        } => Some(NoticeKind::StockUnavailable {
            product_name: name.clone(),
            shortfall: StockShortfall::Limited {
                available: *available,
                in_cart: *in_cart,
            },
        }),
        CartRejection::PrescriptionRequired { name, .. } => Some(NoticeKind::PrescriptionRequired {
            product_name: name.clone(),
        }),
        CartRejection::Invalid(_) => None,
    }
}
