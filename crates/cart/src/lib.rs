//! `vivalife-cart`: the storefront shopping cart.
//!
//! [`Cart`] holds the business rules (stock limits, prescription gate,
//! reconciliation) as a pure aggregate. [`CartStore`] wires it to the
//! catalog, the stock oracle, the key-value store and the display bus.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod line_item;
pub mod notice;
pub mod store;
pub mod summary;

pub use cart::{
    AddItem, Cart, CartCleared, CartCommand, CartEvent, CartRejection, ClearCart, ItemAdded,
    ItemRemoved, ItemWithdrawn, QuantityClamped, QuantitySet, ReconcileStock, RemoveItem,
    SetQuantity,
};
pub use checkout::{Checkout, CheckoutOutcome};
pub use config::CartConfig;
pub use error::{CartError, CartResult};
pub use line_item::LineItem;
pub use notice::{CartSignal, CartView, Notice, NoticeDelays, NoticeId, NoticeKind, Notifier, StockShortfall};
pub use store::{AddOutcome, CartStore, Clamp, Reconciliation};
pub use summary::{DeliveryPolicy, OrderSummary};
