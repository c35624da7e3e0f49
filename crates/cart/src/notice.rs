//! Shopper-facing notices and the display signal stream.
//!
//! Everything the storefront renders arrives as a [`CartSignal`] on an
//! [`EventBus`]. Transient notices are followed by a `Dismissed` signal once
//! their display time runs out; the timer is a detached runtime task so the
//! cart never waits on it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use uuid::Uuid;

use vivalife_events::EventBus;

use crate::line_item::LineItem;
use crate::summary::OrderSummary;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoticeId(Uuid);

impl NoticeId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for NoticeId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for NoticeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Why an add could not be satisfied from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StockShortfall {
    OutOfStock,
    Limited { available: u32, in_cart: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    AddedToCart { product_name: String },
    StockUnavailable { product_name: String, shortfall: StockShortfall },
    /// Stock ran out while the item sat in the cart.
    ItemWithdrawn { product_name: String },
    QuantityReduced { product_name: String, available: u32 },
    PrescriptionRequired { product_name: String },
    EmptyCart,
    PrescriptionCheckoutBlocked,
}

impl NoticeKind {
    /// Text shown to the shopper.
    pub fn message(&self) -> String {
        match self {
            NoticeKind::AddedToCart { product_name } => format!("{product_name} added to cart!"),
            NoticeKind::StockUnavailable { shortfall, .. } => match shortfall {
                StockShortfall::OutOfStock => "This item is currently out of stock.".to_string(),
                StockShortfall::Limited { available, in_cart } if *in_cart > 0 => format!(
                    "Only {available} items available. You already have {in_cart} in your cart."
                ),
                StockShortfall::Limited { available, .. } => {
                    format!("Only {available} items available.")
                }
            },
            NoticeKind::ItemWithdrawn { product_name } => format!(
                "{product_name} is no longer available and has been removed from your cart."
            ),
            NoticeKind::QuantityReduced {
                product_name,
                available,
            } => format!("{product_name}: quantity reduced to {available} (maximum available)."),
            NoticeKind::PrescriptionRequired { product_name } => format!(
                "{product_name} requires a prescription. Please consult with our pharmacist \
                 or upload your prescription."
            ),
            NoticeKind::EmptyCart => "Your cart is empty!".to_string(),
            NoticeKind::PrescriptionCheckoutBlocked => {
                "Please upload prescriptions for prescription items before checkout.".to_string()
            }
        }
    }

    /// Blocking notices stay up until the shopper acknowledges them.
    pub fn is_modal(&self) -> bool {
        matches!(
            self,
            NoticeKind::PrescriptionRequired { .. }
                | NoticeKind::EmptyCart
                | NoticeKind::PrescriptionCheckoutBlocked
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub posted_at: DateTime<Utc>,
}

impl Notice {
    pub fn message(&self) -> String {
        self.kind.message()
    }
}

/// What the storefront renders after a cart change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub summary: OrderSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartSignal {
    /// Cart contents changed; re-render the badge, lines and summary.
    Refreshed(CartView),
    Posted(Notice),
    /// A transient notice's display time ran out.
    Dismissed(NoticeId),
}

/// Display times for transient notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeDelays {
    /// "Added to cart" confirmations.
    pub confirmation: Duration,
    /// Stock problems.
    pub stock: Duration,
}

impl NoticeDelays {
    /// `None` for modal notices, which are never auto-dismissed.
    pub fn for_kind(&self, kind: &NoticeKind) -> Option<Duration> {
        match kind {
            NoticeKind::AddedToCart { .. } => Some(self.confirmation),
            NoticeKind::StockUnavailable { .. }
            | NoticeKind::ItemWithdrawn { .. }
            | NoticeKind::QuantityReduced { .. } => Some(self.stock),
            NoticeKind::PrescriptionRequired { .. }
            | NoticeKind::EmptyCart
            | NoticeKind::PrescriptionCheckoutBlocked => None,
        }
    }
}

impl Default for NoticeDelays {
    fn default() -> Self {
        Self {
            confirmation: Duration::from_secs(3),
            stock: Duration::from_secs(5),
        }
    }
}

/// Publishes display signals and schedules notice dismissal.
pub struct Notifier<B> {
    bus: Arc<B>,
    runtime: Option<Handle>,
    delays: NoticeDelays,
}

impl<B> Notifier<B>
where
    B: EventBus<CartSignal> + 'static,
{
    /// Picks up the ambient tokio runtime, if any. Without one, transient
    /// notices are posted but never dismissed.
    pub fn new(bus: Arc<B>, delays: NoticeDelays) -> Self {
        Self {
            bus,
            runtime: Handle::try_current().ok(),
            delays,
        }
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn bus(&self) -> &Arc<B> {
        &self.bus
    }

    pub fn post(&self, kind: NoticeKind) -> NoticeId {
        let notice = Notice {
            id: NoticeId::new(),
            kind,
            posted_at: Utc::now(),
        };
        let id = notice.id;
        let delay = self.delays.for_kind(&notice.kind);

        tracing::debug!(notice_id = %id, message = %notice.message(), "posting notice");
        self.send(CartSignal::Posted(notice));

        if let Some(delay) = delay {
            self.schedule_dismissal(id, delay);
        }
        id
    }

    pub fn refresh(&self, view: CartView) {
        self.send(CartSignal::Refreshed(view));
    }

    fn schedule_dismissal(&self, id: NoticeId, delay: Duration) {
        let Some(runtime) = &self.runtime else {
            tracing::debug!(notice_id = %id, "no runtime; notice will not auto-dismiss");
            return;
        };
        let bus = Arc::clone(&self.bus);
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(err) = bus.publish(CartSignal::Dismissed(id)) {
                tracing::warn!(notice_id = %id, error = ?err, "failed to dismiss notice");
            }
        });
    }

    fn send(&self, signal: CartSignal) {
        if let Err(err) = self.bus.publish(signal) {
            tracing::warn!(error = ?err, "failed to publish cart signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vivalife_events::InMemoryEventBus;

    fn notifier() -> (Notifier<InMemoryEventBus<CartSignal>>, vivalife_events::Subscription<CartSignal>) {
        let bus = Arc::new(InMemoryEventBus::new());
        let sub = bus.subscribe();
        (Notifier::new(bus, NoticeDelays::default()), sub)
    }

    fn added(name: &str) -> NoticeKind {
        NoticeKind::AddedToCart {
            product_name: name.to_string(),
        }
    }

    #[test]
    fn messages_match_storefront_wording() {
        assert_eq!(added("Paracetamol 500mg").message(), "Paracetamol 500mg added to cart!");
        let limited = NoticeKind::StockUnavailable {
            product_name: "Ibuprofen 400mg".to_string(),
            shortfall: StockShortfall::Limited { available: 5, in_cart: 4 },
        };
        assert_eq!(
            limited.message(),
            "Only 5 items available. You already have 4 in your cart."
        );
        assert!(NoticeKind::EmptyCart.is_modal());
        assert!(!limited.is_modal());
    }

    #[test]
    fn modal_notices_have_no_display_time() {
        let delays = NoticeDelays::default();
        assert_eq!(delays.for_kind(&added("x")), Some(Duration::from_secs(3)));
        assert_eq!(delays.for_kind(&NoticeKind::PrescriptionCheckoutBlocked), None);
    }

    #[test]
    fn without_runtime_notice_is_posted_but_never_dismissed() {
        let (notifier, sub) = notifier();
        let id = notifier.post(added("Paracetamol 500mg"));

        let signals = sub.drain();
        assert_eq!(signals.len(), 1);
        assert!(matches!(&signals[0], CartSignal::Posted(n) if n.id == id));
    }

    #[tokio::test(start_paused = true)]
    async fn confirmation_is_dismissed_after_three_seconds() {
        let (notifier, sub) = notifier();
        let id = notifier.post(added("Vitamin D3 1000IU"));
        assert!(matches!(sub.try_recv(), Ok(CartSignal::Posted(_))));

        tokio::time::sleep(Duration::from_millis(2_900)).await;
        assert!(sub.try_recv().is_err(), "dismissed too early");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(sub.try_recv().ok(), Some(CartSignal::Dismissed(id)));
    }

    #[tokio::test(start_paused = true)]
    async fn each_notice_runs_its_own_timer() {
        let (notifier, sub) = notifier();
        let first = notifier.post(added("A"));
        let second = notifier.post(NoticeKind::StockUnavailable {
            product_name: "B".to_string(),
            shortfall: StockShortfall::OutOfStock,
        });
        let modal = notifier.post(NoticeKind::EmptyCart);
        assert_eq!(sub.drain().len(), 3);

        tokio::time::sleep(Duration::from_secs(6)).await;
        let dismissed: Vec<_> = sub
            .drain()
            .into_iter()
            .filter_map(|s| match s {
                CartSignal::Dismissed(id) => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(dismissed, vec![first, second]);
        assert!(!dismissed.contains(&modal));
    }
}
