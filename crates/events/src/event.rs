use chrono::{DateTime, Utc};

/// A domain event.
///
/// Events are immutable facts (e.g. "item added", "quantity clamped") with a
/// stable type name and the business time they happened at.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "cart.item.added").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;
}
