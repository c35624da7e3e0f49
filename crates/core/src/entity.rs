//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// A cart line is an entity keyed by its product: changing its quantity does
/// not make it a different line.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
