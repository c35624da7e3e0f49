//! `vivalife-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no UI, no IO).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use value_object::{Money, ValueObject};
