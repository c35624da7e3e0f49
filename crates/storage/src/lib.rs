//! Key-value persistence boundary.
//!
//! The storefront keeps its state in a browser-style key-value store: one
//! key per document, each value a serialized JSON string. This crate defines
//! that capability without assuming where the bytes live.

pub mod file;
pub mod in_memory;
pub mod store;

pub use file::FileStore;
pub use in_memory::InMemoryStore;
pub use store::{JsonDocuments, KeyValueStore, StorageError, StorageResult};
