use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("io error on key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document under key `{key}` is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document for key `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

/// String key-value store capability (the `localStorage` shape).
///
/// Methods take `&self` so one store can be shared between the cart and the
/// inventory oracle; implementations use interior mutability. Writes are
/// last-writer-wins with no cross-session coordination.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Typed JSON documents on top of any [`KeyValueStore`].
pub trait JsonDocuments: KeyValueStore {
    /// Load and deserialize the document under `key`. Absent key → `Ok(None)`.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(raw) = self.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Malformed {
                key: key.to_string(),
                source,
            })
    }

    /// Serialize `value` and store it under `key`, replacing any previous value.
    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> JsonDocuments for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;

    #[test]
    fn json_documents_round_trip_through_strings() {
        let store = InMemoryStore::new();
        store.save_json("numbers", &vec![1, 2, 3]).unwrap();

        assert_eq!(store.get("numbers").unwrap().as_deref(), Some("[1,2,3]"));
        let back: Option<Vec<u32>> = store.load_json("numbers").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn absent_document_is_none() {
        let store = InMemoryStore::new();
        let doc: Option<Vec<u32>> = store.load_json("missing").unwrap();
        assert!(doc.is_none());
    }

    #[test]
    fn malformed_document_names_its_key() {
        let store = InMemoryStore::new();
        store.set("cart", "{not json").unwrap();

        let err = store.load_json::<Vec<u32>>("cart").unwrap_err();
        match err {
            StorageError::Malformed { key, .. } => assert_eq!(key, "cart"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }
}
