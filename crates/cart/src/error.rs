use thiserror::Error;

use vivalife_storage::StorageError;

pub type CartResult<T> = Result<T, CartError>;

/// Cart faults.
///
/// Refused adds and blocked checkouts are outcomes, not errors; see
/// [`crate::AddOutcome`] and [`crate::CheckoutOutcome`].
#[derive(Debug, Error)]
pub enum CartError {
    /// The persisted cart could not be read back.
    #[error("cart snapshot `{key}` could not be loaded: {source}")]
    Snapshot {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
