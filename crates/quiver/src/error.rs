//! Error types for collection operations.

use quiver_filter::FilterError;
use thiserror::Error;

use crate::key::KeyValue;

/// Errors raised by [`Sequence`](crate::Sequence), [`Keyed`](crate::Keyed)
/// and [`Ring`](crate::Ring).
#[derive(Debug, Error)]
pub enum CollectionError {
    /// An item's key value is already mapped to a different item.
    #[error("duplicate key detected: {key}")]
    DuplicateKey { key: KeyValue },

    /// No item is indexed under the key.
    #[error("non-existent key detected: {key}")]
    NonExistentKey { key: KeyValue },

    /// The item is not a member of the collection.
    #[error("item not found in collection")]
    ItemNotFound,

    /// Exactly one item was required, but there were none.
    #[error("no items found")]
    NoItems,

    /// Exactly one item was required, but there were several.
    #[error("multiple items found: {count}")]
    MultipleItems { count: usize },

    /// A filter failed to compile or evaluate.
    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Errors that can report a failed key lookup.
///
/// Lets callers treat a missing key the same way whichever collection
/// raised it.
pub trait MissingKey {
    /// The key that could not be resolved, if this was a failed lookup.
    fn missing_key(&self) -> Option<&KeyValue>;

    /// Whether this was a failed lookup.
    fn is_missing_key(&self) -> bool {
        self.missing_key().is_some()
    }
}

impl MissingKey for CollectionError {
    fn missing_key(&self) -> Option<&KeyValue> {
        match self {
            CollectionError::NonExistentKey { key } => Some(key),
            _ => None,
        }
    }
}
