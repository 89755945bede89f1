//! Error types for the value store.

use formwright_types::FieldPath;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur when writing into the value store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A key segment tried to descend into a scalar or an array.
    #[error("cannot address a key inside '{path}': not a mapping")]
    NotAContainer { path: FieldPath },

    /// An index segment tried to descend into something that is not an array.
    #[error("cannot address an index inside '{path}': not an array")]
    NotAnArray { path: FieldPath },

    /// An index beyond the end of the array (only `len` may be used to append).
    #[error("index {index} out of bounds for '{path}' (length {len})")]
    IndexOutOfBounds {
        path: FieldPath,
        index: usize,
        len: usize,
    },

    /// No element with the given identity exists in the array.
    #[error("no element with id {id} in '{path}'")]
    UnknownElement { path: FieldPath, id: String },
}
