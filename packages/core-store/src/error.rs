//! Error types for the typed store layer.
//!
//! These add codec and construction failures on top of the backend errors
//! from the blob layer.

use stowage_blob_store::BlobError;

/// A record failed to serialize or a stored blob failed to deserialize.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("An error occurred while encoding a record: {message}")]
    Encode { message: String },

    #[error("An error occurred while decoding a record: {message}")]
    Decode { message: String },
}

/// Errors surfaced by store operations.
///
/// Mutating operations (`save`, `remove`, `remove_all`) propagate these to
/// the caller. Accessor operations whose return type already encodes absence
/// (`object`, `all_objects`, `objects_count`, `contains_object`) never return
/// an error: they log through the store's [`crate::Logger`] and degrade to an
/// empty result instead.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Serialization or deserialization failure.
    #[error("{0}")]
    Codec(#[from] CodecError),

    /// The underlying repository rejected the operation.
    #[error("{0}")]
    Backend(#[from] BlobError),

    /// The store identifier cannot be used as a namespace.
    ///
    /// Raised at construction time; the store is never created.
    #[error("invalid store identifier: '{identifier}'")]
    InvalidIdentifier { identifier: String },
}
