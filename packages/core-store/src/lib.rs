//! Core Stowage: Typed Object Store Layer
//!
//! This layer adds meaning to the raw bytes of `stowage-blob-store`:
//! - [`Identifiable`]: records that carry a stable identity
//! - [`SingleObjectStore`] / [`MultiObjectStore`]: the store contracts
//! - [`SingleBlobStore`] / [`MultiBlobStore`]: generic engines that implement
//!   those contracts over any [`BlobRepository`]
//! - [`AnySingleObjectStore`] / [`AnyMultiObjectStore`]: type-erased handles
//! - [`Codec`]: the serialization seam, JSON by default
//! - [`Logger`]: the diagnostic sink for accessor-side failures
//!
//! Callers construct an engine bound to one repository instance and a store
//! identifier; the engine derives namespaced entry keys, encodes and decodes
//! records through the codec, and serializes mutations behind a per-instance
//! lock. Read accessors never fail: they degrade to empty results and report
//! through the store's [`Logger`].
//!
//! # Example
//!
//! ```rust,ignore
//! use stowage_core_store::{MultiBlobStore, MultiObjectStore};
//!
//! let store = MultiBlobStore::new(repository, "users")?;
//! store.save(&user)?;
//! assert_eq!(store.objects_count(), 1);
//! ```

pub use bytes::Bytes;

mod any;
mod codec;
mod diagnostics;
mod error;
mod identifier;
mod multi;
mod single;
mod traits;

pub use any::{AnyMultiObjectStore, AnySingleObjectStore, MultiStoreExt, SingleStoreExt};
pub use codec::{decode_with, Codec, JsonCodec};
pub use diagnostics::Logger;
pub use error::{CodecError, StoreError};
pub use identifier::validate_identifier;
pub use multi::MultiBlobStore;
pub use single::SingleBlobStore;
pub use traits::{Identifiable, MultiObjectStore, SingleObjectStore};

// Re-export blob types for convenience
pub use stowage_blob_store::{BlobError, BlobRepository};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_suite;
