//! Low-Level Stowage Repository Traits
//!
//! This is the narrow waist of the stowage stack. Everything at this level is
//! namespaced raw bytes - no record identity, no codecs, no counters.
//!
//! A [`BlobRepository`] is the contract every physical backend must satisfy:
//! a keyed byte-blob store with create/read/update/delete, an existence test,
//! and namespace-wide enumeration. The object-store engines in
//! `stowage-core-store` are written against this trait alone, which is what
//! makes backends interchangeable.
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use std::collections::HashMap;
//! use stowage_blob_store::{BlobError, BlobRepository};
//!
//! #[derive(Default)]
//! struct MapRepository {
//!     data: std::sync::Mutex<HashMap<(String, String), Bytes>>,
//! }
//!
//! impl BlobRepository for MapRepository {
//!     fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
//!         self.data
//!             .lock()
//!             .unwrap()
//!             .insert((namespace.to_string(), key.to_string()), bytes);
//!         Ok(())
//!     }
//! #   fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
//! #       self.data
//! #           .lock()
//! #           .unwrap()
//! #           .get(&(namespace.to_string(), key.to_string()))
//! #           .cloned()
//! #   }
//! #   fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
//! #       self.data
//! #           .lock()
//! #           .unwrap()
//! #           .remove(&(namespace.to_string(), key.to_string()));
//! #       Ok(())
//! #   }
//! #   fn keys(&self, namespace: &str) -> Vec<String> {
//! #       self.data
//! #           .lock()
//! #           .unwrap()
//! #           .keys()
//! #           .filter(|(ns, _)| ns == namespace)
//! #           .map(|(_, key)| key.clone())
//! #           .collect()
//! #   }
//! #   fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
//! #       self.data
//! #           .lock()
//! #           .unwrap()
//! #           .retain(|(ns, _), _| ns != namespace);
//! #       Ok(())
//! #   }
//!     // ... remaining trait methods elided
//! }
//! ```

pub use bytes::Bytes;

mod error;
mod traits;

pub use error::BlobError;
pub use traits::BlobRepository;
