//! In-memory repository for stowage stores.
//!
//! Storage is a process-global registry of namespaces, so every
//! [`MemoryRepository`] handle observes the same data: stores constructed
//! with the same identifier are views of one underlying namespace, matching
//! the lifecycle contract of the persistent backends. Nothing survives the
//! process.
//!
//! The registry mutex also serializes physical access across store
//! instances sharing an identifier, which the persistent backends do not
//! promise.
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use stowage_core_store::{Identifiable, MultiObjectStore};
//! use stowage_memory_store::multi_store;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Note {
//!     id: u64,
//!     body: String,
//! }
//!
//! impl Identifiable for Note {
//!     type Id = u64;
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! let store = multi_store::<Note>("example.notes").unwrap();
//! store
//!     .save(&Note {
//!         id: 1,
//!         body: "hello".to_string(),
//!     })
//!     .unwrap();
//! assert_eq!(store.objects_count(), 1);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use bytes::Bytes;
use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde::Serialize;

use stowage_blob_store::{BlobError, BlobRepository};
use stowage_core_store::{Identifiable, MultiBlobStore, SingleBlobStore, StoreError};

lazy_static! {
    static ref NAMESPACES: Mutex<HashMap<String, HashMap<String, Bytes>>> =
        Mutex::new(HashMap::new());
}

/// A [`BlobRepository`] over the process-global namespace registry.
///
/// Handles are zero-sized; cloning or re-creating one changes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryRepository;

impl MemoryRepository {
    pub fn new() -> Self {
        Self
    }

    fn with_namespaces<U>(f: impl FnOnce(&mut HashMap<String, HashMap<String, Bytes>>) -> U) -> U {
        let mut namespaces = NAMESPACES
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut namespaces)
    }
}

impl BlobRepository for MemoryRepository {
    fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
        log::trace!("memory put {}/{} ({} bytes)", namespace, key, bytes.len());
        Self::with_namespaces(|namespaces| {
            namespaces
                .entry(namespace.to_string())
                .or_default()
                .insert(key.to_string(), bytes);
        });
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
        Self::with_namespaces(|namespaces| namespaces.get(namespace)?.get(key).cloned())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
        Self::with_namespaces(|namespaces| {
            if let Some(entries) = namespaces.get_mut(namespace) {
                entries.remove(key);
            }
        });
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        Self::with_namespaces(|namespaces| {
            namespaces
                .get(namespace)
                .is_some_and(|entries| entries.contains_key(key))
        })
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        Self::with_namespaces(|namespaces| {
            namespaces
                .get(namespace)
                .map(|entries| entries.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    fn count(&self, namespace: &str) -> usize {
        Self::with_namespaces(|namespaces| {
            namespaces.get(namespace).map(HashMap::len).unwrap_or(0)
        })
    }

    fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
        log::trace!("memory delete namespace {}", namespace);
        Self::with_namespaces(|namespaces| {
            namespaces.remove(namespace);
        });
        Ok(())
    }
}

/// A multi-object store over the in-memory repository.
pub type MultiMemoryStore<T> = MultiBlobStore<T, MemoryRepository>;

/// A single-object store over the in-memory repository.
pub type SingleMemoryStore<T> = SingleBlobStore<T, MemoryRepository>;

/// Create a multi-object in-memory store with the given identifier.
pub fn multi_store<T>(identifier: &str) -> Result<MultiMemoryStore<T>, StoreError>
where
    T: Identifiable + Serialize + DeserializeOwned,
{
    MultiBlobStore::new(MemoryRepository::new(), identifier)
}

/// Create a single-object in-memory store with the given identifier.
pub fn single_store<T>(identifier: &str) -> Result<SingleMemoryStore<T>, StoreError>
where
    T: Serialize + DeserializeOwned,
{
    SingleBlobStore::new(MemoryRepository::new(), identifier)
}
