//! Stowage: typed single- and multi-object stores over interchangeable
//! keyed byte-blob backends.
//!
//! A store persists values of one concrete type under a caller-chosen
//! identifier. Multi-object stores keep any number of records keyed by the
//! record's own identity; single-object stores keep at most one record.
//! Both are defined as traits, so application code can swap the in-memory
//! backend for the directory-tree backend (or a fake in tests) without
//! changing call sites.
//!
//! The layers, bottom up:
//!
//! - [`blob_store`]: the [`BlobRepository`] seam — namespaced keyed byte
//!   blobs, nothing typed.
//! - [`core_store`]: the store traits, the generic engines over any
//!   repository, JSON encoding, type-erased handles, and the shared test
//!   suite.
//! - [`memory_store`], [`fs_store`]: ready-made backends.
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use stowage::{Identifiable, MultiObjectStore};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Task {
//!     id: u64,
//!     title: String,
//! }
//!
//! impl Identifiable for Task {
//!     type Id = u64;
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//! }
//!
//! let store = stowage::memory_store::multi_store::<Task>("example.tasks").unwrap();
//! store
//!     .save(&Task {
//!         id: 1,
//!         title: "write docs".to_string(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(store.objects_count(), 1);
//! assert_eq!(store.object(&1).unwrap().title, "write docs");
//! ```

pub use stowage_blob_store as blob_store;
pub use stowage_core_store as core_store;
pub use stowage_fs_store as fs_store;
pub use stowage_memory_store as memory_store;

pub use stowage_blob_store::{BlobError, BlobRepository, Bytes};
pub use stowage_core_store::{
    AnyMultiObjectStore, AnySingleObjectStore, Codec, CodecError, Identifiable, JsonCodec, Logger,
    MultiBlobStore, MultiObjectStore, MultiStoreExt, SingleBlobStore, SingleObjectStore,
    SingleStoreExt, StoreError,
};
pub use stowage_fs_store::{AccessPolicy, FsRepository, MultiFsStore, SingleFsStore};
pub use stowage_memory_store::{MemoryRepository, MultiMemoryStore, SingleMemoryStore};

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_core_store::test_suite::User;

    #[test]
    fn erased_handles_work_across_backends() {
        let dir = tempfile::tempdir().unwrap();

        let memory = memory_store::multi_store::<User>("facade.mix").unwrap();
        let disk = fs_store::multi_store::<User>(dir.path(), "facade.mix").unwrap();

        let stores = vec![
            memory.erase_to_any_store(),
            disk.erase_to_any_store(),
        ];
        for store in &stores {
            store.save(&User::john()).unwrap();
            assert_eq!(store.objects_count(), 1);
        }
    }

    #[test]
    fn flat_reexports_cover_the_common_path() {
        let store: MultiMemoryStore<User> =
            memory_store::multi_store("facade.reexports").unwrap();
        store.save(&User::james()).unwrap();
        assert!(store.contains_object(&3));
    }
}
