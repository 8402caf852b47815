//! The store contracts: `Identifiable`, `SingleObjectStore`, `MultiObjectStore`.

use std::fmt;
use std::hash::Hash;

use crate::error::StoreError;

/// A record that carries a stable identity.
///
/// Two records with equal identity are the same logical entry: saving one
/// overwrites the other. The identity's `Display` rendering is what derives
/// the entry key, so it must be stable across runs.
pub trait Identifiable {
    /// The identity type.
    type Id: fmt::Display + Eq + Hash + Clone;

    /// The record's identity.
    fn id(&self) -> Self::Id;
}

/// A store persisting at most one record under its identifier.
///
/// Mutating operations return `Result`; the accessor [`object`](Self::object)
/// never fails — decode and backend failures degrade to `None` and are
/// reported through the store's diagnostic sink.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn SingleObjectStore<Object = T>>`.
pub trait SingleObjectStore: Send + Sync {
    /// Stored record type.
    type Object;

    /// Save a record, overwriting any prior value.
    fn save(&self, object: &Self::Object) -> Result<(), StoreError>;

    /// Save a record if present; remove the stored record if absent.
    fn save_optional(&self, object: Option<&Self::Object>) -> Result<(), StoreError> {
        match object {
            Some(object) => self.save(object),
            None => self.remove(),
        }
    }

    /// The stored record, or `None` if absent or undecodable.
    fn object(&self) -> Option<Self::Object>;

    /// Remove any stored record. Absence is not an error.
    fn remove(&self) -> Result<(), StoreError>;
}

/// A store persisting a collection of records, each addressable by identity.
///
/// Mutating operations return `Result`; accessors never fail — they degrade
/// to `0`/`false`/`None`/empty and report through the store's diagnostic
/// sink.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn MultiObjectStore<Object = T>>`.
pub trait MultiObjectStore: Send + Sync {
    /// Stored record type.
    type Object: Identifiable;

    /// Save a record, overwriting any record with the same identity.
    fn save(&self, object: &Self::Object) -> Result<(), StoreError>;

    /// Save a batch of records.
    ///
    /// The default saves each record in turn and stops at the first
    /// failure, so earlier saves remain. Engines that encode records
    /// override this to reject the whole batch up front when any record
    /// fails encoding.
    fn save_all(&self, objects: &[Self::Object]) -> Result<(), StoreError> {
        for object in objects {
            self.save(object)?;
        }
        Ok(())
    }

    /// Save a record if present; no-op if absent.
    fn save_optional(&self, object: Option<&Self::Object>) -> Result<(), StoreError> {
        match object {
            Some(object) => self.save(object),
            None => Ok(()),
        }
    }

    /// The number of records in the store.
    fn objects_count(&self) -> usize;

    /// Whether the store contains a record with the given identity.
    fn contains_object(&self, id: &<Self::Object as Identifiable>::Id) -> bool {
        self.object(id).is_some()
    }

    /// The record with the given identity, or `None` if absent or
    /// undecodable.
    fn object(&self, id: &<Self::Object as Identifiable>::Id) -> Option<Self::Object>;

    /// The records with the given identities, in input order, skipping
    /// identities with no match.
    fn objects(&self, ids: &[<Self::Object as Identifiable>::Id]) -> Vec<Self::Object> {
        ids.iter().filter_map(|id| self.object(id)).collect()
    }

    /// Every record in the store. Order is backend-defined.
    fn all_objects(&self) -> Vec<Self::Object>;

    /// Remove the record with the given identity. Absence is not an error.
    fn remove(&self, id: &<Self::Object as Identifiable>::Id) -> Result<(), StoreError>;

    /// Remove the records with the given identities, independently.
    ///
    /// Every identity is attempted even when one removal fails; the first
    /// error is returned after the whole list has been processed.
    fn remove_ids(&self, ids: &[<Self::Object as Identifiable>::Id]) -> Result<(), StoreError> {
        let mut first_error = None;
        for id in ids {
            if let Err(error) = self.remove(id) {
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Remove every record in the store.
    fn remove_all(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_suite::{MultiObjectStoreFake, SingleObjectStoreFake, User};

    #[test]
    fn single_save_optional_none_removes() {
        let store = SingleObjectStoreFake::new();
        store.save(&User::john()).unwrap();
        assert!(store.object().is_some());

        store.save_optional(None).unwrap();
        assert!(store.object().is_none());
    }

    #[test]
    fn multi_save_optional_none_is_noop() {
        let store = MultiObjectStoreFake::new();
        store.save(&User::john()).unwrap();

        store.save_optional(None).unwrap();

        assert_eq!(store.objects_count(), 1);
    }

    #[test]
    fn objects_follows_input_order_and_skips_misses() {
        let store = MultiObjectStoreFake::new();
        store
            .save_all(&[User::john(), User::johnson(), User::james()])
            .unwrap();

        let found = store.objects(&[3, 99, 1]);
        assert_eq!(found, vec![User::james(), User::john()]);
    }

    #[test]
    fn default_remove_ids_attempts_every_id() {
        use stowage_blob_store::BlobError;

        /// Wraps the fake but refuses to remove one identity, leaving the
        /// derived `remove_ids` in place.
        struct PinnedStore {
            inner: MultiObjectStoreFake<User>,
            pinned_id: u64,
        }

        impl MultiObjectStore for PinnedStore {
            type Object = User;

            fn save(&self, object: &User) -> Result<(), StoreError> {
                self.inner.save(object)
            }

            fn objects_count(&self) -> usize {
                self.inner.objects_count()
            }

            fn object(&self, id: &u64) -> Option<User> {
                self.inner.object(id)
            }

            fn all_objects(&self) -> Vec<User> {
                self.inner.all_objects()
            }

            fn remove(&self, id: &u64) -> Result<(), StoreError> {
                if *id == self.pinned_id {
                    return Err(StoreError::Backend(BlobError::repository(
                        "entry is pinned",
                    )));
                }
                self.inner.remove(id)
            }

            fn remove_all(&self) -> Result<(), StoreError> {
                self.inner.remove_all()
            }
        }

        let store = PinnedStore {
            inner: MultiObjectStoreFake::new(),
            pinned_id: 1,
        };
        store
            .save_all(&[User::john(), User::johnson(), User::james()])
            .unwrap();

        let result = store.remove_ids(&[1, 2, 3]);

        assert!(result.is_err());
        assert!(store.contains_object(&1));
        assert!(!store.contains_object(&2));
        assert!(!store.contains_object(&3));
    }

    #[test]
    fn object_safety_works() {
        let store = MultiObjectStoreFake::new();
        let boxed: Box<dyn MultiObjectStore<Object = User>> = Box::new(store);
        boxed.save(&User::john()).unwrap();
        assert!(boxed.contains_object(&1));
    }
}
