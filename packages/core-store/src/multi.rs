//! The generic multi-object store engine.

use std::marker::PhantomData;
use std::sync::Mutex;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use stowage_blob_store::BlobRepository;

use crate::codec::{decode_with, Codec, JsonCodec};
use crate::diagnostics::Logger;
use crate::error::StoreError;
use crate::identifier::{self, COUNTER_KEY};
use crate::traits::{Identifiable, MultiObjectStore};

/// A [`MultiObjectStore`] over any [`BlobRepository`].
///
/// Each record is stored as one blob under a key derived from its identity;
/// a durable entry counter is kept as an ordinary entry (`meta:count`) in the
/// same namespace, updated inside the same lock scope as the data write. The
/// counter update is not transactional with the data write: a crash between
/// the two can desynchronize them, and the guarantee is best-effort.
///
/// Mutations are serialized by a per-instance lock. Two instances
/// constructed with the same identifier observe the same persisted data but
/// are only synchronized against each other if the repository itself
/// serializes access.
///
/// **Warning**: Never use the same identifier for multiple stores with
/// different record types, doing this might cause stores to have corrupted
/// data.
pub struct MultiBlobStore<T, R> {
    identifier: String,
    namespace: String,
    repository: R,
    codec: Box<dyn Codec>,
    logger: Logger,
    lock: Mutex<()>,
    _object: PhantomData<fn() -> T>,
}

impl<T, R> MultiBlobStore<T, R>
where
    T: Identifiable + Serialize + DeserializeOwned,
    R: BlobRepository,
{
    /// Create a store bound to a repository, using the default JSON codec.
    ///
    /// Fails with [`StoreError::InvalidIdentifier`] if the identifier cannot
    /// be used as a namespace. Construction is cheap and has no side
    /// effects; the same identifier can be used to construct any number of
    /// instances viewing the same data.
    pub fn new(repository: R, identifier: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_codec(repository, identifier, Box::new(JsonCodec))
    }

    /// Create a store with an explicit codec.
    pub fn with_codec(
        repository: R,
        identifier: impl Into<String>,
        codec: Box<dyn Codec>,
    ) -> Result<Self, StoreError> {
        let identifier = identifier.into();
        identifier::validate_identifier(&identifier)?;
        let namespace = identifier::multi_namespace(&identifier);
        Ok(Self {
            identifier,
            namespace,
            repository,
            codec,
            logger: Logger::new(),
            lock: Mutex::new(()),
            _object: PhantomData,
        })
    }

    /// The store's identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The store's diagnostic sink.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Run `action` with the instance lock held.
    ///
    /// Locked entry points must not call each other; internals are the
    /// `*_unlocked` primitives below.
    fn sync<U>(&self, action: impl FnOnce() -> U) -> U {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        action()
    }

    fn key_for(id: &T::Id) -> String {
        identifier::object_key(id)
    }

    fn read_count(&self) -> usize {
        let Some(bytes) = self.repository.get(&self.namespace, COUNTER_KEY) else {
            return 0;
        };
        match std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
        {
            Some(count) => count,
            None => {
                self.logger.log(
                    "MultiBlobStore.objects_count",
                    &"counter entry is not a decimal integer",
                );
                0
            }
        }
    }

    fn write_count(&self, count: usize) -> Result<(), StoreError> {
        self.repository
            .put(&self.namespace, COUNTER_KEY, Bytes::from(count.to_string()))
            .map_err(StoreError::from)
    }

    /// Write pre-encoded record bytes, maintaining the counter for new keys.
    fn save_encoded_unlocked(&self, key: &str, bytes: Bytes) -> Result<(), StoreError> {
        if !self.repository.exists(&self.namespace, key) {
            self.write_count(self.read_count() + 1)?;
        }
        self.repository.put(&self.namespace, key, bytes)?;
        Ok(())
    }

    fn remove_unlocked(&self, id: &T::Id) -> Result<(), StoreError> {
        let key = Self::key_for(id);
        if !self.repository.exists(&self.namespace, &key) {
            return Ok(());
        }
        self.repository.delete(&self.namespace, &key)?;
        let count = self.read_count();
        if count > 0 {
            self.write_count(count - 1)?;
        }
        Ok(())
    }

    fn decode_object(&self, origin: &str, bytes: &[u8]) -> Option<T> {
        match decode_with::<T>(&self.codec, bytes) {
            Ok(object) => Some(object),
            Err(error) => {
                self.logger.log(origin, &error);
                None
            }
        }
    }
}

impl<T, R> MultiObjectStore for MultiBlobStore<T, R>
where
    T: Identifiable + Serialize + DeserializeOwned,
    R: BlobRepository,
{
    type Object = T;

    fn save(&self, object: &T) -> Result<(), StoreError> {
        self.sync(|| {
            let bytes = self.codec.encode(object)?;
            self.save_encoded_unlocked(&Self::key_for(&object.id()), bytes)
        })
    }

    /// Encodes every record before writing anything: an encoding failure
    /// aborts the whole batch with the store unchanged. A backend write
    /// failure partway through leaves earlier writes in place.
    fn save_all(&self, objects: &[T]) -> Result<(), StoreError> {
        self.sync(|| {
            let mut pairs = Vec::with_capacity(objects.len());
            for object in objects {
                pairs.push((Self::key_for(&object.id()), self.codec.encode(object)?));
            }
            for (key, bytes) in pairs {
                self.save_encoded_unlocked(&key, bytes)?;
            }
            Ok(())
        })
    }

    fn objects_count(&self) -> usize {
        self.read_count()
    }

    fn contains_object(&self, id: &T::Id) -> bool {
        self.repository.exists(&self.namespace, &Self::key_for(id))
    }

    fn object(&self, id: &T::Id) -> Option<T> {
        let bytes = self.repository.get(&self.namespace, &Self::key_for(id))?;
        self.decode_object("MultiBlobStore.object", &bytes)
    }

    fn all_objects(&self) -> Vec<T> {
        self.repository
            .keys(&self.namespace)
            .into_iter()
            .filter(|key| identifier::is_object_key(key))
            .filter_map(|key| self.repository.get(&self.namespace, &key))
            .filter_map(|bytes| self.decode_object("MultiBlobStore.all_objects", &bytes))
            .collect()
    }

    fn remove(&self, id: &T::Id) -> Result<(), StoreError> {
        self.sync(|| self.remove_unlocked(id))
    }

    fn remove_ids(&self, ids: &[T::Id]) -> Result<(), StoreError> {
        self.sync(|| {
            // Removals are independent: attempt every id even when one
            // fails, then surface the first error.
            let mut first_error = None;
            for id in ids {
                if let Err(error) = self.remove_unlocked(id) {
                    first_error.get_or_insert(error);
                }
            }
            match first_error {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }

    fn remove_all(&self) -> Result<(), StoreError> {
        self.sync(|| {
            self.repository
                .delete_namespace(&self.namespace)
                .map_err(StoreError::from)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_suite::{self, User};
    use std::collections::HashMap;
    use stowage_blob_store::BlobError;

    /// Simple in-memory repository for exercising the engine.
    #[derive(Default)]
    struct MapRepository {
        data: Mutex<HashMap<(String, String), Bytes>>,
    }

    impl BlobRepository for MapRepository {
        fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
            self.data
                .lock()
                .unwrap()
                .insert((namespace.to_string(), key.to_string()), bytes);
            Ok(())
        }

        fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
            self.data
                .lock()
                .unwrap()
                .get(&(namespace.to_string(), key.to_string()))
                .cloned()
        }

        fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
            self.data
                .lock()
                .unwrap()
                .remove(&(namespace.to_string(), key.to_string()));
            Ok(())
        }

        fn keys(&self, namespace: &str) -> Vec<String> {
            self.data
                .lock()
                .unwrap()
                .keys()
                .filter(|(ns, _)| ns == namespace)
                .map(|(_, key)| key.clone())
                .collect()
        }

        fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
            self.data
                .lock()
                .unwrap()
                .retain(|(ns, _), _| ns != namespace);
            Ok(())
        }
    }

    fn fresh_store(identifier: &str) -> MultiBlobStore<User, MapRepository> {
        MultiBlobStore::new(MapRepository::default(), identifier).unwrap()
    }

    #[test]
    fn invalid_identifier_fails_construction() {
        let result = MultiBlobStore::<User, _>::new(MapRepository::default(), "not ok");
        assert!(matches!(
            result,
            Err(StoreError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn scenario_works() {
        test_suite::multi_store_scenario_works(&fresh_store("users"));
    }

    #[test]
    fn idempotent_overwrite_works() {
        test_suite::idempotent_overwrite_works(&fresh_store("users"));
    }

    #[test]
    fn counter_stays_consistent() {
        test_suite::counter_consistency_works(&fresh_store("users"));
    }

    #[test]
    fn removing_absent_id_is_noop() {
        test_suite::remove_absent_id_is_noop(&fresh_store("users"));
    }

    #[test]
    fn batch_encode_failure_leaves_store_unchanged() {
        test_suite::batch_encode_failure_leaves_store_unchanged(&fresh_store("users"));
    }

    #[test]
    fn decode_failure_degrades_and_logs() {
        let store = fresh_store("users");
        store.save(&User::john()).unwrap();

        // Corrupt the stored bytes behind the store's back.
        store
            .repository
            .put(
                &store.namespace,
                &MultiBlobStore::<User, MapRepository>::key_for(&1),
                Bytes::from_static(b"not json"),
            )
            .unwrap();

        assert!(store.object(&1).is_none());
        assert!(store.logger().last_output().is_some());
        assert_eq!(store.all_objects(), vec![]);
    }

    #[test]
    fn remove_ids_attempts_every_id_despite_failures() {
        /// Delegates to a map repository but refuses to delete one key.
        struct FlakyRepository {
            inner: MapRepository,
            failing_key: String,
        }

        impl BlobRepository for FlakyRepository {
            fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
                self.inner.put(namespace, key, bytes)
            }

            fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
                self.inner.get(namespace, key)
            }

            fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
                if key == self.failing_key {
                    return Err(BlobError::repository("entry is pinned"));
                }
                self.inner.delete(namespace, key)
            }

            fn keys(&self, namespace: &str) -> Vec<String> {
                self.inner.keys(namespace)
            }

            fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
                self.inner.delete_namespace(namespace)
            }
        }

        let repository = FlakyRepository {
            inner: MapRepository::default(),
            failing_key: identifier::object_key(&1),
        };
        let store: MultiBlobStore<User, _> = MultiBlobStore::new(repository, "users").unwrap();
        store
            .save_all(&[User::john(), User::johnson(), User::james()])
            .unwrap();

        let result = store.remove_ids(&[1, 2, 3]);

        // The failing id surfaces as an error, but the later ids are still
        // removed.
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert!(store.contains_object(&1));
        assert!(!store.contains_object(&2));
        assert!(!store.contains_object(&3));
        assert_eq!(store.objects_count(), 1);
    }

    #[test]
    fn counter_survives_across_instances_of_same_identifier() {
        let repository = std::sync::Arc::new(MapRepository::default());

        let first: MultiBlobStore<User, _> =
            MultiBlobStore::new(std::sync::Arc::clone(&repository), "users").unwrap();
        first.save(&User::john()).unwrap();

        let second: MultiBlobStore<User, _> =
            MultiBlobStore::new(repository, "users").unwrap();
        assert_eq!(second.objects_count(), 1);
        assert_eq!(second.object(&1), Some(User::john()));
    }

    #[test]
    fn single_and_multi_namespaces_do_not_collide() {
        let repository = std::sync::Arc::new(MapRepository::default());

        let multi: MultiBlobStore<User, _> =
            MultiBlobStore::new(std::sync::Arc::clone(&repository), "users").unwrap();
        let single: crate::SingleBlobStore<User, _> =
            crate::SingleBlobStore::new(repository, "users").unwrap();

        multi.save(&User::john()).unwrap();
        use crate::SingleObjectStore;
        single.save(&User::james()).unwrap();

        assert_eq!(multi.objects_count(), 1);
        assert_eq!(multi.object(&1), Some(User::john()));
        assert_eq!(single.object(), Some(User::james()));
    }
}
