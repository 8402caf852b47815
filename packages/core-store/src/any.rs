//! Type-erased store handles.
//!
//! An erased handle presents a store's full operation set without naming the
//! concrete backend type, so callers can hold "a store of T" in
//! heterogeneous collections or inject one as a dependency. Erasure is a
//! trait object behind an `Arc`, not a closure bag; cloning a handle shares
//! the underlying store.

use std::sync::Arc;

use crate::error::StoreError;
use crate::traits::{Identifiable, MultiObjectStore, SingleObjectStore};

/// A type-erased [`SingleObjectStore`].
pub struct AnySingleObjectStore<T> {
    inner: Arc<dyn SingleObjectStore<Object = T>>,
}

impl<T> AnySingleObjectStore<T> {
    /// Erase a concrete store.
    pub fn new<S>(store: S) -> Self
    where
        S: SingleObjectStore<Object = T> + 'static,
    {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Erasing an already-erased store returns the same handle.
    ///
    /// This inherent method shadows [`SingleStoreExt::erase_to_any_store`],
    /// so repeated defensive erasure never stacks wrapper layers.
    pub fn erase_to_any_store(self) -> AnySingleObjectStore<T> {
        self
    }
}

impl<T> Clone for AnySingleObjectStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SingleObjectStore for AnySingleObjectStore<T> {
    type Object = T;

    fn save(&self, object: &T) -> Result<(), StoreError> {
        self.inner.save(object)
    }

    fn save_optional(&self, object: Option<&T>) -> Result<(), StoreError> {
        self.inner.save_optional(object)
    }

    fn object(&self) -> Option<T> {
        self.inner.object()
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.inner.remove()
    }
}

/// Erasure entry point for [`SingleObjectStore`] implementations.
pub trait SingleStoreExt: SingleObjectStore + Sized + 'static {
    /// Erase the concrete store type.
    fn erase_to_any_store(self) -> AnySingleObjectStore<Self::Object> {
        AnySingleObjectStore::new(self)
    }
}

impl<S: SingleObjectStore + Sized + 'static> SingleStoreExt for S {}

/// A type-erased [`MultiObjectStore`].
pub struct AnyMultiObjectStore<T: Identifiable> {
    inner: Arc<dyn MultiObjectStore<Object = T>>,
}

impl<T: Identifiable> AnyMultiObjectStore<T> {
    /// Erase a concrete store.
    pub fn new<S>(store: S) -> Self
    where
        S: MultiObjectStore<Object = T> + 'static,
    {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Erasing an already-erased store returns the same handle.
    ///
    /// This inherent method shadows [`MultiStoreExt::erase_to_any_store`],
    /// so repeated defensive erasure never stacks wrapper layers.
    pub fn erase_to_any_store(self) -> AnyMultiObjectStore<T> {
        self
    }
}

impl<T: Identifiable> Clone for AnyMultiObjectStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Identifiable> MultiObjectStore for AnyMultiObjectStore<T> {
    type Object = T;

    fn save(&self, object: &T) -> Result<(), StoreError> {
        self.inner.save(object)
    }

    fn save_all(&self, objects: &[T]) -> Result<(), StoreError> {
        self.inner.save_all(objects)
    }

    fn save_optional(&self, object: Option<&T>) -> Result<(), StoreError> {
        self.inner.save_optional(object)
    }

    fn objects_count(&self) -> usize {
        self.inner.objects_count()
    }

    fn contains_object(&self, id: &T::Id) -> bool {
        self.inner.contains_object(id)
    }

    fn object(&self, id: &T::Id) -> Option<T> {
        self.inner.object(id)
    }

    fn objects(&self, ids: &[T::Id]) -> Vec<T> {
        self.inner.objects(ids)
    }

    fn all_objects(&self) -> Vec<T> {
        self.inner.all_objects()
    }

    fn remove(&self, id: &T::Id) -> Result<(), StoreError> {
        self.inner.remove(id)
    }

    fn remove_ids(&self, ids: &[T::Id]) -> Result<(), StoreError> {
        self.inner.remove_ids(ids)
    }

    fn remove_all(&self) -> Result<(), StoreError> {
        self.inner.remove_all()
    }
}

/// Erasure entry point for [`MultiObjectStore`] implementations.
pub trait MultiStoreExt: MultiObjectStore + Sized + 'static {
    /// Erase the concrete store type.
    fn erase_to_any_store(self) -> AnyMultiObjectStore<Self::Object> {
        AnyMultiObjectStore::new(self)
    }
}

impl<S: MultiObjectStore + Sized + 'static> MultiStoreExt for S {}
