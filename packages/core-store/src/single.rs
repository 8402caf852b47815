//! The generic single-object store engine.

use std::marker::PhantomData;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use stowage_blob_store::BlobRepository;

use crate::codec::{decode_with, Codec, JsonCodec};
use crate::diagnostics::Logger;
use crate::error::StoreError;
use crate::identifier::{self, SINGLE_SENTINEL};
use crate::traits::SingleObjectStore;

/// A [`SingleObjectStore`] over any [`BlobRepository`].
///
/// The record is stored as one blob under a fixed sentinel key in the
/// store's own namespace. [`remove`](SingleObjectStore::remove) deletes the
/// whole namespace, which only ever holds that one entry.
///
/// **Warning**: Never use the same identifier for multiple stores with
/// different record types, doing this might cause stores to have corrupted
/// data.
pub struct SingleBlobStore<T, R> {
    identifier: String,
    namespace: String,
    key: String,
    repository: R,
    codec: Box<dyn Codec>,
    logger: Logger,
    lock: Mutex<()>,
    _object: PhantomData<fn() -> T>,
}

impl<T, R> SingleBlobStore<T, R>
where
    T: Serialize + DeserializeOwned,
    R: BlobRepository,
{
    /// Create a store bound to a repository, using the default JSON codec.
    ///
    /// Fails with [`StoreError::InvalidIdentifier`] if the identifier cannot
    /// be used as a namespace.
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
        let namespace = identifier::single_namespace(&identifier);
        Ok(Self {
            identifier,
            namespace,
            key: identifier::object_key(&SINGLE_SENTINEL),
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

    fn sync<U>(&self, action: impl FnOnce() -> U) -> U {
        let _guard = self
            .lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        action()
    }
}

impl<T, R> SingleObjectStore for SingleBlobStore<T, R>
where
    T: Serialize + DeserializeOwned,
    R: BlobRepository,
{
    type Object = T;

    fn save(&self, object: &T) -> Result<(), StoreError> {
        self.sync(|| {
            let bytes = self.codec.encode(object)?;
            self.repository.put(&self.namespace, &self.key, bytes)?;
            Ok(())
        })
    }

    fn object(&self) -> Option<T> {
        let bytes = self.repository.get(&self.namespace, &self.key)?;
        match decode_with::<T>(&self.codec, &bytes) {
            Ok(object) => Some(object),
            Err(error) => {
                self.logger.log("SingleBlobStore.object", &error);
                None
            }
        }
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.sync(|| {
            self.repository
                .delete_namespace(&self.namespace)
                .map_err(StoreError::from)
        })
    }
}
