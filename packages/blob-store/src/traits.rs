//! The repository contract: namespaced byte-blob storage.

use bytes::Bytes;

use crate::BlobError;

/// A namespaced byte-blob store.
///
/// A namespace groups all entries belonging to one logical store instance;
/// keys address individual blobs within it. Implementations decide how both
/// map onto physical storage (registry domains, directories, database rows),
/// but must honor the following:
///
/// - `delete` succeeds when the key is already absent.
/// - `delete_namespace` succeeds when the namespace is already absent.
/// - `keys` enumeration order is backend-defined; backends with a natural
///   stable order (e.g. last-modified time) should preserve it.
/// - Single-key reads are atomic: `get` never observes a torn write.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn BlobRepository>`.
pub trait BlobRepository: Send + Sync {
    /// Write a blob, overwriting any previous value at the key.
    fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError>;

    /// Read the blob at a key, or `None` if absent.
    fn get(&self, namespace: &str, key: &str) -> Option<Bytes>;

    /// Delete the blob at a key. Absence is not an error.
    fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError>;

    /// Whether a blob exists at the key.
    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    /// Enumerate all keys in a namespace.
    fn keys(&self, namespace: &str) -> Vec<String>;

    /// The number of blobs in a namespace.
    fn count(&self, namespace: &str) -> usize {
        self.keys(namespace).len()
    }

    /// Delete a namespace and every blob in it. Absence is not an error.
    fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError>;
}

// Blanket implementations so engines can hold repositories behind any of the
// usual indirections.

impl<T: BlobRepository + ?Sized> BlobRepository for &T {
    fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
        (*self).put(namespace, key, bytes)
    }

    fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
        (*self).get(namespace, key)
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
        (*self).delete(namespace, key)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        (*self).exists(namespace, key)
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        (*self).keys(namespace)
    }

    fn count(&self, namespace: &str) -> usize {
        (*self).count(namespace)
    }

    fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
        (*self).delete_namespace(namespace)
    }
}

impl<T: BlobRepository + ?Sized> BlobRepository for Box<T> {
    fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
        self.as_ref().put(namespace, key, bytes)
    }

    fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
        self.as_ref().get(namespace, key)
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
        self.as_ref().delete(namespace, key)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.as_ref().exists(namespace, key)
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        self.as_ref().keys(namespace)
    }

    fn count(&self, namespace: &str) -> usize {
        self.as_ref().count(namespace)
    }

    fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
        self.as_ref().delete_namespace(namespace)
    }
}

impl<T: BlobRepository + ?Sized> BlobRepository for std::sync::Arc<T> {
    fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
        self.as_ref().put(namespace, key, bytes)
    }

    fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
        self.as_ref().get(namespace, key)
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
        self.as_ref().delete(namespace, key)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.as_ref().exists(namespace, key)
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        self.as_ref().keys(namespace)
    }

    fn count(&self, namespace: &str) -> usize {
        self.as_ref().count(namespace)
    }

    fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
        self.as_ref().delete_namespace(namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Minimal in-memory repository for exercising the trait contract.
    #[derive(Default)]
    struct TestRepository {
        data: Mutex<HashMap<(String, String), Bytes>>,
    }

    impl BlobRepository for TestRepository {
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

    #[test]
    fn default_exists_and_count_follow_get_and_keys() {
        let repo = TestRepository::default();
        repo.put("ns", "a", Bytes::from_static(b"1")).unwrap();
        repo.put("ns", "b", Bytes::from_static(b"2")).unwrap();
        repo.put("other", "c", Bytes::from_static(b"3")).unwrap();

        assert!(repo.exists("ns", "a"));
        assert!(!repo.exists("ns", "c"));
        assert_eq!(repo.count("ns"), 2);
        assert_eq!(repo.count("other"), 1);
        assert_eq!(repo.count("missing"), 0);
    }

    #[test]
    fn delete_of_absent_key_is_not_an_error() {
        let repo = TestRepository::default();
        repo.delete("ns", "missing").unwrap();
        repo.delete_namespace("missing").unwrap();
    }

    #[test]
    fn namespaces_are_isolated() {
        let repo = TestRepository::default();
        repo.put("a", "k", Bytes::from_static(b"1")).unwrap();
        repo.put("b", "k", Bytes::from_static(b"2")).unwrap();

        repo.delete_namespace("a").unwrap();

        assert!(!repo.exists("a", "k"));
        assert_eq!(repo.get("b", "k"), Some(Bytes::from_static(b"2")));
    }

    #[test]
    fn object_safety_works() {
        let repo = TestRepository::default();
        let boxed: Box<dyn BlobRepository> = Box::new(repo);
        boxed.put("ns", "k", Bytes::from_static(b"v")).unwrap();
        assert_eq!(boxed.get("ns", "k"), Some(Bytes::from_static(b"v")));
    }
}
