//! Shared contract tests and fakes for store implementations.
//!
//! Backend packages depend on this module (behind the `test-utils` feature)
//! to run the same behavioral suite against their own repositories, and
//! application code can use the fakes as drop-in test doubles that satisfy
//! the same contracts the real stores do.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use stowage_blob_store::BlobError;

use crate::error::StoreError;
use crate::traits::{Identifiable, MultiObjectStore, SingleObjectStore};

/// Test record with an integer identity.
///
/// Equality follows identity only, mirroring how stores treat records: two
/// `User`s with the same id are the same logical entry.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub age: f64,
}

impl User {
    fn new(id: u64, first_name: &str, last_name: &str, age: f64) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
        }
    }

    pub fn john() -> Self {
        Self::new(1, "John", "Appleseed", 21.5)
    }

    pub fn johnson() -> Self {
        Self::new(2, "Johnson", "Smith", 26.3)
    }

    pub fn james() -> Self {
        Self::new(3, "James", "Robert", 14.0)
    }

    /// A user that fails encoding (non-finite age).
    pub fn invalid() -> Self {
        Self::new(4, "", "", f64::NAN)
    }
}

impl Identifiable for User {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Serialize for User {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.age.is_finite() {
            return Err(serde::ser::Error::custom("age must be a finite number"));
        }
        let mut state = serializer.serialize_struct("User", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("first_name", &self.first_name)?;
        state.serialize_field("last_name", &self.last_name)?;
        state.serialize_field("age", &self.age)?;
        state.end()
    }
}

/// Multi object store fake backed by a dictionary.
///
/// Setting an error message makes every mutating method fail with a backend
/// error carrying that message.
pub struct MultiObjectStoreFake<T: Identifiable> {
    dictionary: Mutex<HashMap<T::Id, T>>,
    error_message: Mutex<Option<String>>,
}

impl<T: Identifiable> MultiObjectStoreFake<T> {
    pub fn new() -> Self {
        Self {
            dictionary: Mutex::new(HashMap::new()),
            error_message: Mutex::new(None),
        }
    }

    /// Make subsequent mutating calls fail with the given message.
    pub fn set_error(&self, message: Option<&str>) {
        *self.error_message.lock().unwrap() = message.map(str::to_string);
    }

    fn injected_error(&self) -> Result<(), StoreError> {
        match self.error_message.lock().unwrap().as_deref() {
            Some(message) => Err(StoreError::Backend(BlobError::repository(message))),
            None => Ok(()),
        }
    }
}

impl<T: Identifiable> Default for MultiObjectStoreFake<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MultiObjectStore for MultiObjectStoreFake<T>
where
    T: Identifiable + Clone + Send + Sync,
    T::Id: Send + Sync,
{
    type Object = T;

    fn save(&self, object: &T) -> Result<(), StoreError> {
        self.injected_error()?;
        self.dictionary
            .lock()
            .unwrap()
            .insert(object.id(), object.clone());
        Ok(())
    }

    fn objects_count(&self) -> usize {
        self.dictionary.lock().unwrap().len()
    }

    fn object(&self, id: &T::Id) -> Option<T> {
        self.dictionary.lock().unwrap().get(id).cloned()
    }

    fn all_objects(&self) -> Vec<T> {
        self.dictionary.lock().unwrap().values().cloned().collect()
    }

    fn remove(&self, id: &T::Id) -> Result<(), StoreError> {
        self.injected_error()?;
        self.dictionary.lock().unwrap().remove(id);
        Ok(())
    }

    fn remove_all(&self) -> Result<(), StoreError> {
        self.injected_error()?;
        self.dictionary.lock().unwrap().clear();
        Ok(())
    }
}

/// Single object store fake backed by an optional value.
pub struct SingleObjectStoreFake<T> {
    object: Mutex<Option<T>>,
    error_message: Mutex<Option<String>>,
}

impl<T> SingleObjectStoreFake<T> {
    pub fn new() -> Self {
        Self {
            object: Mutex::new(None),
            error_message: Mutex::new(None),
        }
    }

    /// Make subsequent mutating calls fail with the given message.
    pub fn set_error(&self, message: Option<&str>) {
        *self.error_message.lock().unwrap() = message.map(str::to_string);
    }

    fn injected_error(&self) -> Result<(), StoreError> {
        match self.error_message.lock().unwrap().as_deref() {
            Some(message) => Err(StoreError::Backend(BlobError::repository(message))),
            None => Ok(()),
        }
    }
}

impl<T> Default for SingleObjectStoreFake<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> SingleObjectStore for SingleObjectStoreFake<T> {
    type Object = T;

    fn save(&self, object: &T) -> Result<(), StoreError> {
        self.injected_error()?;
        *self.object.lock().unwrap() = Some(object.clone());
        Ok(())
    }

    fn object(&self) -> Option<T> {
        self.object.lock().unwrap().clone()
    }

    fn remove(&self) -> Result<(), StoreError> {
        self.injected_error()?;
        *self.object.lock().unwrap() = None;
        Ok(())
    }
}

// Contract suite. Every function takes a freshly constructed, empty store
// and leaves assertions behind; backends call these from their own tests.

/// Saving the same identity twice keeps the count at one and surfaces the
/// most recent content.
pub fn idempotent_overwrite_works<S: MultiObjectStore<Object = User>>(store: &S) {
    store.save(&User::john()).unwrap();
    assert_eq!(store.objects_count(), 1);

    let mut renamed = User::john();
    renamed.first_name = "Johnny".to_string();
    store.save(&renamed).unwrap();

    assert_eq!(store.objects_count(), 1);
    assert_eq!(store.object(&1).unwrap().first_name, "Johnny");
}

/// `objects_count` equals the number of stored records after every
/// mutation.
pub fn counter_consistency_works<S: MultiObjectStore<Object = User>>(store: &S) {
    let check = |store: &S| assert_eq!(store.objects_count(), store.all_objects().len());

    check(store);
    store.save(&User::john()).unwrap();
    check(store);
    store.save(&User::john()).unwrap();
    check(store);
    store.save_all(&[User::johnson(), User::james()]).unwrap();
    check(store);
    store.remove(&2).unwrap();
    check(store);
    store.remove(&2).unwrap();
    check(store);
    store.remove_ids(&[1, 3]).unwrap();
    check(store);
    store.save(&User::john()).unwrap();
    store.remove_all().unwrap();
    check(store);
    assert_eq!(store.objects_count(), 0);
}

/// Removing an identity that is not present changes nothing and is not an
/// error.
pub fn remove_absent_id_is_noop<S: MultiObjectStore<Object = User>>(store: &S) {
    store.save(&User::john()).unwrap();

    store.remove(&99).unwrap();

    assert_eq!(store.objects_count(), 1);
    assert!(store.contains_object(&1));
}

/// A batch containing an unencodable record persists nothing.
pub fn batch_encode_failure_leaves_store_unchanged<S: MultiObjectStore<Object = User>>(store: &S) {
    let result = store.save_all(&[User::john(), User::invalid()]);

    assert!(matches!(result, Err(StoreError::Codec(_))));
    assert_eq!(store.objects_count(), 0);
    assert!(!store.contains_object(&1));
    assert_eq!(store.all_objects(), vec![]);
}

/// The end-to-end multi-store walkthrough.
pub fn multi_store_scenario_works<S: MultiObjectStore<Object = User>>(store: &S) {
    store.save(&User::john()).unwrap();
    assert_eq!(store.objects_count(), 1);

    let mut modified = User::john();
    modified.last_name = "Smith".to_string();
    store.save(&modified).unwrap();
    assert_eq!(store.objects_count(), 1);
    assert_eq!(store.object(&1).unwrap().last_name, "Smith");

    store.save_all(&[User::johnson(), User::james()]).unwrap();
    assert_eq!(store.objects_count(), 3);

    store.remove_ids(&[1, 2, 99]).unwrap();
    assert_eq!(store.objects_count(), 1);
    assert_eq!(store.all_objects(), vec![User::james()]);

    store.remove_all().unwrap();
    assert_eq!(store.objects_count(), 0);
    assert_eq!(store.all_objects(), vec![]);
}

/// The end-to-end single-store walkthrough, including optional saves.
pub fn single_store_scenario_works<S: SingleObjectStore<Object = User>>(store: &S) {
    store.save_optional(None).unwrap();
    assert!(store.object().is_none());

    store.save_optional(Some(&User::john())).unwrap();
    assert_eq!(store.object(), Some(User::john()));

    store.save_optional(None).unwrap();
    assert!(store.object().is_none());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_user_fails_json_encoding() {
        let result = serde_json::to_vec(&User::invalid());
        assert!(result.is_err());
    }

    #[test]
    fn valid_users_roundtrip_through_json() {
        let bytes = serde_json::to_vec(&User::john()).unwrap();
        let recovered: User = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(recovered, User::john());
        assert_eq!(recovered.first_name, "John");
    }

    #[test]
    fn fake_error_injection_fails_mutations_only() {
        let store = MultiObjectStoreFake::new();
        store.save(&User::john()).unwrap();

        store.set_error(Some("Invalid."));
        assert!(store.save(&User::johnson()).is_err());
        assert!(store.remove(&1).is_err());
        assert!(store.remove_all().is_err());

        // Accessors keep working against the last good state.
        assert_eq!(store.objects_count(), 1);
        assert_eq!(store.object(&1), Some(User::john()));

        store.set_error(None);
        store.save(&User::johnson()).unwrap();
        assert_eq!(store.objects_count(), 2);
    }

    #[test]
    fn multi_fake_satisfies_contract() {
        idempotent_overwrite_works(&MultiObjectStoreFake::new());
        counter_consistency_works(&MultiObjectStoreFake::new());
        remove_absent_id_is_noop(&MultiObjectStoreFake::new());
        multi_store_scenario_works(&MultiObjectStoreFake::new());
    }

    #[test]
    fn single_fake_satisfies_contract() {
        single_store_scenario_works(&SingleObjectStoreFake::new());
    }
}
