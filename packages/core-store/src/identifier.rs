//! Store identifier validation and key/namespace derivation.
//!
//! Data keys carry the `obj:` prefix and the multi-store counter lives at
//! `meta:count`, so a record identity can never collide with store metadata.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::StoreError;

/// Prefix for entry keys holding record bytes.
pub(crate) const OBJECT_KEY_PREFIX: &str = "obj:";

/// Key of the durable entry-count entry in a multi store's namespace.
pub(crate) const COUNTER_KEY: &str = "meta:count";

/// Sentinel identity used by single-object stores.
pub(crate) const SINGLE_SENTINEL: &str = "object";

/// Check that an identifier can be used as a store namespace.
///
/// Accepted identifiers are non-empty, start with an ASCII letter or digit,
/// and contain only ASCII letters, digits, `.`, `_`, and `-`. The restricted
/// alphabet keeps identifiers portable across backends whose native storage
/// is path-based or case-normalizing.
pub fn validate_identifier(identifier: &str) -> Result<(), StoreError> {
    lazy_static! {
        static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
    }

    if IDENTIFIER.is_match(identifier) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier {
            identifier: identifier.to_string(),
        })
    }
}

/// Namespace for a multi-object store with the given identifier.
///
/// Single and multi stores sharing an identifier get distinct namespaces.
pub(crate) fn multi_namespace(identifier: &str) -> String {
    format!("multi.{}", identifier)
}

/// Namespace for a single-object store with the given identifier.
pub(crate) fn single_namespace(identifier: &str) -> String {
    format!("single.{}", identifier)
}

/// Entry key for a record identity.
pub(crate) fn object_key(id: &impl fmt::Display) -> String {
    format!("{}{}", OBJECT_KEY_PREFIX, id)
}

/// Whether a repository key addresses record bytes (as opposed to metadata).
pub(crate) fn is_object_key(key: &str) -> bool {
    key.starts_with(OBJECT_KEY_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_identifiers() {
        for identifier in ["users", "users-v2", "com.example.cache", "a", "0", "A_b.c-d"] {
            assert!(validate_identifier(identifier).is_ok(), "{}", identifier);
        }
    }

    #[test]
    fn rejects_invalid_identifiers() {
        for identifier in ["", " ", "a b", "users/legacy", ".hidden", "-dash", "名前"] {
            assert!(
                matches!(
                    validate_identifier(identifier),
                    Err(StoreError::InvalidIdentifier { .. })
                ),
                "{}",
                identifier
            );
        }
    }

    #[test]
    fn namespaces_are_disjoint_per_kind() {
        assert_ne!(multi_namespace("users"), single_namespace("users"));
    }

    #[test]
    fn counter_key_never_collides_with_identities() {
        // Even an identity rendering as "count" or "meta:count" maps into the
        // obj: prefix, away from the counter entry.
        assert_ne!(object_key(&"count"), COUNTER_KEY);
        assert_ne!(object_key(&"meta:count"), COUNTER_KEY);
        assert!(is_object_key(&object_key(&42)));
        assert!(!is_object_key(COUNTER_KEY));
    }
}
