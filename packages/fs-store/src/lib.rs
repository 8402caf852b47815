//! Directory-tree repository for stowage stores.
//!
//! Each namespace is a directory under a caller-provided root; each blob is
//! one file inside it. File names are the base64url encoding of the entry
//! key, so two identities that differ only by case or by path-significant
//! characters map to distinct files even on case-insensitive or
//! path-normalizing filesystems.
//!
//! Key enumeration is sorted by last-modified time, so
//! `MultiObjectStore::all_objects` over this backend returns records oldest
//! write first.
//!
//! Store instances sharing a root and identifier are views of the same
//! directory, but this backend does not serialize access across instances;
//! it relies on filesystem semantics for concurrent handles.

use std::path::{Path, PathBuf};
use std::{fs, io};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use stowage_blob_store::{BlobError, BlobRepository};
use stowage_core_store::{Identifiable, MultiBlobStore, SingleBlobStore, StoreError};

/// Access policy attached to blobs at write time.
///
/// A closed set of tags mapped to file permission bits on Unix; ignored on
/// other platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Readable and writable by the owning user only.
    Private,
    /// Additionally readable by the owning group.
    GroupReadable,
    /// Readable by everyone.
    WorldReadable,
}

impl AccessPolicy {
    #[cfg(unix)]
    fn mode(self) -> u32 {
        match self {
            AccessPolicy::Private => 0o600,
            AccessPolicy::GroupReadable => 0o640,
            AccessPolicy::WorldReadable => 0o644,
        }
    }
}

/// A [`BlobRepository`] over a directory tree.
pub struct FsRepository {
    root: PathBuf,
    policy: AccessPolicy,
}

impl FsRepository {
    /// Create a repository rooted at an existing writable directory, with
    /// the [`AccessPolicy::Private`] write policy.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, BlobError> {
        Self::with_policy(root, AccessPolicy::Private)
    }

    /// Create a repository with an explicit write policy.
    ///
    /// Fails if the root does not exist, is not a directory, or is not
    /// writable.
    pub fn with_policy(root: impl Into<PathBuf>, policy: AccessPolicy) -> Result<Self, BlobError> {
        let root = root.into();
        let attr = fs::metadata(&root)?;

        if !attr.is_dir() {
            return Err(BlobError::repository(format!(
                "root path '{}' must be a directory",
                root.display()
            )));
        }
        if attr.permissions().readonly() {
            return Err(BlobError::repository(format!(
                "root directory '{}' must be writable",
                root.display()
            )));
        }

        let root = root.canonicalize()?;
        Ok(Self { root, policy })
    }

    /// The canonicalized root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(namespace)
    }

    fn blob_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.namespace_dir(namespace).join(URL_SAFE_NO_PAD.encode(key))
    }

    fn decode_file_name(name: &std::ffi::OsStr) -> Option<String> {
        let encoded = name.to_str()?;
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl BlobRepository for FsRepository {
    fn put(&self, namespace: &str, key: &str, bytes: Bytes) -> Result<(), BlobError> {
        use std::io::Write as _;

        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir)?;
        let path = self.blob_path(namespace, key);
        log::debug!("Writing {}...", path.display());

        // Write to a sibling temp file and rename into place: the blob is
        // never observable with default permissions or partial content.
        let mut staged = tempfile::NamedTempFile::new_in(&dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(self.policy.mode()))?;
        }

        staged.write_all(&bytes)?;
        staged.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn get(&self, namespace: &str, key: &str) -> Option<Bytes> {
        let path = self.blob_path(namespace, key);
        match fs::read(&path) {
            Ok(bytes) => Some(Bytes::from(bytes)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                log::warn!("Failed to read {}: {}", path.display(), error);
                None
            }
        }
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), BlobError> {
        let path = self.blob_path(namespace, key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.blob_path(namespace, key).is_file()
    }

    fn keys(&self, namespace: &str) -> Vec<String> {
        let dir = self.namespace_dir(namespace);
        if !dir.is_dir() {
            return Vec::new();
        }

        walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            // Oldest write first; fall back to name order when timestamps
            // are unavailable or equal.
            .sort_by(|a, b| {
                let a_modified = a.metadata().ok().and_then(|m| m.modified().ok());
                let b_modified = b.metadata().ok().and_then(|m| m.modified().ok());
                match (a_modified, b_modified) {
                    (Some(a_time), Some(b_time)) => a_time
                        .cmp(&b_time)
                        .then_with(|| a.file_name().cmp(b.file_name())),
                    _ => a.file_name().cmp(b.file_name()),
                }
            })
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| Self::decode_file_name(entry.file_name()))
            .collect()
    }

    fn delete_namespace(&self, namespace: &str) -> Result<(), BlobError> {
        let dir = self.namespace_dir(namespace);
        log::debug!("Removing {}...", dir.display());
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// A multi-object store over a directory tree.
pub type MultiFsStore<T> = MultiBlobStore<T, FsRepository>;

/// A single-object store over a directory tree.
pub type SingleFsStore<T> = SingleBlobStore<T, FsRepository>;

/// Create a multi-object store rooted at an existing writable directory.
pub fn multi_store<T>(
    root: impl Into<PathBuf>,
    identifier: &str,
) -> Result<MultiFsStore<T>, StoreError>
where
    T: Identifiable + Serialize + DeserializeOwned,
{
    let repository = FsRepository::new(root)?;
    MultiBlobStore::new(repository, identifier)
}

/// Create a single-object store rooted at an existing writable directory.
pub fn single_store<T>(
    root: impl Into<PathBuf>,
    identifier: &str,
) -> Result<SingleFsStore<T>, StoreError>
where
    T: Serialize + DeserializeOwned,
{
    let repository = FsRepository::new(root)?;
    SingleBlobStore::new(repository, identifier)
}
