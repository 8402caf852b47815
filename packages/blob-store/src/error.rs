//! Error types for the blob layer.
//!
//! Errors at this level are transport-focused. No semantic errors like
//! "record failed to decode" - those belong in higher layers.

/// Errors raised by a [`crate::BlobRepository`].
///
/// These are storage and system-level failures only: permissions, missing
/// volumes, platform status codes. Codec failures and identity semantics
/// belong in higher layers.
#[derive(thiserror::Error, Debug)]
pub enum BlobError {
    /// An I/O failure from the underlying storage medium.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected the operation with a platform-specific reason.
    #[error("repository failure: {message}")]
    Repository { message: String },
}

impl BlobError {
    /// Convenience constructor for platform-specific rejections.
    pub fn repository(message: impl Into<String>) -> Self {
        BlobError::Repository {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_works() {
        let e = BlobError::repository("volume is read-only");
        assert_eq!(format!("{}", e), "repository failure: volume is read-only");
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: BlobError = io_err.into();
        assert!(matches!(e, BlobError::Io(_)));
        assert!(format!("{}", e).contains("denied"));
    }
}
