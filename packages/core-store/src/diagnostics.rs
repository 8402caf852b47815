//! The diagnostic sink for failures that are degraded instead of propagated.

use std::fmt;
use std::sync::Mutex;

/// Records the last human-readable error message produced by a failed
/// operation.
///
/// Accessor operations (`object`, `all_objects`, `objects_count`,
/// `contains_object`) must not propagate errors; this sink is their only
/// failure channel. Messages are additionally forwarded to the `log` facade
/// so a subscriber can trace them. Logging is side-channel only and never
/// affects control flow.
pub struct Logger {
    last_output: Mutex<Option<String>>,
}

impl Logger {
    /// Create a new logger with no recorded output.
    pub fn new() -> Self {
        Self {
            last_output: Mutex::new(None),
        }
    }

    /// Record an error raised at `origin` and return the formatted message.
    ///
    /// Never fails; a poisoned slot is recovered rather than propagated.
    pub fn log(&self, origin: &str, error: &dyn fmt::Display) -> String {
        let message = format!("An error occurred in `{}`. Error: {}", origin, error);
        log::error!("{}", message);
        let mut slot = self
            .last_output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(message.clone());
        message
    }

    /// The most recently recorded message, if any.
    pub fn last_output(&self) -> Option<String> {
        self.last_output
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("last_output", &self.last_output())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_formats_origin_and_error() {
        let logger = Logger::new();
        let message = logger.log("MultiBlobStore.object", &"unexpected token");

        assert_eq!(
            message,
            "An error occurred in `MultiBlobStore.object`. Error: unexpected token"
        );
        assert_eq!(logger.last_output(), Some(message));
    }

    #[test]
    fn last_output_tracks_most_recent() {
        let logger = Logger::new();
        assert_eq!(logger.last_output(), None);

        logger.log("a", &"first");
        logger.log("b", &"second");

        assert!(logger.last_output().unwrap().contains("second"));
    }
}
