//! Error handling module for softshelf
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Catalog loading deliberately does NOT surface errors through these types:
//! it falls back to the built-in catalog instead (see `catalog::load_catalog`).

use thiserror::Error;

/// Main error type for softshelf
#[derive(Error, Debug)]
pub enum ShelfError {
    /// The named package does not exist in the loaded catalog
    #[error("Unknown package: {0}")]
    UnknownPackage(String),

    /// An action was requested that the package's state does not allow
    /// (wrong install state, or another action already in flight)
    #[error("Action rejected: {0}")]
    Action(String),

    /// The descriptor carries no command for the requested action
    #[error("No {action} command configured for {package}")]
    ActionUnavailable { action: String, package: String },

    /// Catalog reload requested while actions are still in flight
    #[error("Cannot reload the catalog while actions are in flight")]
    ReloadBusy,

    /// The worker pool or its channels are gone
    #[error("Executor error: {0}")]
    Executor(String),
}

/// Result type alias for shelf operations
pub type Result<T> = std::result::Result<T, ShelfError>;

impl ShelfError {
    /// Create an executor error
    pub fn executor(msg: impl Into<String>) -> Self {
        Self::Executor(msg.into())
    }

    /// Create an action-unavailable error
    pub fn unavailable(action: impl Into<String>, package: impl Into<String>) -> Self {
        Self::ActionUnavailable {
            action: action.into(),
            package: package.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShelfError::UnknownPackage("vlc".to_string());
        assert_eq!(err.to_string(), "Unknown package: vlc");

        let err = ShelfError::unavailable("update", "GIMP");
        assert_eq!(err.to_string(), "No update command configured for GIMP");
    }

    #[test]
    fn test_error_constructors() {
        let err = ShelfError::executor("channel closed");
        assert!(matches!(err, ShelfError::Executor(_)));
    }
}
