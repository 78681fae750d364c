//! Error types for section synchronization.

use horizon_sections_core::DispatchError;

/// Result type alias for synchronization operations.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur while synchronizing a sectioned view.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A numeric action code outside the five known change kinds.
    #[error("Unknown collection change action code {0}")]
    UnknownAction(i32),

    /// The synchronizer has been disposed.
    #[error("Section synchronizer has been disposed")]
    Disposed,

    /// The serialization context rejected the work.
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// The configuration could not be parsed.
    #[error("Failed to parse synchronizer configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration parsed but holds an invalid value.
    #[error("Invalid synchronizer configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SyncError::UnknownAction(9).to_string(),
            "Unknown collection change action code 9"
        );
        let err: SyncError = DispatchError::QueueClosed.into();
        assert_eq!(err.to_string(), "Dispatch failed: Dispatch queue is closed");
        assert!(SyncError::invalid_config("name is empty")
            .to_string()
            .ends_with("name is empty"));
    }
}
