//! Error types for Horizon Sections core.

use std::fmt;

/// Errors raised by the serial dispatch queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The queue has been closed and no longer accepts work.
    QueueClosed,
    /// An operation that must run on the queue's thread was called elsewhere.
    WrongThread,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueClosed => write!(f, "Dispatch queue is closed"),
            Self::WrongThread => {
                write!(f, "Operation must run on the dispatch queue's thread")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    InvalidConnection,
    /// The signal has been dropped and is no longer available.
    SignalDropped,
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConnection => write!(f, "Invalid or disconnected connection ID"),
            Self::SignalDropped => write!(f, "Signal has been dropped"),
        }
    }
}

impl std::error::Error for SignalError {}

/// A specialized Result type for core dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_display() {
        assert_eq!(DispatchError::QueueClosed.to_string(), "Dispatch queue is closed");
        assert!(DispatchError::WrongThread.to_string().contains("thread"));
    }

    #[test]
    fn test_signal_error_display() {
        assert_eq!(
            SignalError::SignalDropped.to_string(),
            "Signal has been dropped"
        );
    }
}
