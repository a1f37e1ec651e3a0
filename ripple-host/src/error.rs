//! Error types for the Ripple host layer.

use ripple_core::SimError;
use thiserror::Error;

/// Errors raised by host-side wiring.
#[derive(Error, Debug)]
pub enum HostError {
    /// An engine operation failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// `start` was called on a runner that is already ticking.
    #[error("Tick runner is already running")]
    AlreadyRunning,

    /// Host configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A global tracing subscriber is already installed.
    #[error("Logging init failed: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for host results.
pub type Result<T> = std::result::Result<T, HostError>;
