//! Error types for the Ripple core engine.

use thiserror::Error;

use crate::types::{AgentId, EventId, GameTime};

/// Top-level error type for all Ripple core operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// A vector's dimensionality does not match its fixed contract.
    #[error("Invalid vector shape for {kind}: expected {expected} components, got {actual}")]
    InvalidVectorShape {
        /// Which vector kind was being built.
        kind: &'static str,
        /// Dimensionality the kind requires.
        expected: usize,
        /// Dimensionality that was supplied.
        actual: usize,
    },

    /// An input value lies outside its legal range.
    #[error("Value out of range for {what}: {value}")]
    OutOfRangeValue {
        /// What the value was meant to be.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Scheduling or clock movement that would run time backward.
    #[error("Non-monotonic time: requested {requested}, current {current}")]
    NonMonotonicTime {
        /// The time that was asked for.
        requested: GameTime,
        /// The time it must not precede.
        current: GameTime,
    },

    /// A computation produced NaN or infinity.
    #[error("Numeric drift during {stage}")]
    NumericDrift {
        /// Which computation stage drifted.
        stage: &'static str,
    },

    /// No agent with the given ID is registered.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An agent with the given ID is already registered.
    #[error("Agent already registered: {0}")]
    DuplicateAgent(AgentId),

    /// The event is not (or no longer) waiting in the queue.
    #[error("Event not pending: {0}")]
    EventNotPending(EventId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SimError>;
