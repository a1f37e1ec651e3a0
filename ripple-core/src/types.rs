//! Core identity and time types for the Ripple engine.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for an agent (NPC) in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// Create a new random agent ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a world event (origin or derived).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Game-time, measured in game-hours since world creation.
///
/// Independent of wall-clock time. Totally ordered so it can key the
/// event queue directly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GameTime(OrderedFloat<f64>);

impl GameTime {
    /// The start of the world.
    pub const ZERO: Self = Self(OrderedFloat(0.0));

    /// Game-time at `hours` since world creation.
    #[must_use]
    pub const fn from_hours(hours: f64) -> Self {
        Self(OrderedFloat(hours))
    }

    /// Game-time at `days` since world creation (24 game-hours per day).
    #[must_use]
    pub fn from_days(days: f64) -> Self {
        Self::from_hours(days * 24.0)
    }

    /// Hours since world creation.
    #[must_use]
    pub fn hours(self) -> f64 {
        self.0.into_inner()
    }

    /// Game-hours elapsed since `earlier`. Negative if `earlier` is later.
    #[must_use]
    pub fn hours_since(self, earlier: Self) -> f64 {
        self.hours() - earlier.hours()
    }

    /// Whether this timestamp is a usable finite value.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.hours().is_finite()
    }
}

impl Add<f64> for GameTime {
    type Output = Self;

    fn add(self, hours: f64) -> Self {
        Self::from_hours(self.hours() + hours)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}h", self.hours())
    }
}
