//! Simulation clock — the single authority over game-time.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::GameTime;

/// What the driver is doing right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockPhase {
    /// Between ticks.
    #[default]
    Idle,
    /// Recomputing touched agents after the queue drained.
    Advancing,
    /// Popping and applying due events.
    Draining,
}

/// Current game-time and tick phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    now: GameTime,
    phase: ClockPhase,
}

impl SimulationClock {
    /// A clock starting at `start`.
    #[must_use]
    pub fn starting_at(start: GameTime) -> Self {
        Self {
            now: start,
            phase: ClockPhase::Idle,
        }
    }

    /// Current game-time.
    #[must_use]
    pub fn now(&self) -> GameTime {
        self.now
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    /// Reject any `target` before the current time.
    ///
    /// # Errors
    /// Returns [`SimError::NonMonotonicTime`] if `target < now`, or
    /// [`SimError::OutOfRangeValue`] if it is not finite.
    pub fn check_target(&self, target: GameTime) -> Result<()> {
        if !target.is_finite() {
            return Err(SimError::OutOfRangeValue {
                what: "tick target",
                value: target.hours(),
            });
        }
        if target < self.now {
            return Err(SimError::NonMonotonicTime {
                requested: target,
                current: self.now,
            });
        }
        Ok(())
    }

    pub(crate) fn enter(&mut self, phase: ClockPhase) {
        self.phase = phase;
    }

    /// Move to `target` and go idle. Callers check the target first.
    pub(crate) fn finish_at(&mut self, target: GameTime) {
        debug_assert!(target >= self.now);
        self.now = target;
        self.phase = ClockPhase::Idle;
    }
}
