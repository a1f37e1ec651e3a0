//! Propagation Engine — expands one occurrence into a bounded cascade.
//!
//! An originating event is delivered at its own tier immediately. Each
//! broader tier in topology order gets one derived copy, delayed by the
//! cumulative hop delay and attenuated by the cumulative product of hop
//! attenuations:
//!
//! ```text
//! deliver_at(k) = created_at + Σ delay(1..=k)
//! magnitude(k)  = base × Π attenuation(1..=k)
//! ```
//!
//! Cutoff: the next tier's magnitude is computed first, and the tier is
//! scheduled only if that magnitude is `>= min_effect`. Otherwise the
//! cascade stops there. The walk is an explicit loop over at most six
//! tiers, so a cascade always terminates with ≤ 6 deliveries.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SimError};
use crate::event::WorldEvent;
use crate::locality::{LocalityTier, LocalityTopology};
use crate::queue::EventQueue;
use crate::types::{EventId, GameTime};

/// Cascade shape configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Hop delay/attenuation per tier.
    #[serde(default)]
    pub topology: LocalityTopology,
    /// Smallest magnitude still worth delivering.
    #[serde(default = "default_min_effect")]
    pub min_effect: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            topology: LocalityTopology::default(),
            min_effect: default_min_effect(),
        }
    }
}

impl PropagationConfig {
    /// Validate the topology and the cutoff (finite, in [0, 1]).
    ///
    /// # Errors
    /// Returns `SimError::Config` describing the problem.
    pub fn validate(&self) -> Result<()> {
        self.topology.validate()?;
        if !(0.0..=1.0).contains(&self.min_effect) {
            return Err(SimError::Config(format!(
                "min_effect must be in [0, 1], got {}",
                self.min_effect
            )));
        }
        Ok(())
    }
}

fn default_min_effect() -> f64 {
    0.01
}

/// One scheduled delivery of a cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delivery {
    /// Event ID of this delivery.
    pub event: EventId,
    /// Tier it is delivered at.
    pub tier: LocalityTier,
    /// When it becomes due.
    pub deliver_at: GameTime,
    /// Impact multiplier.
    pub magnitude: f64,
}

/// Everything one call to [`PropagationEngine::originate`] scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct Cascade {
    /// ID of the originating event (shared by every delivery).
    pub id: EventId,
    /// Deliveries, origin first, narrowest tier to broadest.
    pub deliveries: Vec<Delivery>,
}

/// Plans cascades and schedules them into an [`EventQueue`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PropagationEngine {
    config: PropagationConfig,
}

impl PropagationEngine {
    /// Create an engine from configuration.
    #[must_use]
    pub fn new(config: PropagationConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Compute the full cascade for an originating event without scheduling it.
    ///
    /// The origin keeps its own tier, time and magnitude. Derived events
    /// follow the topology outward until the cutoff or the global tier.
    ///
    /// # Errors
    /// Returns [`SimError::OutOfRangeValue`] if the origin magnitude is
    /// outside (0, 1], or [`SimError::NumericDrift`] for a non-finite impact.
    pub fn plan(&self, origin: WorldEvent) -> Result<Vec<WorldEvent>> {
        let base = origin.magnitude;
        if !(base > 0.0 && base <= 1.0) {
            return Err(SimError::OutOfRangeValue {
                what: "base magnitude",
                value: base,
            });
        }
        if !origin.impact.emotion.is_finite() {
            return Err(SimError::NumericDrift { stage: "impact payload" });
        }

        let topology = &self.config.topology;
        let mut tier = origin.tier;
        let mut delay = 0.0;
        let mut magnitude = base;
        let mut derived = Vec::new();

        while let Some(next) = tier.broader() {
            let Some(hop) = topology.hop_into(next) else {
                break;
            };
            let next_magnitude = magnitude * hop.attenuation;
            if next_magnitude < self.config.min_effect {
                break;
            }
            delay += hop.delay_hours;
            magnitude = next_magnitude;
            derived.push(origin.derive(next, origin.created_at + delay, magnitude));
            tier = next;
        }

        let mut cascade = Vec::with_capacity(derived.len() + 1);
        cascade.push(origin);
        cascade.extend(derived);
        Ok(cascade)
    }

    /// Plan a cascade and insert every delivery into `queue` atomically.
    ///
    /// # Errors
    /// - [`SimError::OutOfRangeValue`] for a bad base magnitude.
    /// - [`SimError::NonMonotonicTime`] if the queue refuses the schedule.
    pub fn originate(&self, origin: WorldEvent, queue: &EventQueue) -> Result<Cascade> {
        let cascade_id = origin.cascade;
        let planned = self.plan(origin)?;
        let deliveries: Vec<Delivery> = planned
            .iter()
            .map(|e| Delivery {
                event: e.id,
                tier: e.tier,
                deliver_at: e.deliver_at,
                magnitude: e.magnitude,
            })
            .collect();

        queue.insert_batch(planned)?;

        debug!(
            cascade = %cascade_id,
            deliveries = deliveries.len(),
            last_tier = %deliveries.last().map_or(LocalityTier::Personal, |d| d.tier),
            "Cascade scheduled"
        );

        Ok(Cascade {
            id: cascade_id,
            deliveries,
        })
    }
}
