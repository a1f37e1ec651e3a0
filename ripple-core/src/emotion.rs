//! Emotion Engine — exponential decay toward baseline plus event impact.
//!
//! Every emotion component lives in `[-1, 1]` (neutral = 0). Between
//! events an agent's feelings relax toward a baseline:
//!
//! ```text
//! e'[i] = b[i] + (e[i] - b[i]) · exp(-rate[i] · Δt)
//! ```
//!
//! with `Δt` the game-hours actually elapsed since the agent was last
//! updated, so agents touched at irregular intervals stay consistent with
//! agents touched every tick (`decay(Δ1) ∘ decay(Δ2) = decay(Δ1 + Δ2)`).
//!
//! Events push emotions by `impact × magnitude`, clamped back into range.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::types::GameTime;
use crate::vector::{EmotionVector, PersonalityVector, Projection, emotion, personality};

/// What emotions relax toward between events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    /// The midpoint of the range (all zeros).
    #[default]
    Neutral,
    /// A per-agent resting mood derived from personality.
    Personality,
}

/// Emotion dynamics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionConfig {
    /// Per-dimension decay rate, per game-hour.
    #[serde(default = "default_decay_rates")]
    pub decay_rates: EmotionVector,
    /// Baseline emotions decay toward.
    #[serde(default)]
    pub baseline: BaselineMode,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            decay_rates: default_decay_rates(),
            baseline: BaselineMode::Neutral,
        }
    }
}

impl EmotionConfig {
    /// Decay rates must be finite and non-negative.
    ///
    /// # Errors
    /// Returns `SimError::Config` naming the first bad dimension.
    pub fn validate(&self) -> Result<()> {
        for (label, rate) in emotion::LABELS.iter().zip(self.decay_rates.iter()) {
            if !rate.is_finite() || *rate < 0.0 {
                return Err(SimError::Config(format!(
                    "decay rate for {label} must be finite and >= 0, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

/// Relax `emotion` toward `baseline` over `elapsed_hours`.
///
/// `elapsed_hours == 0` returns the input unchanged.
///
/// # Errors
/// - [`SimError::NonMonotonicTime`] if `elapsed_hours` is negative.
/// - [`SimError::OutOfRangeValue`] if `elapsed_hours` is not finite.
/// - [`SimError::NumericDrift`] if the result is not finite.
pub fn decay(
    emotion: &EmotionVector,
    elapsed_hours: f64,
    decay_rates: &EmotionVector,
    baseline: &EmotionVector,
) -> Result<EmotionVector> {
    if elapsed_hours < 0.0 {
        return Err(SimError::NonMonotonicTime {
            requested: GameTime::from_hours(elapsed_hours),
            current: GameTime::ZERO,
        });
    }
    if !elapsed_hours.is_finite() {
        return Err(SimError::OutOfRangeValue {
            what: "elapsed time",
            value: elapsed_hours,
        });
    }
    if elapsed_hours == 0.0 {
        return Ok(*emotion);
    }

    let mut out = EmotionVector::zeros();
    for i in 0..emotion::DIM {
        let retention = (-decay_rates[i] * elapsed_hours).exp();
        out[i] = baseline[i] + (emotion[i] - baseline[i]) * retention;
    }
    if !out.is_finite() {
        return Err(SimError::NumericDrift { stage: "emotion decay" });
    }
    Ok(out.clamped(emotion::MIN, emotion::MAX))
}

/// Add `impact × magnitude_scale` and clamp into `[-1, 1]`.
///
/// # Errors
/// Returns [`SimError::NumericDrift`] if the sum is not finite.
pub fn apply_impact(
    emotion: &EmotionVector,
    impact: &EmotionVector,
    magnitude_scale: f64,
) -> Result<EmotionVector> {
    let shifted = emotion.zip_with(impact, |e, d| e + d * magnitude_scale);
    if !shifted.is_finite() {
        return Err(SimError::NumericDrift { stage: "emotion impact" });
    }
    Ok(shifted.clamped(emotion::MIN, emotion::MAX))
}

/// Big Five → resting emotion (rows follow `emotion::LABELS`).
///
/// Openness lifts surprise and anticipation, conscientiousness and
/// agreeableness lift trust, extraversion lifts joy, neuroticism lifts
/// sadness, fear and anger.
const PERSONALITY_TO_BASELINE: Projection<{ personality::DIM }> = Projection::new([
    [0.1, 0.1, 0.3, 0.2, -0.2],
    [0.0, 0.0, -0.1, 0.0, 0.3],
    [0.0, 0.0, 0.0, -0.2, 0.2],
    [0.0, 0.0, -0.1, 0.0, 0.3],
    [0.2, 0.0, 0.1, 0.0, 0.0],
    [0.0, 0.0, 0.0, -0.1, 0.1],
    [0.1, 0.3, 0.1, 0.3, -0.2],
    [0.3, 0.1, 0.1, 0.0, 0.0],
]);

/// Resting emotion implied by a personality, clamped into range.
#[must_use]
pub fn personality_baseline(personality: &PersonalityVector) -> EmotionVector {
    PERSONALITY_TO_BASELINE
        .apply(personality)
        .clamped(emotion::MIN, emotion::MAX)
}

/// Emotion dynamics bound to a configuration.
#[derive(Debug, Clone, Default)]
pub struct EmotionEngine {
    config: EmotionConfig,
}

impl EmotionEngine {
    /// Create an engine from configuration.
    #[must_use]
    pub fn new(config: EmotionConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &EmotionConfig {
        &self.config
    }

    /// Baseline for an agent with the given personality.
    #[must_use]
    pub fn baseline_for(&self, personality: &PersonalityVector) -> EmotionVector {
        match self.config.baseline {
            BaselineMode::Neutral => EmotionVector::zeros(),
            BaselineMode::Personality => personality_baseline(personality),
        }
    }

    /// Decay an agent's emotion over `elapsed_hours` using the configured rates.
    ///
    /// # Errors
    /// See [`decay`].
    pub fn decay(
        &self,
        emotion: &EmotionVector,
        personality: &PersonalityVector,
        elapsed_hours: f64,
    ) -> Result<EmotionVector> {
        let baseline = self.baseline_for(personality);
        decay(emotion, elapsed_hours, &self.config.decay_rates, &baseline)
    }
}

/// Faster for startle-type affects, slower for trust.
fn default_decay_rates() -> EmotionVector {
    EmotionVector::new([0.05, 0.02, 0.08, 0.06, 0.2, 0.05, 0.01, 0.04])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EmotionVector {
        EmotionVector::new([0.8, -0.4, 0.3, 0.0, 1.0, -1.0, 0.2, 0.6])
    }

    #[test]
    fn zero_elapsed_is_identity() {
        let e = sample();
        let rates = default_decay_rates();
        let baseline = EmotionVector::new([0.3; 8]);
        let out = decay(&e, 0.0, &rates, &baseline).expect("valid");
        assert_eq!(out, e);
    }

    #[test]
    fn decay_moves_toward_baseline() {
        let e = sample();
        let rates = EmotionVector::new([0.1; 8]);
        let out = decay(&e, 5.0, &rates, &EmotionVector::zeros()).expect("valid");
        for i in 0..emotion::DIM {
            assert!(out[i].abs() <= e[i].abs());
        }
        let expected = 0.8 * (-0.5_f64).exp();
        assert!((out[emotion::JOY] - expected).abs() < 1e-12);
    }

    #[test]
    fn decay_is_a_semigroup() {
        let e = sample();
        let rates = default_decay_rates();
        let baseline = personality_baseline(&PersonalityVector::new([0.7, 0.2, 0.9, 0.4, 0.6]));
        let split = decay(&decay(&e, 3.5, &rates, &baseline).expect("valid"), 8.25, &rates, &baseline)
            .expect("valid");
        let whole = decay(&e, 11.75, &rates, &baseline).expect("valid");
        for i in 0..emotion::DIM {
            assert!((split[i] - whole[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn negative_elapsed_is_rejected() {
        let rates = default_decay_rates();
        let err = decay(&sample(), -1.0, &rates, &EmotionVector::zeros()).expect_err("negative");
        assert!(matches!(err, SimError::NonMonotonicTime { .. }));
        let err = decay(&sample(), f64::NAN, &rates, &EmotionVector::zeros()).expect_err("nan");
        assert!(matches!(err, SimError::OutOfRangeValue { what: "elapsed time", .. }));
    }

    #[test]
    fn impact_is_scaled_and_clamped() {
        let mut impact = EmotionVector::zeros();
        impact[emotion::JOY] = 0.5;
        impact[emotion::FEAR] = -3.0;
        let out = apply_impact(&sample(), &impact, 0.8).expect("finite");
        assert!((out[emotion::JOY] - 1.0).abs() < 1e-12, "0.8 + 0.4 clamps to 1");
        assert!((out[emotion::FEAR] + 1.0).abs() < 1e-12, "0 - 2.4 clamps to -1");
        assert!((out[emotion::TRUST] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn infinite_impact_is_numeric_drift() {
        let impact = EmotionVector::new([f64::INFINITY, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, f64::NEG_INFINITY]);
        let err = apply_impact(&EmotionVector::zeros(), &impact, 1.0).expect_err("inf + -inf");
        assert!(matches!(err, SimError::NumericDrift { .. }));
    }

    #[test]
    fn neurotic_baseline_leans_fearful() {
        let anxious = personality_baseline(&PersonalityVector::new([0.1, 0.1, 0.1, 0.1, 0.9]));
        let calm = personality_baseline(&PersonalityVector::new([0.1, 0.1, 0.1, 0.1, 0.1]));
        assert!(anxious[emotion::FEAR] > calm[emotion::FEAR]);
        assert!(anxious[emotion::JOY] < calm[emotion::JOY]);
    }

    #[test]
    fn engine_uses_configured_baseline() {
        let p = PersonalityVector::new([0.9, 0.9, 0.9, 0.9, 0.0]);
        let neutral = EmotionEngine::default();
        assert_eq!(neutral.baseline_for(&p), EmotionVector::zeros());

        let engine = EmotionEngine::new(EmotionConfig {
            baseline: BaselineMode::Personality,
            ..EmotionConfig::default()
        });
        assert!(engine.baseline_for(&p)[emotion::TRUST] > 0.0);
        let long_after = engine.decay(&EmotionVector::zeros(), &p, 10_000.0).expect("valid");
        assert!((long_after[emotion::TRUST] - engine.baseline_for(&p)[emotion::TRUST]).abs() < 1e-6);
    }

    #[test]
    fn validation_rejects_negative_rates() {
        let mut config = EmotionConfig::default();
        config.decay_rates[emotion::ANGER] = -0.1;
        assert!(config.validate().is_err());
        assert!(EmotionConfig::default().validate().is_ok());
    }
}
