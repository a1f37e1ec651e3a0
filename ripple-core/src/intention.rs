//! Intention Engine — what an agent wants to do right now.
//!
//! Recomputed every tick the agent is touched, from its other vectors:
//!
//! ```text
//! raw = w_p · M_p · personality
//!     + w_e · M_e · emotion
//!     + w_s · M_s · social_influence
//!     + w_env · M_env · environment
//!     + w_m · previous_intention          (momentum, default 0)
//!
//! intention = normalize(raw)
//! ```
//!
//! Normalization projects onto the probability simplex: negative
//! components are clipped to 0 and the rest scaled to sum to 1. A raw
//! vector with nothing positive in it falls back to the uniform
//! distribution.
//!
//! Pure linear algebra, no hidden state: identical inputs give identical
//! outputs, which the cascade tests rely on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SimError};
use crate::vector::{
    EmotionVector, EnvironmentVector, IntentionVector, PersonalityVector, Projection,
    SocialVector, emotion, environment, personality, social,
};

/// Tunable weights and projection matrices for one agent archetype.
///
/// Game designers adjust these per archetype to create different
/// behavioural profiles (a guard leaning to "survive" and "dominate",
/// a merchant to "achieve" and "socialize").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentionWeights {
    /// Weight of the personality projection.
    #[serde(default = "default_w_personality")]
    pub personality: f64,
    /// Weight of the emotion projection.
    #[serde(default = "default_w_emotion")]
    pub emotion: f64,
    /// Weight of the social-influence projection.
    #[serde(default = "default_w_social")]
    pub social: f64,
    /// Weight of the environment projection.
    #[serde(default = "default_w_environment")]
    pub environment: f64,
    /// Weight of the previous intention (inertia). 0 disables it.
    #[serde(default)]
    pub momentum: f64,
    /// Personality (5) → intention (8).
    #[serde(default = "default_m_personality")]
    pub m_personality: Projection<{ personality::DIM }>,
    /// Emotion (8) → intention (8).
    #[serde(default = "default_m_emotion")]
    pub m_emotion: Projection<{ emotion::DIM }>,
    /// Social influence (6) → intention (8).
    #[serde(default = "default_m_social")]
    pub m_social: Projection<{ social::DIM }>,
    /// Environment (4) → intention (8).
    #[serde(default = "default_m_environment")]
    pub m_environment: Projection<{ environment::DIM }>,
}

impl Default for IntentionWeights {
    fn default() -> Self {
        Self {
            personality: default_w_personality(),
            emotion: default_w_emotion(),
            social: default_w_social(),
            environment: default_w_environment(),
            momentum: 0.0,
            m_personality: default_m_personality(),
            m_emotion: default_m_emotion(),
            m_social: default_m_social(),
            m_environment: default_m_environment(),
        }
    }
}

impl IntentionWeights {
    /// Check that every weight is finite and the momentum non-negative.
    ///
    /// # Errors
    /// Returns `SimError::Config` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("personality", self.personality),
            ("emotion", self.emotion),
            ("social", self.social),
            ("environment", self.environment),
            ("momentum", self.momentum),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(SimError::Config(format!("intention weight {name} is not finite")));
            }
        }
        if self.momentum < 0.0 {
            return Err(SimError::Config("intention momentum must be >= 0".to_string()));
        }
        if !(self.m_personality.is_finite()
            && self.m_emotion.is_finite()
            && self.m_social.is_finite()
            && self.m_environment.is_finite())
        {
            return Err(SimError::Config("intention matrix contains a non-finite weight".to_string()));
        }
        Ok(())
    }
}

/// Compute a fresh intention vector from an agent's other vectors.
///
/// # Errors
/// Returns [`SimError::NumericDrift`] if the raw combination is not finite.
pub fn compute_intention(
    personality: &PersonalityVector,
    emotion: &EmotionVector,
    social_influence: &SocialVector,
    environment: &EnvironmentVector,
    weights: &IntentionWeights,
) -> Result<IntentionVector> {
    let raw = raw_intention(personality, emotion, social_influence, environment, weights);
    normalize(&raw)
}

/// [`compute_intention`] plus the momentum term `w_m · previous`.
///
/// With `weights.momentum == 0` this is exactly [`compute_intention`].
///
/// # Errors
/// Returns [`SimError::NumericDrift`] if the raw combination is not finite.
pub fn compute_intention_with_momentum(
    personality: &PersonalityVector,
    emotion: &EmotionVector,
    social_influence: &SocialVector,
    environment: &EnvironmentVector,
    previous: &IntentionVector,
    weights: &IntentionWeights,
) -> Result<IntentionVector> {
    let mut raw = raw_intention(personality, emotion, social_influence, environment, weights);
    if weights.momentum > 0.0 {
        raw = raw.zip_with(previous, |r, p| r + weights.momentum * p);
    }
    normalize(&raw)
}

fn raw_intention(
    personality: &PersonalityVector,
    emotion: &EmotionVector,
    social_influence: &SocialVector,
    environment: &EnvironmentVector,
    w: &IntentionWeights,
) -> IntentionVector {
    let p = w.m_personality.apply(personality).scaled(w.personality);
    let e = w.m_emotion.apply(emotion).scaled(w.emotion);
    let s = w.m_social.apply(social_influence).scaled(w.social);
    let env = w.m_environment.apply(environment).scaled(w.environment);
    p.zip_with(&e, |a, b| a + b)
        .zip_with(&s, |a, b| a + b)
        .zip_with(&env, |a, b| a + b)
}

/// Project a raw vector onto the probability simplex.
///
/// Components are divided by the largest one before summing, so raw
/// vectors anywhere in the finite range (subnormal or near `f64::MAX`)
/// normalise without the total underflowing or overflowing.
///
/// # Errors
/// Returns [`SimError::NumericDrift`] if `raw` holds NaN or infinity.
pub fn normalize(raw: &IntentionVector) -> Result<IntentionVector> {
    if !raw.is_finite() {
        return Err(SimError::NumericDrift { stage: "intention" });
    }
    let clipped = raw.clamped(0.0, f64::INFINITY);
    let peak = clipped.iter().copied().fold(0.0, f64::max);
    if peak <= 0.0 {
        return Ok(IntentionVector::uniform());
    }
    // Every component lands in [0, 1] and at least one is exactly 1.
    let relative = IntentionVector::new(std::array::from_fn(|i| clipped[i] / peak));
    let total = relative.sum();
    let out = IntentionVector::new(std::array::from_fn(|i| relative[i] / total));
    if !out.is_finite() {
        return Err(SimError::NumericDrift { stage: "intention" });
    }
    Ok(out)
}

/// Per-archetype intention weights with a fallback default set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentionEngine {
    /// Weights used for any archetype without its own entry.
    #[serde(default)]
    pub default: IntentionWeights,
    /// Named archetype overrides ("guard", "merchant", ...).
    #[serde(default)]
    pub archetypes: BTreeMap<String, IntentionWeights>,
}

impl IntentionEngine {
    /// Create an engine with only the given default weights.
    #[must_use]
    pub fn new(default: IntentionWeights) -> Self {
        Self {
            default,
            archetypes: BTreeMap::new(),
        }
    }

    /// Register (or replace) the weights for an archetype.
    pub fn register_archetype(&mut self, name: impl Into<String>, weights: IntentionWeights) {
        self.archetypes.insert(name.into(), weights);
    }

    /// Weights for `archetype`, falling back to the default set.
    #[must_use]
    pub fn weights_for(&self, archetype: &str) -> &IntentionWeights {
        self.archetypes.get(archetype).unwrap_or(&self.default)
    }

    /// Validate the default set and every archetype.
    ///
    /// # Errors
    /// Returns `SimError::Config` for the first invalid weight set.
    pub fn validate(&self) -> Result<()> {
        self.default.validate()?;
        for (name, weights) in &self.archetypes {
            weights
                .validate()
                .map_err(|e| SimError::Config(format!("archetype {name}: {e}")))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Default weights: hand-authored, rows follow intention::LABELS order
// (survive, socialize, achieve, explore, create, dominate, nurture, escape).
// ---------------------------------------------------------------------------

fn default_w_personality() -> f64 { 0.3 }
fn default_w_emotion() -> f64 { 0.3 }
fn default_w_social() -> f64 { 0.2 }
fn default_w_environment() -> f64 { 0.2 }

/// Columns: openness, conscientiousness, extraversion, agreeableness, neuroticism.
fn default_m_personality() -> Projection<{ personality::DIM }> {
    Projection::new([
        [0.0, 0.2, 0.0, 0.0, 0.4],
        [0.1, 0.0, 0.6, 0.3, 0.0],
        [0.1, 0.6, 0.1, 0.0, 0.0],
        [0.6, 0.0, 0.2, 0.0, 0.0],
        [0.5, 0.1, 0.0, 0.0, 0.1],
        [0.0, 0.1, 0.3, -0.3, 0.1],
        [0.0, 0.1, 0.1, 0.6, 0.0],
        [0.0, -0.1, -0.1, 0.0, 0.5],
    ])
}

/// Columns: joy, sadness, anger, fear, surprise, disgust, trust, anticipation.
fn default_m_emotion() -> Projection<{ emotion::DIM }> {
    Projection::new([
        [0.0, 0.1, 0.0, 0.5, 0.1, 0.0, 0.0, 0.0],
        [0.6, -0.2, -0.2, -0.1, 0.1, -0.1, 0.4, 0.1],
        [0.2, -0.1, 0.1, -0.1, 0.0, 0.0, 0.0, 0.5],
        [0.2, 0.0, 0.0, -0.2, 0.4, 0.0, 0.0, 0.4],
        [0.3, 0.1, 0.0, 0.0, 0.2, 0.0, 0.0, 0.2],
        [0.0, 0.0, 0.6, -0.1, 0.0, 0.2, -0.2, 0.0],
        [0.4, 0.2, -0.2, 0.0, 0.0, 0.0, 0.4, 0.0],
        [-0.2, 0.3, 0.0, 0.6, 0.1, 0.4, -0.2, 0.0],
    ])
}

/// Columns: conformity, economic pressure, fashion, status seeking, religion, politics.
fn default_m_social() -> Projection<{ social::DIM }> {
    Projection::new([
        [0.0, 0.4, 0.0, 0.0, 0.0, 0.0],
        [0.3, 0.0, 0.3, 0.2, 0.1, 0.0],
        [0.0, 0.4, 0.0, 0.5, 0.0, 0.1],
        [-0.2, 0.0, 0.1, 0.0, 0.0, 0.0],
        [-0.1, 0.0, 0.3, 0.0, 0.1, 0.0],
        [0.0, 0.1, 0.0, 0.4, 0.0, 0.4],
        [0.2, 0.0, 0.0, 0.0, 0.4, 0.0],
        [0.0, 0.3, 0.0, 0.0, 0.0, 0.1],
    ])
}

/// Columns: safety, resource abundance, weather comfort, crowding.
fn default_m_environment() -> Projection<{ environment::DIM }> {
    Projection::new([
        [-0.5, -0.4, -0.1, 0.0],
        [0.2, 0.0, 0.2, 0.2],
        [0.1, 0.3, 0.0, 0.0],
        [0.2, 0.1, 0.3, -0.2],
        [0.2, 0.2, 0.1, -0.1],
        [0.0, -0.1, 0.0, 0.2],
        [0.3, 0.2, 0.0, 0.0],
        [-0.4, -0.1, -0.2, 0.4],
    ])
}
