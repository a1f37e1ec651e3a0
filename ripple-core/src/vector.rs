//! Fixed-shape numeric vectors for agent state.
//!
//! Every agent carries five vectors with non-negotiable dimensionality.
//! They are plain `[f64; N]` value types with named index constants, so a
//! shape mismatch is caught when the vector is built (or deserialized),
//! never at some later access.
//!
//! | Kind               | Dim | Range     |
//! |--------------------|-----|-----------|
//! | intention          | 8   | simplex   |
//! | emotion            | 8   | [-1, 1]   |
//! | personality        | 5   | [0, 1]    |
//! | social influence   | 6   | host-set  |
//! | environment        | 4   | host-set  |

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Index, IndexMut};

use crate::error::{Result, SimError};

/// A fixed-length vector of `f64` components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const N: usize>([f64; N]);

/// Behavioural drives, see [`intention`].
pub type IntentionVector = Vector<{ intention::DIM }>;
/// Primary affects, see [`emotion`].
pub type EmotionVector = Vector<{ emotion::DIM }>;
/// Big-Five traits, see [`personality`].
pub type PersonalityVector = Vector<{ personality::DIM }>;
/// External social pressures, see [`social`].
pub type SocialVector = Vector<{ social::DIM }>;
/// Sensed surroundings, see [`environment`].
pub type EnvironmentVector = Vector<{ environment::DIM }>;

impl<const N: usize> Vector<N> {
    /// Dimensionality of this vector kind.
    pub const DIM: usize = N;

    /// Wrap a fixed array.
    #[must_use]
    pub const fn new(values: [f64; N]) -> Self {
        Self(values)
    }

    /// All-zero vector.
    #[must_use]
    pub const fn zeros() -> Self {
        Self([0.0; N])
    }

    /// Uniform distribution: every component `1 / N`.
    #[must_use]
    pub fn uniform() -> Self {
        Self([1.0 / N as f64; N])
    }

    /// Build from a slice, rejecting any length other than `N`.
    ///
    /// # Errors
    /// Returns [`SimError::InvalidVectorShape`] if `values.len() != N`.
    pub fn try_from_slice(kind: &'static str, values: &[f64]) -> Result<Self> {
        let array: [f64; N] = values.try_into().map_err(|_| SimError::InvalidVectorShape {
            kind,
            expected: N,
            actual: values.len(),
        })?;
        Ok(Self(array))
    }

    /// Borrow the underlying components.
    #[must_use]
    pub const fn as_array(&self) -> &[f64; N] {
        &self.0
    }

    /// Iterate over components in index order.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Sum of all components.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Whether every component is finite (no NaN, no infinity).
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Index of the largest component (first one wins on ties).
    #[must_use]
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, v) in self.0.iter().enumerate() {
            if *v > self.0[best] {
                best = i;
            }
        }
        best
    }

    /// Label of the largest component.
    #[must_use]
    pub fn dominant(&self, labels: &[&'static str; N]) -> &'static str {
        labels[self.argmax()]
    }

    /// Clamp every component into `[lo, hi]`.
    #[must_use]
    pub fn clamped(&self, lo: f64, hi: f64) -> Self {
        Self(self.0.map(|v| v.clamp(lo, hi)))
    }

    /// Multiply every component by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.map(|v| v * factor))
    }

    /// Component-wise combination with another vector.
    #[must_use]
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = f(self.0[i], other.0[i]);
        }
        Self(out)
    }

    /// The `k` largest components paired with their labels, largest first.
    #[must_use]
    pub fn top(&self, labels: &[&'static str; N], k: usize) -> Vec<(&'static str, f64)> {
        let mut pairs: Vec<(&'static str, f64)> =
            labels.iter().copied().zip(self.0.iter().copied()).collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        pairs.truncate(k);
        pairs
    }
}

impl<const N: usize> Default for Vector<N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const N: usize> Index<usize> for Vector<N> {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl<const N: usize> IndexMut<usize> for Vector<N> {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.0[index]
    }
}

impl<const N: usize> Serialize for Vector<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

impl<'de, const N: usize> Deserialize<'de> for Vector<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        Self::try_from_slice("vector", &values).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Projection matrices (N inputs → 8 outputs)
// ---------------------------------------------------------------------------

/// Number of rows in every projection (intention and emotion are both 8-dim).
pub const PROJECTION_ROWS: usize = 8;

/// A fixed `8 × N` weight matrix mapping an `N`-vector onto 8 outputs.
///
/// Row `r` holds the weights feeding output component `r`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection<const N: usize>([[f64; N]; PROJECTION_ROWS]);

impl<const N: usize> Projection<N> {
    /// Wrap a fixed row-major array.
    #[must_use]
    pub const fn new(rows: [[f64; N]; PROJECTION_ROWS]) -> Self {
        Self(rows)
    }

    /// All-zero projection.
    #[must_use]
    pub const fn zeros() -> Self {
        Self([[0.0; N]; PROJECTION_ROWS])
    }

    /// Borrow the rows.
    #[must_use]
    pub const fn rows(&self) -> &[[f64; N]; PROJECTION_ROWS] {
        &self.0
    }

    /// Matrix-vector product.
    #[must_use]
    pub fn apply(&self, input: &Vector<N>) -> Vector<PROJECTION_ROWS> {
        let mut out = [0.0; PROJECTION_ROWS];
        for (slot, row) in out.iter_mut().zip(self.0.iter()) {
            *slot = row.iter().zip(input.iter()).map(|(w, x)| w * x).sum();
        }
        Vector::new(out)
    }

    /// Whether every weight is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().flatten().all(|w| w.is_finite())
    }
}

impl<const N: usize> Serialize for Projection<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let rows: Vec<&[f64]> = self.0.iter().map(<[f64; N]>::as_slice).collect();
        rows.serialize(serializer)
    }
}

impl<'de, const N: usize> Deserialize<'de> for Projection<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        if rows.len() != PROJECTION_ROWS {
            return Err(D::Error::custom(SimError::InvalidVectorShape {
                kind: "projection rows",
                expected: PROJECTION_ROWS,
                actual: rows.len(),
            }));
        }
        let mut out = [[0.0; N]; PROJECTION_ROWS];
        for (slot, row) in out.iter_mut().zip(rows.iter()) {
            *slot = Vector::<N>::try_from_slice("projection row", row)
                .map_err(D::Error::custom)?
                .0;
        }
        Ok(Self(out))
    }
}

// ---------------------------------------------------------------------------
// Named components
// ---------------------------------------------------------------------------

/// Intention: what the agent wants to do right now. A probability simplex.
#[allow(missing_docs)]
pub mod intention {
    use super::IntentionVector;
    use crate::error::Result;

    /// Dimensionality.
    pub const DIM: usize = 8;
    pub const SURVIVE: usize = 0;
    pub const SOCIALIZE: usize = 1;
    pub const ACHIEVE: usize = 2;
    pub const EXPLORE: usize = 3;
    pub const CREATE: usize = 4;
    pub const DOMINATE: usize = 5;
    pub const NURTURE: usize = 6;
    pub const ESCAPE: usize = 7;

    /// Component labels in index order.
    pub const LABELS: [&str; DIM] = [
        "survive", "socialize", "achieve", "explore", "create", "dominate", "nurture", "escape",
    ];

    /// Build an intention vector from a slice.
    ///
    /// # Errors
    /// Returns `InvalidVectorShape` unless the slice has 8 components.
    pub fn from_slice(values: &[f64]) -> Result<IntentionVector> {
        IntentionVector::try_from_slice("intention", values)
    }
}

/// Emotion: Plutchik's eight primary affects, each bounded to `[-1, 1]`.
#[allow(missing_docs)]
pub mod emotion {
    use super::EmotionVector;
    use crate::error::Result;

    /// Dimensionality.
    pub const DIM: usize = 8;
    pub const JOY: usize = 0;
    pub const SADNESS: usize = 1;
    pub const ANGER: usize = 2;
    pub const FEAR: usize = 3;
    pub const SURPRISE: usize = 4;
    pub const DISGUST: usize = 5;
    pub const TRUST: usize = 6;
    pub const ANTICIPATION: usize = 7;

    /// Lower bound of every emotion component.
    pub const MIN: f64 = -1.0;
    /// Upper bound of every emotion component.
    pub const MAX: f64 = 1.0;

    /// Component labels in index order.
    pub const LABELS: [&str; DIM] = [
        "joy", "sadness", "anger", "fear", "surprise", "disgust", "trust", "anticipation",
    ];

    /// Build an emotion vector from a slice.
    ///
    /// # Errors
    /// Returns `InvalidVectorShape` unless the slice has 8 components.
    pub fn from_slice(values: &[f64]) -> Result<EmotionVector> {
        EmotionVector::try_from_slice("emotion", values)
    }
}

/// Personality: Big-Five traits, set at creation and never touched by the engine.
#[allow(missing_docs)]
pub mod personality {
    use super::PersonalityVector;
    use crate::error::Result;

    /// Dimensionality.
    pub const DIM: usize = 5;
    pub const OPENNESS: usize = 0;
    pub const CONSCIENTIOUSNESS: usize = 1;
    pub const EXTRAVERSION: usize = 2;
    pub const AGREEABLENESS: usize = 3;
    pub const NEUROTICISM: usize = 4;

    /// Component labels in index order.
    pub const LABELS: [&str; DIM] = [
        "openness",
        "conscientiousness",
        "extraversion",
        "agreeableness",
        "neuroticism",
    ];

    /// Build a personality vector from a slice.
    ///
    /// # Errors
    /// Returns `InvalidVectorShape` unless the slice has 5 components.
    pub fn from_slice(values: &[f64]) -> Result<PersonalityVector> {
        PersonalityVector::try_from_slice("personality", values)
    }
}

/// Social influence: external pressures supplied by the host world.
#[allow(missing_docs)]
pub mod social {
    use super::SocialVector;
    use crate::error::Result;

    /// Dimensionality.
    pub const DIM: usize = 6;
    pub const CULTURAL_CONFORMITY: usize = 0;
    pub const ECONOMIC_PRESSURE: usize = 1;
    pub const FASHION_AWARENESS: usize = 2;
    pub const STATUS_SEEKING: usize = 3;
    pub const RELIGIOUS_DEVOTION: usize = 4;
    pub const POLITICAL_ALIGNMENT: usize = 5;

    /// Component labels in index order.
    pub const LABELS: [&str; DIM] = [
        "cultural_conformity",
        "economic_pressure",
        "fashion_awareness",
        "status_seeking",
        "religious_devotion",
        "political_alignment",
    ];

    /// Build a social-influence vector from a slice.
    ///
    /// # Errors
    /// Returns `InvalidVectorShape` unless the slice has 6 components.
    pub fn from_slice(values: &[f64]) -> Result<SocialVector> {
        SocialVector::try_from_slice("social_influence", values)
    }
}

/// Environment: conditions the agent senses around it.
#[allow(missing_docs)]
pub mod environment {
    use super::EnvironmentVector;
    use crate::error::Result;

    /// Dimensionality.
    pub const DIM: usize = 4;
    pub const SAFETY: usize = 0;
    pub const RESOURCE_ABUNDANCE: usize = 1;
    pub const WEATHER_COMFORT: usize = 2;
    pub const CROWDING: usize = 3;

    /// Component labels in index order.
    pub const LABELS: [&str; DIM] = ["safety", "resource_abundance", "weather_comfort", "crowding"];

    /// Build an environment vector from a slice.
    ///
    /// # Errors
    /// Returns `InvalidVectorShape` unless the slice has 4 components.
    pub fn from_slice(values: &[f64]) -> Result<EnvironmentVector> {
        EnvironmentVector::try_from_slice("environment", values)
    }
}
