//! Configuration for the simulation engine.
//!
//! Maps directly to a TOML document with `[intention]`, `[emotion]` and
//! `[propagation]` tables. Every field has a default, so an empty file
//! is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::emotion::EmotionConfig;
use crate::error::{Result, SimError};
use crate::intention::IntentionEngine;
use crate::propagation::PropagationConfig;

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Intention weights, matrices and archetype overrides.
    #[serde(default)]
    pub intention: IntentionEngine,
    /// Emotion decay rates and baseline mode.
    #[serde(default)]
    pub emotion: EmotionConfig,
    /// Locality topology and cascade cutoff.
    #[serde(default)]
    pub propagation: PropagationConfig,
}

impl SimConfig {
    /// Load configuration from a TOML string and validate it.
    ///
    /// # Errors
    /// Returns `SimError::Config` if the TOML is invalid or a value is out of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check finiteness and ranges of every section.
    ///
    /// Vector and matrix shapes are already enforced during deserialisation.
    ///
    /// # Errors
    /// Returns `SimError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.intention.validate()?;
        self.emotion.validate()?;
        self.propagation.validate()
    }
}
