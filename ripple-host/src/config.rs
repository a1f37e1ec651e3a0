//! Host configuration: engine settings plus runner and logging.
//!
//! One TOML file drives everything. The engine tables (`[intention]`,
//! `[emotion]`, `[propagation]`) sit at the top level, next to the host
//! tables:
//!
//! ```toml
//! [runner]
//! interval_ms = 500
//! delta_hours = 0.5
//!
//! [logging]
//! level = "ripple_core=debug,info"
//! json = true
//!
//! [propagation]
//! min_effect = 0.02
//! ```

use std::time::Duration;

use ripple_core::{GameTime, LocalityResolver, SimConfig, Simulation};
use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// Top-level host configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Engine configuration.
    #[serde(flatten)]
    pub simulation: SimConfig,
    /// Background tick settings.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HostConfig {
    /// Load configuration from a TOML string and validate it.
    ///
    /// # Errors
    /// Returns `HostError::Config` if the TOML is invalid, or the engine's
    /// error for out-of-range engine settings.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| HostError::Config(e.to_string()))?;
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

    /// Validate the engine and runner sections.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.runner.validate()
    }

    /// Build a simulation from the engine section.
    ///
    /// # Errors
    /// Returns the engine's configuration error, if any.
    pub fn build_simulation(
        &self,
        resolver: impl LocalityResolver + 'static,
        start: GameTime,
    ) -> Result<Simulation> {
        Ok(Simulation::starting_at(self.simulation.clone(), resolver, start)?)
    }
}

/// Background tick runner settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Real milliseconds between ticks.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Game-hours advanced per tick.
    #[serde(default = "default_delta_hours")]
    pub delta_hours: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            delta_hours: default_delta_hours(),
        }
    }
}

impl RunnerConfig {
    /// Real-time interval between ticks.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Interval must be non-zero, delta finite and positive.
    ///
    /// # Errors
    /// Returns `HostError::Config` naming the bad field.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(HostError::Config("runner.interval_ms must be > 0".to_string()));
        }
        if !(self.delta_hours.is_finite() && self.delta_hours > 0.0) {
            return Err(HostError::Config(format!(
                "runner.delta_hours must be finite and > 0, got {}",
                self.delta_hours
            )));
        }
        Ok(())
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit newline-delimited JSON instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
    /// Include the module target in each line.
    #[serde(default = "default_true")]
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            with_target: true,
        }
    }
}

fn default_interval_ms() -> u64 { 1000 }
fn default_delta_hours() -> f64 { 1.0 }
fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }
