//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{HostError, Result};

/// The filter in effect: `RUST_LOG` if set, else the configured level.
///
/// # Errors
/// Returns `HostError::Config` if the configured directive does not parse.
pub fn filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| HostError::Config(format!("logging.level {:?}: {e}", config.level)))
}

/// Install the global `fmt` subscriber.
///
/// # Errors
/// Returns `HostError::Logging` if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(config)?)
        .with_target(config.with_target);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| HostError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_refused() {
        let config = LoggingConfig::default();
        // The first call fails too if a subscriber is already installed.
        let _ = init(&config);
        assert!(matches!(init(&config), Err(HostError::Logging(_))));
    }

    #[test]
    fn configured_level_parses() {
        let config = LoggingConfig {
            level: "ripple_core=debug,warn".to_string(),
            ..LoggingConfig::default()
        };
        assert!(filter(&config).is_ok());
    }
}
