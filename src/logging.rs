//! Logging Setup
//!
//! Initializes `tracing-subscriber` from [`LoggingConfig`]. `RUST_LOG` wins
//! over the configured level. Logs go to stderr (stdout belongs to the
//! views) or to the configured file.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ConfigError, LoggingConfig};

/// Build the filter: `RUST_LOG` if set, else `geotrack=<level>`
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("geotrack={}", config.level)))
}

/// Install the global subscriber
///
/// Only the first call in a process takes effect.
pub fn init(config: &LoggingConfig) -> Result<(), ConfigError> {
    let json = config.format.eq_ignore_ascii_case("json");

    let layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| ConfigError::Io {
                    path: path.into(),
                    error: e.to_string(),
                })?;
            let writer = Mutex::new(file);
            if json {
                fmt::layer().json().with_writer(writer).boxed()
            } else {
                fmt::layer().with_ansi(false).with_writer(writer).boxed()
            }
        }
        None if json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        None => fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    if tracing_subscriber::registry()
        .with(env_filter(config))
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("Logging already initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggingConfig::default();
        init(&config).unwrap();
        init(&config).unwrap();
    }

    #[test]
    fn test_unwritable_log_file() {
        let config = LoggingConfig {
            file: Some("/nonexistent/dir/geotrack.log".to_string()),
            ..LoggingConfig::default()
        };
        assert!(matches!(init(&config), Err(ConfigError::Io { .. })));
    }
}
