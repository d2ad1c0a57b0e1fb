//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tracking server endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// WebSocket base URL; `http(s)` is rewritten to `ws(s)` when connecting
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,

    /// REST base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_websocket_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            websocket_url: default_websocket_url(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Socket wrapper tuning
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Delay before reconnecting after an unexpected close
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,

    /// Window over which `pointerMoved` bursts are coalesced
    #[serde(default = "default_flush_interval")]
    pub flush_interval_ms: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_reconnect_delay() -> u64 {
    5000 // 5 seconds
}

fn default_flush_interval() -> u64 {
    16 // one frame at 60 Hz
}

fn default_connect_timeout() -> u64 {
    10_000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay(),
            flush_interval_ms: default_flush_interval(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl TransportConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("geotrack").join("config.toml")),
            Some(PathBuf::from("/etc/geotrack/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(url) = lookup("GEOTRACK_WEBSOCKET_URL") {
            self.server.websocket_url = url;
        }
        if let Some(url) = lookup("GEOTRACK_API_URL") {
            self.server.api_url = url;
        }

        // Transport overrides
        if let Some(delay) = lookup("GEOTRACK_RECONNECT_DELAY_MS") {
            match delay.parse() {
                Ok(ms) => self.transport.reconnect_delay_ms = ms,
                Err(_) => tracing::warn!(value = %delay, "Ignoring invalid GEOTRACK_RECONNECT_DELAY_MS"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("GEOTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GEOTRACK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# GeoTrack Configuration
#
# Environment variables override these settings:
# - GEOTRACK_WEBSOCKET_URL
# - GEOTRACK_API_URL
# - GEOTRACK_RECONNECT_DELAY_MS
# - GEOTRACK_LOG_LEVEL
# - GEOTRACK_LOG_FORMAT

[server]
# Realtime server (http/https is rewritten to ws/wss)
websocket_url = "http://localhost:3001"

# REST API base URL
api_url = "http://localhost:3000"

# Request timeout in seconds
request_timeout_secs = 30

[transport]
# Delay before reconnecting after the connection drops (ms)
reconnect_delay_ms = 5000

# Window for coalescing pointer moves (ms)
flush_interval_ms = 16

# Give up on a connection attempt after this long (ms)
connect_timeout_ms = 10000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/geotrack/geotrack.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.websocket_url, "http://localhost:3001");
        assert_eq!(config.server.api_url, "http://localhost:3000");
        assert_eq!(config.transport.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.transport.flush_interval(), Duration::from_millis(16));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.server.websocket_url, default_websocket_url());
        assert_eq!(config.transport.connect_timeout_ms, 10_000);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transport]\nreconnect_delay_ms = 250").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.transport.reconnect_delay_ms, 250);
        assert_eq!(config.transport.flush_interval_ms, 16);
        assert_eq!(config.server.api_url, "http://localhost:3000");
    }

    #[test]
    fn test_load_errors() {
        let missing = Config::load(Path::new("/nonexistent/geotrack.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbroken").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GEOTRACK_WEBSOCKET_URL", "https://track.example.com"),
            ("GEOTRACK_RECONNECT_DELAY_MS", "1000"),
            ("GEOTRACK_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.server.websocket_url, "https://track.example.com");
        assert_eq!(config.transport.reconnect_delay_ms, 1000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_numeric_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "GEOTRACK_RECONNECT_DELAY_MS").then(|| "soon".to_string())
        });
        assert_eq!(config.transport.reconnect_delay_ms, 5000);
    }
}
