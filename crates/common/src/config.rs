//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Broker defaults for new sessions.
    pub broker: BrokerDefaults,

    /// Derivation defaults for consumers.
    pub derivation: DerivationDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default broker parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerDefaults {
    /// Retention capacity of the sample ring buffer.
    pub capacity: usize,

    /// Per-subscriber queue depth. 0 means "match capacity".
    pub queue_depth: usize,

    /// Consecutive drops before a subscriber is detached.
    pub drop_threshold: u32,
}

/// Default derivation parameters for consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationDefaults {
    /// Derivation mode string (e.g., "position", "velocity", "velocity10").
    pub mode: String,

    /// Trailing time window in seconds. 0 means "all data".
    pub window_secs: i64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "inkstream=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            broker: BrokerDefaults::default(),
            derivation: DerivationDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BrokerDefaults {
    fn default() -> Self {
        Self {
            capacity: 200,
            queue_depth: 0,
            drop_threshold: 32,
        }
    }
}

impl Default for DerivationDefaults {
    fn default() -> Self {
        Self {
            mode: "position".to_string(),
            window_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("inkstream").join("config.json")
}
