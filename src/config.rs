// Application configuration (RON)

use crate::command::sequence::MAX_BATCH_LEN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "minidsp-control";
const CONFIG_FILE_NAME: &str = "config.ron";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Command buffer capacity {capacity} is below the largest batch ({min})")]
    CapacityTooSmall { capacity: usize, min: usize },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Service configuration
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Preset catalogue JSON document, none means an empty catalogue
    pub catalogue_path: Option<PathBuf>,
    /// Ring buffer size between translator and device writer, in commands
    pub command_buffer_capacity: usize,
    /// Default `env_logger` filter, `RUST_LOG` takes precedence
    pub log_filter: String,
    /// Device writer idle poll interval
    pub writer_poll_ms: u64,
    /// How long a batch may wait for room in the command buffer
    pub sink_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalogue_path: None,
            command_buffer_capacity: 256,
            log_filter: "info".to_string(),
            writer_poll_ms: 5,
            sink_timeout_ms: 1000,
        }
    }
}

impl AppConfig {
    pub fn from_ron_str(ron_data: &str) -> ConfigResult<Self> {
        let config: AppConfig = ron::from_str(ron_data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let ron_data = std::fs::read_to_string(path)?;
        Self::from_ron_str(&ron_data)
    }

    /// `<config dir>/minidsp-control/config.ron`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from an explicit path, else the default location, else defaults
    ///
    /// # Errors
    /// An explicit path must exist and parse. The default location is only
    /// read when the file is present.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.command_buffer_capacity < MAX_BATCH_LEN {
            return Err(ConfigError::CapacityTooSmall {
                capacity: self.command_buffer_capacity,
                min: MAX_BATCH_LEN,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = AppConfig::from_ron_str(r#"(log_filter: "debug")"#).unwrap();

        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.command_buffer_capacity, 256);
        assert_eq!(config.catalogue_path, None);
        assert_eq!(config.sink_timeout_ms, 1000);
    }

    #[test]
    fn test_full_file() {
        let ron_data = r#"(
            catalogue_path: Some("/var/lib/minidsp/catalogue.json"),
            command_buffer_capacity: 64,
            log_filter: "warn",
            writer_poll_ms: 20,
            sink_timeout_ms: 250,
        )"#;

        let config = AppConfig::from_ron_str(ron_data).unwrap();

        assert_eq!(
            config.catalogue_path,
            Some(PathBuf::from("/var/lib/minidsp/catalogue.json"))
        );
        assert_eq!(config.command_buffer_capacity, 64);
        assert_eq!(config.writer_poll_ms, 20);
        assert_eq!(config.sink_timeout_ms, 250);
    }

    #[test]
    fn test_capacity_must_hold_largest_batch() {
        let result = AppConfig::from_ron_str("(command_buffer_capacity: 40)");

        assert!(matches!(
            result,
            Err(ConfigError::CapacityTooSmall { capacity: 40, min: 41 })
        ));
    }

    #[test]
    fn test_invalid_ron() {
        assert!(matches!(
            AppConfig::from_ron_str("(log_filter: )"),
            Err(ConfigError::Ron(_))
        ));
    }

    #[test]
    fn test_round_trip_through_ron() {
        let config = AppConfig::default();
        let ron_data = ron::to_string(&config).unwrap();

        assert_eq!(AppConfig::from_ron_str(&ron_data).unwrap(), config);
    }
}
