//! Config - 実行時設定
//!
//! YAML ファイル（任意）から読む。ファイルがなければ全項目デフォルト、
//! 壊れた YAML はエラー。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lists::{DEFAULT_CAPACITY, parse_timezone};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarqueeConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_capacity")]
    pub catalog_capacity: usize,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_publish_interval")]
    pub publish_interval_secs: u64,
    #[serde(default = "default_lookback")]
    pub publish_lookback: usize,
    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout_secs: u64,
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_recent_n")]
    pub recent_n: usize,
    #[serde(default = "default_publish_recent_n")]
    pub publish_recent_n: usize,
    /// Reload each list from the store whenever its lock is taken.
    #[serde(default)]
    pub shared_store: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_publish_interval() -> u64 {
    10
}

fn default_lookback() -> usize {
    10
}

fn default_confirm_timeout() -> u64 {
    60
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_top_n() -> usize {
    5
}

fn default_recent_n() -> usize {
    5
}

fn default_publish_recent_n() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_capacity: default_capacity(),
            sweep_interval_secs: default_sweep_interval(),
            publish_interval_secs: default_publish_interval(),
            publish_lookback: default_lookback(),
            confirm_timeout_secs: default_confirm_timeout(),
            default_timezone: default_timezone(),
            top_n: default_top_n(),
            recent_n: default_recent_n(),
            publish_recent_n: default_publish_recent_n(),
            shared_store: false,
            log_level: default_log_level(),
        }
    }
}

impl MarqueeConfig {
    /// `path` から読む（存在しなければデフォルト）
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_capacity == 0 {
            return Err(ConfigError::Invalid("catalog_capacity must be at least 1".into()));
        }
        if self.sweep_interval_secs == 0 || self.publish_interval_secs == 0 {
            return Err(ConfigError::Invalid("loop intervals must be positive".into()));
        }
        parse_timezone(&self.default_timezone)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_secs(self.publish_interval_secs)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = MarqueeConfig::load(&dir.path().join("marquee.yaml")).unwrap();
        assert_eq!(config, MarqueeConfig::default());
        assert_eq!(config.catalog_capacity, 20);
        assert_eq!(config.publish_interval(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("marquee.yaml");
        std::fs::write(&path, "catalog_capacity: 5\ndefault_timezone: Europe/Paris\n").unwrap();
        let config = MarqueeConfig::load(&path).unwrap();
        assert_eq!(config.catalog_capacity, 5);
        assert_eq!(config.default_timezone, "Europe/Paris");
        assert_eq!(config.sweep_interval_secs, 60);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("marquee.yaml");
        std::fs::write(&path, "catalog_capacity: [oops").unwrap();
        assert!(matches!(MarqueeConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn bad_default_timezone_is_rejected() {
        let config = MarqueeConfig {
            default_timezone: "Moon/Base".into(),
            ..MarqueeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
