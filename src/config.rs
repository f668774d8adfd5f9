//! Engine configuration loaded from TOML
//!
//! Every field has a default, so an empty string (or missing file sections)
//! yields a fully usable config.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration load/validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The TOML did not parse or had the wrong shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Parsed fine but a value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level name: off, error, warn, info, debug, trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Translate the level name; `None` for unknown names
    pub fn level_filter(&self) -> Option<log::LevelFilter> {
        match self.level.to_ascii_lowercase().as_str() {
            "off" => Some(log::LevelFilter::Off),
            "error" => Some(log::LevelFilter::Error),
            "warn" => Some(log::LevelFilter::Warn),
            "info" => Some(log::LevelFilter::Info),
            "debug" => Some(log::LevelFilter::Debug),
            "trace" => Some(log::LevelFilter::Trace),
            _ => None,
        }
    }
}

/// Collision section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Warn when a sweep covers more participants than this; 0 disables
    pub participant_warn_threshold: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            participant_warn_threshold: 500,
        }
    }
}

/// Timing section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Frame deltas are clamped to this many milliseconds
    pub max_delta_ms: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_delta_ms: crate::foundation::time::DEFAULT_MAX_DELTA_MS,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Logging section
    pub logging: LoggingConfig,
    /// Collision section
    pub collision: CollisionConfig,
    /// Timing section
    pub timing: TimingConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level_filter().is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }
        if !self.timing.max_delta_ms.is_finite() || self.timing.max_delta_ms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_delta_ms must be positive, got {}",
                self.timing.max_delta_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.collision.participant_warn_threshold, 500);
        assert_eq!(config.timing.max_delta_ms, 100.0);
    }

    #[test]
    fn test_partial_document_overrides_only_named_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            [logging]
            level = "debug"

            [collision]
            participant_warn_threshold = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level_filter(), Some(log::LevelFilter::Debug));
        assert_eq!(config.collision.participant_warn_threshold, 64);
        assert_eq!(config.timing.max_delta_ms, 100.0);
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let err = EngineConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_nonpositive_delta_cap_is_rejected() {
        let err =
            EngineConfig::from_toml_str("[timing]\nmax_delta_ms = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("logging = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
