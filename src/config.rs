use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "triage-core";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Triage SLA warning threshold (seconds into the assessment).
pub const DEFAULT_SLA_WARNING_SECS: u32 = 90;

/// Triage SLA critical threshold (hard completion target).
pub const DEFAULT_SLA_CRITICAL_SECS: u32 = 120;

/// Confirmation delay before an emergency code may be broadcast.
pub const DEFAULT_ACTIVATION_COUNTDOWN_SECS: u32 = 5;

/// Wake-up period shared by the SLA timer and the activation countdown.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,triage_core=debug"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for one deployment of the triage core.
///
/// Every field has a default, so a partial JSON document only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub sla_warning_secs: u32,
    pub sla_critical_secs: u32,
    pub activation_countdown_secs: u32,
    pub tick_period_ms: u64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            sla_warning_secs: DEFAULT_SLA_WARNING_SECS,
            sla_critical_secs: DEFAULT_SLA_CRITICAL_SECS,
            activation_countdown_secs: DEFAULT_ACTIVATION_COUNTDOWN_SECS,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
        }
    }
}

impl TriageConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "Loaded triage configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sla_warning_secs == 0 {
            return Err(ConfigError::Invalid(
                "sla_warning_secs must be greater than zero".into(),
            ));
        }
        if self.sla_warning_secs >= self.sla_critical_secs {
            return Err(ConfigError::Invalid(format!(
                "sla_warning_secs ({}) must be below sla_critical_secs ({})",
                self.sla_warning_secs, self.sla_critical_secs
            )));
        }
        if self.activation_countdown_secs == 0 {
            return Err(ConfigError::Invalid(
                "activation_countdown_secs must be greater than zero".into(),
            ));
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid("tick_period_ms must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_triage_core() {
        assert_eq!(APP_NAME, "triage-core");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = TriageConfig::default();
        assert_eq!(config.sla_warning_secs, 90);
        assert_eq!(config.sla_critical_secs, 120);
        assert_eq!(config.activation_countdown_secs, 5);
        assert_eq!(config.tick_period(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TriageConfig::from_json_str(r#"{"sla_warning_secs": 60}"#).unwrap();
        assert_eq!(config.sla_warning_secs, 60);
        assert_eq!(config.sla_critical_secs, 120);
    }

    #[test]
    fn warning_must_precede_critical() {
        let err = TriageConfig::from_json_str(
            r#"{"sla_warning_secs": 120, "sla_critical_secs": 120}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_countdown_rejected() {
        let err = TriageConfig::from_json_str(r#"{"activation_countdown_secs": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = TriageConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.json");
        std::fs::write(&path, r#"{"sla_warning_secs": 45, "sla_critical_secs": 75}"#).unwrap();
        let config = TriageConfig::load(&path).unwrap();
        assert_eq!(config.sla_warning_secs, 45);
        assert_eq!(config.sla_critical_secs, 75);
        assert_eq!(config.activation_countdown_secs, DEFAULT_ACTIVATION_COUNTDOWN_SECS);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TriageConfig::load(Path::new("/nonexistent/triage.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
