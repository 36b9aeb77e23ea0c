//! TOML configuration for PacketGuardian.
//!
//! Detection thresholds and logging settings, with per-section defaults,
//! an environment variable override for the config file path and a local
//! fallback file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "PACKETGUARDIAN_CONFIG";

/// Config file picked up from the working directory when nothing else is given.
pub const LOCAL_CONFIG_FILE: &str = "packetguardian.toml";

pub const DEFAULT_TIME_WINDOW_SECONDS: u64 = 60;
pub const DEFAULT_BYTE_THRESHOLD: u64 = 1_000_000;
pub const DEFAULT_INCREASING_RUN_LENGTH: usize = 3;

/// Smallest run length that is not trivially satisfied by every flow.
pub const MIN_INCREASING_RUN_LENGTH: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("time_window_seconds must be positive")]
    ZeroTimeWindow,
    #[error("byte_threshold must be positive")]
    ZeroByteThreshold,
    #[error("increasing_run_length must be at least {min}, got {got}")]
    RunLengthTooShort { min: usize, got: usize },
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardianConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GuardianConfig {
    /// Load configuration from a TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        info!(path = %path.display(), "loaded packetguardian configuration");
        Ok(config)
    }

    /// Resolve configuration from, in order:
    /// 1. `explicit` (the `--config` flag). A failure here is an error.
    /// 2. The path in `PACKETGUARDIAN_CONFIG`.
    /// 3. `./packetguardian.toml`.
    /// 4. Compiled-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(env_path);
            match Self::load(&path) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "PACKETGUARDIAN_CONFIG set but file could not be loaded, trying fallback"
                    );
                }
            }
        }

        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load(local) {
                Ok(cfg) => return Ok(cfg),
                Err(e) => {
                    warn!(
                        path = %local.display(),
                        error = %e,
                        "local config file exists but could not be loaded, using defaults"
                    );
                }
            }
        }

        debug!("no config file found, using compiled-in defaults");
        Ok(Self::default())
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Thresholds applied by the detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Reserved for rolling-window byte sums. Validated but not used by any rule:
    /// the byte threshold is applied to the whole flow.
    pub time_window_seconds: u64,
    /// Total bytes per flow at which the byte-threshold rule fires (inclusive).
    pub byte_threshold: u64,
    /// Number of consecutive, strictly increasing sizes that trigger the run rule.
    pub increasing_run_length: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            time_window_seconds: DEFAULT_TIME_WINDOW_SECONDS,
            byte_threshold: DEFAULT_BYTE_THRESHOLD,
            increasing_run_length: DEFAULT_INCREASING_RUN_LENGTH,
        }
    }
}

impl DetectionConfig {
    /// Reject values that would make detection meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_window_seconds == 0 {
            return Err(ConfigError::ZeroTimeWindow);
        }
        if self.byte_threshold == 0 {
            return Err(ConfigError::ZeroByteThreshold);
        }
        if self.increasing_run_length < MIN_INCREASING_RUN_LENGTH {
            return Err(ConfigError::RunLengthTooShort {
                min: MIN_INCREASING_RUN_LENGTH,
                got: self.increasing_run_length,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum tracing level (`trace`, `debug`, `info`, `warn`, `error`).
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Emit JSON log lines instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DetectionConfig::default();
        assert_eq!(cfg.time_window_seconds, 60);
        assert_eq!(cfg.byte_threshold, 1_000_000);
        assert_eq!(cfg.increasing_run_length, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_run_length_below_two_rejected() {
        for n in [0, 1] {
            let cfg = DetectionConfig {
                increasing_run_length: n,
                ..DetectionConfig::default()
            };
            assert_eq!(
                cfg.validate(),
                Err(ConfigError::RunLengthTooShort { min: 2, got: n })
            );
        }
    }

    #[test]
    fn test_zero_threshold_and_window_rejected() {
        let cfg = DetectionConfig {
            byte_threshold: 0,
            ..DetectionConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroByteThreshold));

        let cfg = DetectionConfig {
            time_window_seconds: 0,
            ..DetectionConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeWindow));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[detection]
byte_threshold = 5000
"#;
        let cfg: GuardianConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.detection.byte_threshold, 5000);
        assert_eq!(cfg.detection.increasing_run_length, 3);
        assert_eq!(cfg.detection.time_window_seconds, 60);
        assert_eq!(cfg.logging.level, "info");
        assert!(!cfg.logging.json);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let cfg: GuardianConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.detection, DetectionConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("packetguardian.toml");
        std::fs::write(
            &path,
            r#"
[detection]
increasing_run_length = 5

[logging]
level = "debug"
json = true
"#,
        )
        .unwrap();

        let cfg = GuardianConfig::load(&path).unwrap();
        assert_eq!(cfg.detection.increasing_run_length, 5);
        assert_eq!(cfg.logging.level, "debug");
        assert!(cfg.logging.json);
    }

    #[test]
    fn test_resolve_explicit_missing_file_errors() {
        let result = GuardianConfig::resolve(Some(Path::new("/nonexistent/packetguardian.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let cfg = GuardianConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let roundtripped: GuardianConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(cfg.detection, roundtripped.detection);
        assert_eq!(cfg.logging.level, roundtripped.logging.level);
    }
}
