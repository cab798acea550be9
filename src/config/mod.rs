//! Preprocessing Configuration
//!
//! Every tunable of the pipeline lives here as an operator-editable TOML
//! value. Each section implements `Default` with values matching the
//! reference site (10-minute windows of 1 Hz native samples, 50% coverage,
//! 0.95 toggle activation), so behavior is unchanged when no file is present.
//!
//! ## Loading Order
//!
//! 1. `WINDGATE_CONFIG` environment variable (path to TOML file)
//! 2. `windgate.toml` in the current working directory
//! 3. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Root configuration for one preprocessing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Window width and native sampling resolution
    #[serde(default)]
    pub windowing: WindowingConfig,

    /// Coverage gate tuning
    #[serde(default)]
    pub coverage: CoverageConfig,

    /// Toggle-state detection thresholds
    #[serde(default)]
    pub toggle: ToggleConfig,

    /// Site naming and time zone
    #[serde(default)]
    pub site: SiteConfig,
}

/// Aggregation window geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowingConfig {
    /// Aggregation window width in seconds.
    pub window_secs: u32,
    /// Native sensor sampling resolution in seconds. This is the rate backing
    /// the raw `_count` columns, not the row cadence of the raw frame.
    pub native_resolution_secs: u32,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            window_secs: 600,
            native_resolution_secs: 1,
        }
    }
}

/// Coverage gate tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Fraction of expected native samples a window must carry for its
    /// aggregates to be kept. Applied independently per signal group.
    pub minimum_data_fraction: f64,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            minimum_data_fraction: 0.5,
        }
    }
}

/// Toggle-state detection thresholds.
///
/// `toggle_on` requires the windowed average of the fractional control
/// signal to reach `activation_threshold`; `toggle_off` requires it to fall
/// to `1 - activation_threshold`. Values below 0.5 are outside the supported
/// range: the two flags are evaluated independently and such a configuration
/// can set both in the same window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleConfig {
    pub activation_threshold: f64,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 0.95,
        }
    }
}

/// Site naming and time zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Prefix turning a parsed turbine suffix into a full turbine name, and
    /// selecting turbine rows out of the static asset table.
    pub turbine_prefix: String,
    /// Time zone attached to normalized metadata. Timestamps are UTC
    /// throughout the pipeline.
    pub time_zone: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            turbine_prefix: "SMV".to_string(),
            time_zone: "UTC".to_string(),
        }
    }
}

impl PrepConfig {
    /// Load configuration using the standard search order:
    /// 1. `$WINDGATE_CONFIG` environment variable
    /// 2. `./windgate.toml` in the current working directory
    /// 3. Built-in defaults
    #[must_use]
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("WINDGATE_CONFIG") {
            match Self::load_from_file(Path::new(&path)) {
                Ok(cfg) => {
                    info!(path = %path, "loaded config from WINDGATE_CONFIG");
                    return cfg;
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "failed to load WINDGATE_CONFIG, falling back");
                }
            }
        }

        let conventional = Path::new("windgate.toml");
        if conventional.exists() {
            match Self::load_from_file(conventional) {
                Ok(cfg) => {
                    info!("loaded config from ./windgate.toml");
                    return cfg;
                }
                Err(e) => {
                    warn!(error = %e, "failed to load ./windgate.toml, using defaults");
                }
            }
        }

        info!("using built-in default config");
        Self::default()
    }

    /// Load and parse a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: Self = toml::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.windowing.window_secs == 0 {
            return Err(ConfigLoadError::Invalid(
                "windowing.window_secs must be positive".to_string(),
            ));
        }
        if self.windowing.native_resolution_secs == 0 {
            return Err(ConfigLoadError::Invalid(
                "windowing.native_resolution_secs must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.coverage.minimum_data_fraction) {
            return Err(ConfigLoadError::Invalid(format!(
                "coverage.minimum_data_fraction must be within [0, 1], got {}",
                self.coverage.minimum_data_fraction
            )));
        }
        if !(0.5..=1.0).contains(&self.toggle.activation_threshold) {
            return Err(ConfigLoadError::Invalid(format!(
                "toggle.activation_threshold must be within [0.5, 1], got {}",
                self.toggle.activation_threshold
            )));
        }
        Ok(())
    }

    /// Expected native samples in one full window.
    #[must_use]
    pub fn samples_per_window(&self) -> f64 {
        f64::from(self.windowing.window_secs) / f64::from(self.windowing.native_resolution_secs)
    }

    /// Minimum native sample count a window must carry to pass the
    /// coverage gate. With defaults: 600 / 1 × 0.5 = 300.
    #[must_use]
    pub fn coverage_floor(&self) -> f64 {
        self.samples_per_window() * self.coverage.minimum_data_fraction
    }

    /// Window width in whole minutes, as published in turbine metadata.
    #[must_use]
    pub const fn window_minutes(&self) -> u32 {
        self.windowing.window_secs / 60
    }
}

/// Config loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_site() {
        let cfg = PrepConfig::default();
        assert_eq!(cfg.windowing.window_secs, 600);
        assert_eq!(cfg.windowing.native_resolution_secs, 1);
        assert_eq!(cfg.coverage.minimum_data_fraction, 0.5);
        assert_eq!(cfg.toggle.activation_threshold, 0.95);
        assert_eq!(cfg.site.turbine_prefix, "SMV");
        assert_eq!(cfg.site.time_zone, "UTC");
    }

    #[test]
    fn test_coverage_floor_default_is_300() {
        let cfg = PrepConfig::default();
        assert_eq!(cfg.samples_per_window(), 600.0);
        assert_eq!(cfg.coverage_floor(), 300.0);
        assert_eq!(cfg.window_minutes(), 10);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let cfg: PrepConfig = toml::from_str(
            r#"
            [coverage]
            minimum_data_fraction = 0.8

            [site]
            turbine_prefix = "WTG"
            time_zone = "UTC"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.coverage.minimum_data_fraction, 0.8);
        assert_eq!(cfg.site.turbine_prefix, "WTG");
        // untouched sections keep defaults
        assert_eq!(cfg.windowing.window_secs, 600);
        assert_eq!(cfg.toggle.activation_threshold, 0.95);
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let mut cfg = PrepConfig::default();
        cfg.coverage.minimum_data_fraction = 1.5;
        assert!(matches!(cfg.validate(), Err(ConfigLoadError::Invalid(_))));

        let mut cfg = PrepConfig::default();
        cfg.windowing.window_secs = 0;
        assert!(cfg.validate().is_err());

        // thresholds below 0.5 would let both toggle flags fire at once
        let mut cfg = PrepConfig::default();
        cfg.toggle.activation_threshold = 0.4;
        assert!(cfg.validate().is_err());

        assert!(PrepConfig::default().validate().is_ok());
    }

    #[test]
    fn test_coverage_floor_tracks_resolution() {
        let mut cfg = PrepConfig::default();
        cfg.windowing.native_resolution_secs = 60;
        assert_eq!(cfg.coverage_floor(), 5.0);
    }
}
