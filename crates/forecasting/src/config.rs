//! Forecaster and model-registry tunables.

use serde::{Deserialize, Serialize};

/// Forecaster configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Seasonal period in days (7 = weekly pattern).
    #[serde(default = "default_season_length")]
    pub season_length: usize,

    /// Full seasonal cycles of history required before fitting.
    #[serde(default = "default_min_seasonal_cycles")]
    pub min_seasonal_cycles: usize,

    /// Two-sided coverage of the uncertainty band, in (0, 1).
    #[serde(default = "default_interval_width")]
    pub interval_width: f64,

    /// Longest horizon a single request may ask for.
    #[serde(default = "default_max_horizon_days")]
    pub max_horizon_days: i64,

    /// Longest run of missing days between two observations that gap filling
    /// will interpolate across.
    #[serde(default = "default_max_gap_days")]
    pub max_gap_days: i64,

    /// Version tag stamped on every forecast.
    #[serde(default = "default_model_version")]
    pub model_version: String,
}

/// Fewest points a decomposition can be fitted on (two for the trend line,
/// two more for a residual spread).
pub const MIN_FIT_POINTS: usize = 4;

impl ForecastConfig {
    /// Minimum number of daily points (after gap filling) needed to train.
    pub fn min_history_points(&self) -> usize {
        (self.season_length * self.min_seasonal_cycles).max(MIN_FIT_POINTS)
    }

    /// All configuration problems at once (empty when valid).
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.season_length == 0 {
            issues.push("forecast.season_length must be >= 1".to_string());
        }
        if self.min_seasonal_cycles < 2 {
            issues.push("forecast.min_seasonal_cycles must be >= 2".to_string());
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            issues.push("forecast.interval_width must lie strictly between 0 and 1".to_string());
        }
        if self.max_horizon_days < 1 {
            issues.push("forecast.max_horizon_days must be >= 1".to_string());
        }
        if self.max_gap_days < 1 {
            issues.push("forecast.max_gap_days must be >= 1".to_string());
        }
        if self.model_version.trim().is_empty() {
            issues.push("forecast.model_version cannot be empty".to_string());
        }
        issues
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            season_length: default_season_length(),
            min_seasonal_cycles: default_min_seasonal_cycles(),
            interval_width: default_interval_width(),
            max_horizon_days: default_max_horizon_days(),
            max_gap_days: default_max_gap_days(),
            model_version: default_model_version(),
        }
    }
}

fn default_season_length() -> usize {
    7
}
fn default_min_seasonal_cycles() -> usize {
    2
}
fn default_interval_width() -> f64 {
    0.80
}
fn default_max_horizon_days() -> i64 {
    366
}
fn default_max_gap_days() -> i64 {
    90
}
fn default_model_version() -> String {
    "additive-decomposition-v1".to_string()
}

/// Model registry lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// A cached model is retrained once the supplied history extends this many
    /// days past the model's last trained day.
    #[serde(default = "default_staleness_days")]
    pub staleness_days: i64,
}

impl RegistryConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.staleness_days < 1 {
            issues.push("registry.staleness_days must be >= 1".to_string());
        }
        issues
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            staleness_days: default_staleness_days(),
        }
    }
}

fn default_staleness_days() -> i64 {
    1
}
