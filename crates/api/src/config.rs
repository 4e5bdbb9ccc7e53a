//! Engine configuration: defaults, optional TOML file, `OPTIBRAIN_*` overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use optibrain_forecasting::{ForecastConfig, RegistryConfig};
use optibrain_inventory::{InventoryConfig, OrderQuantityPolicy};
use optibrain_observability::LoggingConfig;
use optibrain_pricing::PricingConfig;
use optibrain_segmentation::SegmentationConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Env {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Defaults, then `path` (if any), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load) with an explicit variable lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Environment overrides (highest priority).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup("OPTIBRAIN_LOG") {
            self.logging.filter = filter;
        }
        if let Some(v) = parse_env(&lookup, "OPTIBRAIN_LOG_FORMAT")? {
            self.logging.format = v;
        }
        if let Some(v) = parse_env(&lookup, "OPTIBRAIN_SEASON_LENGTH")? {
            self.forecast.season_length = v;
        }
        if let Some(v) = parse_env(&lookup, "OPTIBRAIN_INTERVAL_WIDTH")? {
            self.forecast.interval_width = v;
        }
        if let Some(v) = parse_env(&lookup, "OPTIBRAIN_STALENESS_DAYS")? {
            self.registry.staleness_days = v;
        }
        if let Some(v) = parse_env(&lookup, "OPTIBRAIN_SERVICE_LEVEL")? {
            self.inventory.default_service_level = v;
        }
        if let Some(days) = parse_env(&lookup, "OPTIBRAIN_REVIEW_PERIOD_DAYS")? {
            self.inventory.order_quantity = OrderQuantityPolicy::ReviewPeriod { days };
        }
        if let Some(v) = parse_env(&lookup, "OPTIBRAIN_SEGMENTS")? {
            self.segmentation.default_segments = v;
        }
        if let Some(v) = parse_env(&lookup, "OPTIBRAIN_SEGMENTATION_SEED")? {
            self.segmentation.seed = v;
        }
        Ok(())
    }

    /// Check every section and report all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();
        issues.extend(self.forecast.validate());
        issues.extend(self.registry.validate());
        issues.extend(self.inventory.validate());
        issues.extend(self.pricing.validate());
        issues.extend(self.segmentation.validate());
        issues.extend(self.logging.validate());

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }
}

fn parse_env<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(v) => Ok(Some(v)),
        Err(e) => Err(ConfigError::Env {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
