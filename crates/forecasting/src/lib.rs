//! Demand forecasting.
//!
//! Fits an additive trend + seasonal model to a SKU's daily sales history and
//! extrapolates it with an uncertainty band that widens with the horizon.
//! Pure computation: inputs arrive in memory, nothing is persisted.

pub mod config;
pub mod forecaster;
pub mod model;
pub mod registry;
pub mod series;

pub use config::{ForecastConfig, RegistryConfig};
pub use forecaster::{DemandSummary, ForecastPoint, ForecastResult, Forecaster};
pub use model::ModelHandle;
pub use registry::ModelRegistry;
pub use series::{DailySeries, TimeSeriesPoint, regularize_daily};
