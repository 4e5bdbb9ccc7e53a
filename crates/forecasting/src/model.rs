//! Additive trend + seasonal decomposition.
//!
//! Model:
//! - Centred moving average over one season estimates the local trend.
//! - Per-phase means of the detrended series give seasonal indices (sum 0).
//! - An OLS line through the deseasonalised series is the extrapolable trend.
//! - Residual spread plus the OLS prediction-interval term sizes the band, so
//!   the band widens with distance from the observed data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use optibrain_core::{ModelId, SkuId, stats};

use crate::series::DailySeries;

/// Immutable trained model artifact for one SKU.
///
/// Built once per training run and never mutated afterwards, so it can be
/// shared (`Arc`) across concurrent predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHandle {
    id: ModelId,
    sku_id: SkuId,
    model_version: String,
    start: NaiveDate,
    observations: usize,
    first_value: f64,
    last_value: f64,
    intercept: f64,
    slope: f64,
    seasonal: Vec<f64>,
    residual_std: f64,
    t_mean: f64,
    sxx: f64,
    z: f64,
}

/// Point estimate and band at one absolute time index.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Projection {
    pub yhat: f64,
    pub half_width: f64,
}

impl ModelHandle {
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn sku_id(&self) -> &SkuId {
        &self.sku_id
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Number of daily points the model was fitted on (after gap filling).
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Last day covered by the training data.
    pub fn trained_through(&self) -> NaiveDate {
        self.start + chrono::Days::new(self.observations.saturating_sub(1) as u64)
    }

    /// Whether `series` begins with the data this model was fitted on: same
    /// start day, at least as long, and identical first and last trained values.
    pub fn is_prefix_of(&self, series: &DailySeries) -> bool {
        self.observations > 0
            && series.start == self.start
            && series.values.len() >= self.observations
            && series.values[0].to_bits() == self.first_value.to_bits()
            && series.values[self.observations - 1].to_bits() == self.last_value.to_bits()
    }

    /// Per-day trend increment.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Seasonal indices by phase (phase 0 = first training day).
    pub fn seasonal(&self) -> &[f64] {
        &self.seasonal
    }

    /// Standard deviation of in-sample residuals.
    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }

    pub(crate) fn project(&self, t: usize) -> Projection {
        let tf = t as f64;
        let seasonal = self.seasonal[t % self.seasonal.len()];
        let yhat = self.intercept + self.slope * tf + seasonal;

        let n = self.observations as f64;
        let leverage = 1.0 + 1.0 / n + (tf - self.t_mean).powi(2) / self.sxx;
        Projection {
            yhat,
            half_width: self.z * self.residual_std * leverage.sqrt(),
        }
    }
}

/// Fit the decomposition. `series` must already satisfy the minimum length
/// (at least two seasons and at least four points).
pub(crate) fn fit(
    sku_id: SkuId,
    series: &DailySeries,
    season_length: usize,
    z: f64,
    model_version: &str,
) -> ModelHandle {
    let y = &series.values;
    let n = y.len();

    let seasonal = seasonal_indices(y, season_length);

    let deseasonalized: Vec<f64> = y
        .iter()
        .enumerate()
        .map(|(t, v)| v - seasonal[t % season_length])
        .collect();

    let t_mean = (n as f64 - 1.0) / 2.0;
    let z_mean = stats::mean(&deseasonalized);
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (t, v) in deseasonalized.iter().enumerate() {
        let dt = t as f64 - t_mean;
        sxx += dt * dt;
        sxy += dt * (v - z_mean);
    }
    let slope = sxy / sxx;
    let intercept = z_mean - slope * t_mean;

    let sse: f64 = y
        .iter()
        .enumerate()
        .map(|(t, v)| {
            let fitted = intercept + slope * t as f64 + seasonal[t % season_length];
            (v - fitted).powi(2)
        })
        .sum();
    // Two degrees of freedom go to the trend line.
    let residual_std = (sse / (n - 2) as f64).sqrt();

    ModelHandle {
        id: ModelId::new(),
        sku_id,
        model_version: model_version.to_string(),
        start: series.start,
        observations: n,
        first_value: y[0],
        last_value: y[n - 1],
        intercept,
        slope,
        seasonal,
        residual_std,
        t_mean,
        sxx,
        z,
    }
}

/// Seasonal indices from a centred moving average, normalised to sum to zero.
fn seasonal_indices(y: &[f64], m: usize) -> Vec<f64> {
    if m <= 1 {
        return vec![0.0];
    }

    let n = y.len();
    let half = m / 2;
    let mut sums = vec![0.0; m];
    let mut counts = vec![0usize; m];

    for t in half..n - half {
        let trend = if m % 2 == 1 {
            y[t - half..=t + half].iter().sum::<f64>() / m as f64
        } else {
            // 2xm moving average: half weight on the two outermost points.
            let inner: f64 = y[t - half + 1..t + half].iter().sum();
            (0.5 * y[t - half] + inner + 0.5 * y[t + half]) / m as f64
        };
        sums[t % m] += y[t] - trend;
        counts[t % m] += 1;
    }

    let mut indices: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &c)| if c == 0 { 0.0 } else { s / c as f64 })
        .collect();
    let offset = stats::mean(&indices);
    for s in &mut indices {
        *s -= offset;
    }
    indices
}
