use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use optibrain_core::{EngineError, EngineResult, SkuId, stats};

use crate::config::ForecastConfig;
use crate::model::{self, ModelHandle};
use crate::series::{DailySeries, TimeSeriesPoint, regularize_daily};

/// One forecast day.
///
/// Invariant: `lower_bound <= predicted_quantity <= upper_bound`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: NaiveDate,
    pub predicted_quantity: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Forecast for one SKU over a contiguous run of days following the last
/// observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub sku_id: SkuId,
    pub horizon_points: Vec<ForecastPoint>,
    pub model_version: String,
    /// Daily residual standard deviation of the fitted model.
    pub residual_std: f64,
}

/// Mean/std-dev of daily demand, the input shape the inventory and pricing
/// components consume.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSummary {
    pub mean: f64,
    pub std: f64,
}

impl ForecastResult {
    /// Average predicted daily demand over the horizon (floored at zero) and
    /// the model's daily residual spread.
    pub fn summary(&self) -> DemandSummary {
        let predicted: Vec<f64> = self.horizon_points.iter().map(|p| p.predicted_quantity).collect();
        DemandSummary {
            mean: stats::mean(&predicted).max(0.0),
            std: self.residual_std,
        }
    }
}

/// Demand forecaster: fits a trend + seasonal model per call.
///
/// Holds configuration only. Each `train` builds a fresh [`ModelHandle`], so
/// concurrent calls never share a partially trained model.
#[derive(Debug, Clone)]
pub struct Forecaster {
    config: ForecastConfig,
    z: f64,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> EngineResult<Self> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(EngineError::invalid_input(issues.join("; ")));
        }
        let z = stats::inverse_normal_cdf(0.5 + config.interval_width / 2.0)
            .ok_or_else(|| EngineError::invalid_input("forecast.interval_width has no quantile"))?;
        Ok(Self { config, z })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fit a model to the SKU's ordered daily history.
    pub fn train(&self, sku_id: &SkuId, history: &[TimeSeriesPoint]) -> EngineResult<ModelHandle> {
        let series = self.prepare(history)?;
        Ok(self.fit(sku_id, &series))
    }

    /// Validate `history` and lay it out on the daily grid, enforcing the
    /// minimum length on the regularised series.
    pub fn prepare(&self, history: &[TimeSeriesPoint]) -> EngineResult<DailySeries> {
        let required = self.config.min_history_points();
        if history.is_empty() {
            return Err(EngineError::insufficient_data(required, 0));
        }

        let series = regularize_daily(history, self.config.max_gap_days)?;
        if series.values.len() < required {
            return Err(EngineError::insufficient_data(required, series.values.len()));
        }
        Ok(series)
    }

    /// Fit a series already accepted by [`prepare`](Self::prepare).
    pub(crate) fn fit(&self, sku_id: &SkuId, series: &DailySeries) -> ModelHandle {
        let model = model::fit(
            sku_id.clone(),
            series,
            self.config.season_length,
            self.z,
            &self.config.model_version,
        );

        debug!(
            sku = %sku_id,
            model_id = %model.id(),
            points = series.values.len(),
            slope = model.slope(),
            residual_std = model.residual_std(),
            "forecast model trained"
        );

        model
    }

    /// Extrapolate `days` steps past the model's last trained day.
    pub fn predict(&self, model: &ModelHandle, days: i64) -> EngineResult<ForecastResult> {
        self.predict_after(model, model.trained_through(), days)
    }

    /// Extrapolate `days` steps past `last_observed`, which must not precede
    /// the model's last trained day.
    pub fn predict_after(
        &self,
        model: &ModelHandle,
        last_observed: NaiveDate,
        days: i64,
    ) -> EngineResult<ForecastResult> {
        if days < 1 || days > self.config.max_horizon_days {
            return Err(EngineError::InvalidHorizon(days));
        }
        let offset = (last_observed - model.trained_through()).num_days();
        if offset < 0 {
            return Err(EngineError::invalid_input(format!(
                "cannot forecast after {last_observed}: model {} is trained through {}",
                model.id(),
                model.trained_through()
            )));
        }

        let last_index = model.observations() - 1 + offset as usize;
        let horizon_points = (1..=days as usize)
            .map(|h| {
                let p = model.project(last_index + h);
                ForecastPoint {
                    timestamp: last_observed + chrono::Days::new(h as u64),
                    predicted_quantity: p.yhat,
                    lower_bound: p.yhat - p.half_width,
                    upper_bound: p.yhat + p.half_width,
                }
            })
            .collect();

        Ok(ForecastResult {
            sku_id: model.sku_id().clone(),
            horizon_points,
            model_version: model.model_version().to_string(),
            residual_std: model.residual_std(),
        })
    }

    /// Train and predict as one operation (no model outlives the call).
    pub fn forecast(
        &self,
        sku_id: &SkuId,
        history: &[TimeSeriesPoint],
        days: i64,
    ) -> EngineResult<ForecastResult> {
        // Horizon is checked first so bad requests fail before the fit.
        if days < 1 || days > self.config.max_horizon_days {
            return Err(EngineError::InvalidHorizon(days));
        }
        let model = self.train(sku_id, history)?;
        self.predict(&model, days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn history(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(start() + chrono::Days::new(i as u64), *v))
            .collect()
    }

    fn noisy_weekly(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| 40.0 + 0.3 * t as f64 + [5.0, -2.0, 0.0, 1.0, -4.0, 3.0, -3.0][t % 7] + ((t * 13) % 5) as f64)
            .collect()
    }

    fn forecaster() -> Forecaster {
        Forecaster::new(ForecastConfig::default()).unwrap()
    }

    #[test]
    fn forecast_has_one_point_per_requested_day_with_contiguous_dates() {
        let f = forecaster();
        let sku = SkuId::new("SKU-1");
        let result = f.forecast(&sku, &history(&noisy_weekly(28)), 7).unwrap();

        assert_eq!(result.sku_id, sku);
        assert_eq!(result.model_version, "additive-decomposition-v1");
        assert_eq!(result.horizon_points.len(), 7);

        let last_observed = start() + chrono::Days::new(27);
        for (h, p) in result.horizon_points.iter().enumerate() {
            assert_eq!(p.timestamp, last_observed + chrono::Days::new(h as u64 + 1));
            assert!(p.lower_bound <= p.predicted_quantity);
            assert!(p.predicted_quantity <= p.upper_bound);
        }
    }

    #[test]
    fn band_width_never_shrinks_with_horizon() {
        let f = forecaster();
        let result = f.forecast(&SkuId::new("SKU-1"), &history(&noisy_weekly(35)), 30).unwrap();

        let widths: Vec<f64> = result
            .horizon_points
            .iter()
            .map(|p| p.upper_bound - p.lower_bound)
            .collect();
        for w in widths.windows(2) {
            assert!(w[1] >= w[0], "band shrank: {} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn too_short_history_is_rejected() {
        let f = forecaster();
        let err = f.forecast(&SkuId::new("SKU-1"), &history(&noisy_weekly(13)), 7).unwrap_err();
        assert_eq!(err, EngineError::insufficient_data(14, 13));

        let err = f.train(&SkuId::new("SKU-1"), &[]).unwrap_err();
        assert_eq!(err, EngineError::insufficient_data(14, 0));
    }

    #[test]
    fn gap_filled_history_counts_towards_minimum() {
        let f = forecaster();
        let sparse = vec![
            TimeSeriesPoint::new(start(), 10.0),
            TimeSeriesPoint::new(start() + chrono::Days::new(7), 12.0),
            TimeSeriesPoint::new(start() + chrono::Days::new(15), 14.0),
        ];
        let model = f.train(&SkuId::new("SKU-9"), &sparse).unwrap();
        assert_eq!(model.observations(), 16);
    }

    #[test]
    fn non_positive_or_excessive_horizon_is_rejected() {
        let f = forecaster();
        let h = history(&noisy_weekly(28));
        for days in [0, -3, 367] {
            assert_eq!(
                f.forecast(&SkuId::new("SKU-1"), &h, days),
                Err(EngineError::InvalidHorizon(days))
            );
        }
    }

    #[test]
    fn summary_feeds_downstream_components() {
        let f = forecaster();
        let flat = history(&[50.0; 21]);
        let result = f.forecast(&SkuId::new("SKU-1"), &flat, 14).unwrap();

        let summary = result.summary();
        assert!((summary.mean - 50.0).abs() < 1e-9);
        assert!(summary.std.abs() < 1e-9);
    }

    #[test]
    fn predict_after_continues_the_trained_timeline() {
        let f = forecaster();
        let model = f.train(&SkuId::new("SKU-1"), &history(&noisy_weekly(28))).unwrap();
        let through = model.trained_through();

        let direct = f.predict(&model, 5).unwrap();
        let later = f.predict_after(&model, through + chrono::Days::new(2), 3).unwrap();
        assert_eq!(later.horizon_points[0].timestamp, through + chrono::Days::new(3));
        assert_eq!(later.horizon_points[0], direct.horizon_points[2]);

        let earlier = through - chrono::Days::new(1);
        assert!(matches!(
            f.predict_after(&model, earlier, 3),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let cfg = ForecastConfig {
            season_length: 0,
            ..ForecastConfig::default()
        };
        assert!(matches!(Forecaster::new(cfg), Err(EngineError::InvalidInput(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: every valid request yields `days` points with ordered bounds.
        #[test]
        fn bounds_are_ordered_for_any_history(
            values in prop::collection::vec(0.0f64..500.0f64, 14..90),
            days in 1i64..60i64,
        ) {
            let f = forecaster();
            let result = f.forecast(&SkuId::new("SKU-P"), &history(&values), days).unwrap();

            prop_assert_eq!(result.horizon_points.len(), days as usize);
            let mut prev_width = 0.0f64;
            for p in &result.horizon_points {
                prop_assert!(p.lower_bound <= p.predicted_quantity);
                prop_assert!(p.predicted_quantity <= p.upper_bound);
                let width = p.upper_bound - p.lower_bound;
                prop_assert!(width + 1e-9 >= prev_width);
                prev_width = width;
            }
        }
    }
}
