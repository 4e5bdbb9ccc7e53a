//! Per-SKU cache of trained forecast models.
//!
//! Lifecycle:
//! - created on the first forecast request for a SKU
//! - reused while the supplied history starts with the trained data and adds
//!   fewer than `staleness_days` new days
//! - retrained (and replaced) once history moves past the staleness threshold,
//!   ends earlier than the trained data, or no longer matches it
//! - dropped explicitly via `invalidate`
//!
//! Every request's history is validated before the cache is consulted.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use optibrain_core::{EngineError, EngineResult, SkuId};

use crate::config::RegistryConfig;
use crate::forecaster::{ForecastResult, Forecaster};
use crate::model::ModelHandle;
use crate::series::{DailySeries, TimeSeriesPoint};

#[derive(Debug)]
pub struct ModelRegistry {
    forecaster: Forecaster,
    config: RegistryConfig,
    models: RwLock<HashMap<SkuId, Arc<ModelHandle>>>,
}

impl ModelRegistry {
    pub fn new(forecaster: Forecaster, config: RegistryConfig) -> EngineResult<Self> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(EngineError::invalid_input(issues.join("; ")));
        }
        Ok(Self {
            forecaster,
            config,
            models: RwLock::new(HashMap::new()),
        })
    }

    pub fn forecaster(&self) -> &Forecaster {
        &self.forecaster
    }

    /// Return the cached model for `sku_id`, training a new one when none is
    /// cached or the cached one does not fit `history`.
    ///
    /// Training happens outside the lock; the map only ever holds fully
    /// trained models.
    pub fn get_or_train(
        &self,
        sku_id: &SkuId,
        history: &[TimeSeriesPoint],
    ) -> EngineResult<Arc<ModelHandle>> {
        let series = self.forecaster.prepare(history)?;
        Ok(self.resolve(sku_id, &series))
    }

    /// Forecast through the cache, starting the day after the last observation
    /// in `history`.
    pub fn forecast(
        &self,
        sku_id: &SkuId,
        history: &[TimeSeriesPoint],
        days: i64,
    ) -> EngineResult<ForecastResult> {
        if days < 1 || days > self.forecaster.config().max_horizon_days {
            return Err(EngineError::InvalidHorizon(days));
        }
        let series = self.forecaster.prepare(history)?;
        let model = self.resolve(sku_id, &series);
        self.forecaster.predict_after(&model, series.last_date(), days)
    }

    fn resolve(&self, sku_id: &SkuId, series: &DailySeries) -> Arc<ModelHandle> {
        if let Some(existing) = self.cached(sku_id) {
            let new_days = series.values.len() as i64 - existing.observations() as i64;
            if existing.is_prefix_of(series) && new_days < self.config.staleness_days {
                return existing;
            }
        }

        let model = Arc::new(self.forecaster.fit(sku_id, series));

        let previous = self
            .models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sku_id.clone(), Arc::clone(&model));

        match previous {
            Some(old) => info!(
                sku = %sku_id,
                model_id = %model.id(),
                replaced = %old.id(),
                trained_through = %model.trained_through(),
                "forecast model retrained"
            ),
            None => info!(
                sku = %sku_id,
                model_id = %model.id(),
                trained_through = %model.trained_through(),
                "forecast model registered"
            ),
        }

        model
    }

    pub fn cached(&self, sku_id: &SkuId) -> Option<Arc<ModelHandle>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sku_id)
            .cloned()
    }

    /// Drop the cached model; the next request retrains.
    pub fn invalidate(&self, sku_id: &SkuId) -> bool {
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(sku_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.models.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
