use serde::{Deserialize, Serialize};
use tracing::debug;

use optibrain_core::{EngineError, EngineResult, ensure_non_negative};

use crate::config::{InventoryConfig, OrderQuantityPolicy};
use crate::service_level::z_score;

const DAYS_PER_YEAR: f64 = 365.0;

/// Replenishment thresholds for one SKU/location.
///
/// Every field is rounded up from the continuous computation: under-ordering
/// is the worse failure mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentPlan {
    pub reorder_point: u64,
    pub safety_stock: u64,
    pub suggested_order_quantity: u64,
}

/// Outcome of comparing on-hand stock against a plan.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReorderDecision {
    Reorder { quantity: u64 },
    Sufficient,
}

impl ReplenishmentPlan {
    /// Caller-side replenishment check: reorder strictly below the reorder
    /// point. Pure, so re-running it on unchanged stock yields the same answer.
    pub fn evaluate(&self, current_quantity: i64) -> ReorderDecision {
        let below = i128::from(current_quantity) < i128::from(self.reorder_point);
        if below {
            ReorderDecision::Reorder {
                quantity: self.suggested_order_quantity,
            }
        } else {
            ReorderDecision::Sufficient
        }
    }
}

/// Converts demand statistics and supplier lead time into a reorder point,
/// safety stock and order quantity.
#[derive(Debug, Clone, Default)]
pub struct InventoryOptimizer {
    config: InventoryConfig,
}

impl InventoryOptimizer {
    pub fn new(config: InventoryConfig) -> EngineResult<Self> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(EngineError::invalid_input(issues.join("; ")));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// - `safety_stock = z(service_level) * std * sqrt(lead_time)`
    /// - `reorder_point = mean * lead_time + safety_stock`
    /// - `suggested_order_quantity` per the configured policy
    pub fn optimize(
        &self,
        forecast_mean: f64,
        forecast_std: f64,
        lead_time_days: i64,
        service_level: f64,
    ) -> EngineResult<ReplenishmentPlan> {
        let mean = ensure_non_negative("forecast_mean", forecast_mean)?;
        let std = ensure_non_negative("forecast_std", forecast_std)?;
        if lead_time_days < 1 {
            return Err(EngineError::invalid_input(format!(
                "lead_time_days must be >= 1, got {lead_time_days}"
            )));
        }
        let z = z_score(service_level)?;

        let lead_time = lead_time_days as f64;
        // Service levels below 50% give a negative z; the buffer never goes below zero.
        let safety_stock = (z * std * lead_time.sqrt()).max(0.0);
        let reorder_point = mean * lead_time + safety_stock;
        let order_quantity = self.order_quantity(mean);

        let plan = ReplenishmentPlan {
            reorder_point: ceil_units(reorder_point),
            safety_stock: ceil_units(safety_stock),
            suggested_order_quantity: ceil_units(order_quantity),
        };

        debug!(
            forecast_mean = mean,
            forecast_std = std,
            lead_time_days,
            service_level,
            z,
            reorder_point = plan.reorder_point,
            safety_stock = plan.safety_stock,
            order_quantity = plan.suggested_order_quantity,
            "replenishment plan computed"
        );

        Ok(plan)
    }

    /// Same as [`optimize`](Self::optimize) with the configured default service level.
    pub fn optimize_default(
        &self,
        forecast_mean: f64,
        forecast_std: f64,
        lead_time_days: i64,
    ) -> EngineResult<ReplenishmentPlan> {
        self.optimize(forecast_mean, forecast_std, lead_time_days, self.config.default_service_level)
    }

    fn order_quantity(&self, mean: f64) -> f64 {
        match &self.config.order_quantity {
            OrderQuantityPolicy::ReviewPeriod { days } => mean * f64::from(*days),
            OrderQuantityPolicy::Eoq {
                ordering_cost,
                annual_holding_cost,
            } => (2.0 * mean * DAYS_PER_YEAR * ordering_cost / annual_holding_cost).sqrt(),
        }
    }
}

fn ceil_units(x: f64) -> u64 {
    // Float-to-int casts saturate; inputs are already validated as finite and >= 0.
    x.ceil() as u64
}
