//! Named multiplicative price adjustments.

use serde::{Deserialize, Serialize};

/// One adjustment rule. Rules are evaluated in order and every rule that
/// fires multiplies the running price by its factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AdjustmentRule {
    /// Forecast signal strictly above `threshold` -> raise by `factor` (> 1).
    DemandHigh { threshold: f64, factor: f64 },
    /// Forecast signal strictly below `threshold` -> lower by `factor` (< 1).
    DemandLow { threshold: f64, factor: f64 },
    /// Inventory strictly below `threshold` units -> raise by `factor` (> 1).
    LowInventory { threshold: i64, factor: f64 },
}

/// Which rule fired, without its parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    DemandHigh,
    DemandLow,
    LowInventory,
}

impl RuleKind {
    pub fn is_demand(self) -> bool {
        matches!(self, RuleKind::DemandHigh | RuleKind::DemandLow)
    }
}

impl AdjustmentRule {
    pub fn kind(&self) -> RuleKind {
        match self {
            AdjustmentRule::DemandHigh { .. } => RuleKind::DemandHigh,
            AdjustmentRule::DemandLow { .. } => RuleKind::DemandLow,
            AdjustmentRule::LowInventory { .. } => RuleKind::LowInventory,
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            AdjustmentRule::DemandHigh { factor, .. }
            | AdjustmentRule::DemandLow { factor, .. }
            | AdjustmentRule::LowInventory { factor, .. } => *factor,
        }
    }

    /// Factor to apply for this input, if the rule fires.
    pub fn evaluate(&self, forecast_signal: f64, inventory_level: i64) -> Option<f64> {
        let fires = match self {
            AdjustmentRule::DemandHigh { threshold, .. } => forecast_signal > *threshold,
            AdjustmentRule::DemandLow { threshold, .. } => forecast_signal < *threshold,
            AdjustmentRule::LowInventory { threshold, .. } => inventory_level < *threshold,
        };
        fires.then(|| self.factor())
    }

    pub(crate) fn validate(&self, idx: usize, issues: &mut Vec<String>) {
        let factor = self.factor();
        let ok = factor.is_finite()
            && match self {
                AdjustmentRule::DemandHigh { threshold, .. } => threshold.is_finite() && factor > 1.0,
                AdjustmentRule::DemandLow { threshold, .. } => {
                    threshold.is_finite() && factor > 0.0 && factor < 1.0
                }
                AdjustmentRule::LowInventory { .. } => factor > 1.0,
            };
        if !ok {
            issues.push(format!(
                "pricing.rules[{idx}] ({:?}) has an out-of-range threshold or factor {factor}",
                self.kind()
            ));
        }
    }
}

/// Default rule set: +10% above 100 forecast units, -10% below 20,
/// +5% when fewer than 10 units are on hand.
pub fn default_rules() -> Vec<AdjustmentRule> {
    vec![
        AdjustmentRule::DemandHigh {
            threshold: 100.0,
            factor: 1.10,
        },
        AdjustmentRule::DemandLow {
            threshold: 20.0,
            factor: 0.90,
        },
        AdjustmentRule::LowInventory {
            threshold: 10,
            factor: 1.05,
        },
    ]
}
