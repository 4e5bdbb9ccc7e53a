use serde::{Deserialize, Serialize};

/// How the suggested order quantity is sized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum OrderQuantityPolicy {
    /// Cover `days` of mean demand (periodic-review proxy for EOQ).
    ReviewPeriod { days: u32 },
    /// Classic economic order quantity: `sqrt(2 * D * S / H)`, with `D` the
    /// annualised mean demand, `S` the fixed cost per order and `H` the cost of
    /// holding one unit for a year.
    Eoq {
        ordering_cost: f64,
        annual_holding_cost: f64,
    },
}

impl Default for OrderQuantityPolicy {
    fn default() -> Self {
        Self::ReviewPeriod { days: 14 }
    }
}

/// Inventory optimizer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Service level applied when a request does not name one.
    #[serde(default = "default_service_level")]
    pub default_service_level: f64,

    #[serde(default)]
    pub order_quantity: OrderQuantityPolicy,
}

impl InventoryConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !(self.default_service_level > 0.0 && self.default_service_level < 1.0) {
            issues.push("inventory.default_service_level must lie strictly between 0 and 1".to_string());
        }
        match &self.order_quantity {
            OrderQuantityPolicy::ReviewPeriod { days } => {
                if *days == 0 {
                    issues.push("inventory.order_quantity.days must be >= 1".to_string());
                }
            }
            OrderQuantityPolicy::Eoq {
                ordering_cost,
                annual_holding_cost,
            } => {
                if !(ordering_cost.is_finite() && *ordering_cost >= 0.0) {
                    issues.push("inventory.order_quantity.ordering_cost must be >= 0".to_string());
                }
                if !(annual_holding_cost.is_finite() && *annual_holding_cost > 0.0) {
                    issues.push("inventory.order_quantity.annual_holding_cost must be > 0".to_string());
                }
            }
        }
        issues
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_service_level: default_service_level(),
            order_quantity: OrderQuantityPolicy::default(),
        }
    }
}

fn default_service_level() -> f64 {
    0.95
}
