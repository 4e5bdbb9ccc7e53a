use serde::{Deserialize, Serialize};

use crate::rules::{AdjustmentRule, default_rules};

/// Pricing engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Ordered adjustment rules.
    #[serde(default = "default_rules")]
    pub rules: Vec<AdjustmentRule>,

    /// Decimal places of the output price.
    #[serde(default = "default_currency_precision")]
    pub currency_precision: u32,
}

impl PricingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (idx, rule) in self.rules.iter().enumerate() {
            rule.validate(idx, &mut issues);
        }

        // High and low demand must never fire together.
        let high = self.rules.iter().find_map(|r| match r {
            AdjustmentRule::DemandHigh { threshold, .. } => Some(*threshold),
            _ => None,
        });
        let low = self.rules.iter().find_map(|r| match r {
            AdjustmentRule::DemandLow { threshold, .. } => Some(*threshold),
            _ => None,
        });
        if let (Some(high), Some(low)) = (high, low) {
            if low > high {
                issues.push(format!(
                    "pricing demand_low threshold {low} must not exceed demand_high threshold {high}"
                ));
            }
        }

        if self.currency_precision > 6 {
            issues.push("pricing.currency_precision must be <= 6".to_string());
        }
        issues
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            currency_precision: default_currency_precision(),
        }
    }
}

fn default_currency_precision() -> u32 {
    2
}
