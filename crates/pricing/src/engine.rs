use serde::{Deserialize, Serialize};
use tracing::debug;

use optibrain_core::{EngineError, EngineResult, ensure_finite, ensure_non_negative};

use crate::config::PricingConfig;
use crate::rules::RuleKind;

/// Allowed price range for one SKU.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    min_price: f64,
    max_price: f64,
    /// Largest step up from the current price in one recommendation
    /// (0.1 = +10%); `None` leaves only the band.
    max_increase_pct: Option<f64>,
}

impl PriceBand {
    pub fn new(min_price: f64, max_price: f64) -> EngineResult<Self> {
        let min = ensure_non_negative("min_price", min_price)?;
        let max = ensure_non_negative("max_price", max_price)?;
        if min > max {
            return Err(EngineError::InvalidPriceBand { min, max });
        }
        Ok(Self {
            min_price: min,
            max_price: max,
            max_increase_pct: None,
        })
    }

    pub fn with_max_increase_pct(mut self, pct: f64) -> EngineResult<Self> {
        self.max_increase_pct = Some(ensure_non_negative("max_increase_pct", pct)?);
        Ok(self)
    }

    pub fn min_price(&self) -> f64 {
        self.min_price
    }

    pub fn max_price(&self) -> f64 {
        self.max_price
    }

    pub fn max_increase_pct(&self) -> Option<f64> {
        self.max_increase_pct
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min_price && price <= self.max_price
    }
}

/// Which adjustments drove the recommendation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceReason {
    NoChange,
    DemandDriven,
    InventoryDriven,
    Combined,
}

impl PriceReason {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceReason::NoChange => "no_change",
            PriceReason::DemandDriven => "demand_driven",
            PriceReason::InventoryDriven => "inventory_driven",
            PriceReason::Combined => "combined",
        }
    }

    fn from_applied(applied: &[RuleKind]) -> Self {
        let demand = applied.iter().any(|k| k.is_demand());
        let inventory = applied.contains(&RuleKind::LowInventory);
        match (demand, inventory) {
            (false, false) => PriceReason::NoChange,
            (true, false) => PriceReason::DemandDriven,
            (false, true) => PriceReason::InventoryDriven,
            (true, true) => PriceReason::Combined,
        }
    }
}

impl core::fmt::Display for PriceReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recommended price. Invariant: inside the band it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDecision {
    pub recommended_price: f64,
    pub reason: PriceReason,
    /// Rules that fired, in evaluation order.
    pub applied_rules: Vec<RuleKind>,
    /// The step-up cap lowered the adjusted price.
    pub capped: bool,
    /// The band clamp moved the adjusted price.
    pub clamped: bool,
}

/// Rule-based price recommender.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> EngineResult<Self> {
        let issues = config.validate();
        if !issues.is_empty() {
            return Err(EngineError::invalid_input(issues.join("; ")));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Adjust `current_price` by every firing rule, cap the step up, clamp to
    /// the band (always last), then round to currency precision.
    pub fn recommend(
        &self,
        current_price: f64,
        forecast_signal: f64,
        inventory_level: i64,
        band: &PriceBand,
    ) -> EngineResult<PriceDecision> {
        let current = ensure_non_negative("current_price", current_price)?;
        let signal = ensure_finite("forecast", forecast_signal)?;

        let mut price = current;
        let mut applied = Vec::new();
        for rule in &self.config.rules {
            if let Some(factor) = rule.evaluate(signal, inventory_level) {
                price *= factor;
                applied.push(rule.kind());
            }
        }

        let mut capped = false;
        if let Some(pct) = band.max_increase_pct {
            let ceiling = current * (1.0 + pct);
            if price > ceiling {
                price = ceiling;
                capped = true;
            }
        }

        let clamped = !band.contains(price);
        let price = price.clamp(band.min_price, band.max_price);
        let recommended_price = round_within(price, self.config.currency_precision, band);

        let reason = PriceReason::from_applied(&applied);
        debug!(
            current_price = current,
            forecast = signal,
            inventory_level,
            recommended_price,
            reason = reason.as_str(),
            capped,
            clamped,
            "price recommended"
        );

        Ok(PriceDecision {
            recommended_price,
            reason,
            applied_rules: applied,
            capped,
            clamped,
        })
    }
}

/// Round to `precision` decimals; a rounded value that leaves the band snaps
/// back to the violated bound.
fn round_within(price: f64, precision: u32, band: &PriceBand) -> f64 {
    let scale = 10f64.powi(precision as i32);
    let rounded = (price * scale).round() / scale;
    rounded.clamp(band.min_price, band.max_price)
}
