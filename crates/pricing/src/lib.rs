//! Dynamic pricing.
//!
//! A bounded, rule-based price recommender: an ordered list of named
//! multiplicative adjustments, an optional step-up cap, and a final clamp to
//! the SKU's price band.

pub mod config;
pub mod engine;
pub mod rules;

pub use config::PricingConfig;
pub use engine::{PriceBand, PriceDecision, PriceReason, PricingEngine};
pub use rules::{AdjustmentRule, RuleKind, default_rules};
