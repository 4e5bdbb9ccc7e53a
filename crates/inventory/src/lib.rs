//! Inventory optimization.
//!
//! Turns demand statistics (mean/std-dev of daily demand) and supplier lead
//! time into replenishment thresholds. Whether to actually raise a purchase
//! order stays with the caller; [`ReplenishmentPlan::evaluate`] is the pure
//! comparison they can use.

pub mod config;
pub mod optimizer;
pub mod service_level;

pub use config::{InventoryConfig, OrderQuantityPolicy};
pub use optimizer::{InventoryOptimizer, ReorderDecision, ReplenishmentPlan};
pub use service_level::z_score;
