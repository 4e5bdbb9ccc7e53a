//! Request/response contracts.
//!
//! Field names are fixed by the collaborating services and must not change.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use optibrain_core::{CustomerId, NodeId, OrderId, SkuId};
use optibrain_forecasting::{ForecastResult, TimeSeriesPoint};
use optibrain_inventory::{ReorderDecision, ReplenishmentPlan};
use optibrain_pricing::{PriceDecision, PriceReason};
use optibrain_routing::{FulfillmentNode, RoutingDecision};
use optibrain_segmentation::{CustomerFeatureVector, SegmentAssignment};

// -------------------------
// Forecast
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    #[serde(deserialize_with = "de_day")]
    pub ds: NaiveDate,
    pub y: f64,
}

impl From<&HistoryPoint> for TimeSeriesPoint {
    fn from(p: &HistoryPoint) -> Self {
        TimeSeriesPoint::new(p.ds, p.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// When present the model is cached per SKU; otherwise every call refits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_id: Option<SkuId>,
    pub history: Vec<HistoryPoint>,
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    7
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub forecast: Vec<ForecastEntry>,
}

impl From<ForecastResult> for ForecastResponse {
    fn from(result: ForecastResult) -> Self {
        Self {
            forecast: result
                .horizon_points
                .into_iter()
                .map(|p| ForecastEntry {
                    ds: p.timestamp,
                    yhat: p.predicted_quantity,
                    yhat_lower: p.lower_bound,
                    yhat_upper: p.upper_bound,
                })
                .collect(),
        }
    }
}

// -------------------------
// Pricing
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRequest {
    pub current_price: f64,
    pub forecast: f64,
    pub inventory_level: i64,
    pub min_price: f64,
    pub max_price: f64,
    /// Optional cap on the step up from `current_price` (0.1 = +10%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_increase_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResponse {
    pub recommended_price: f64,
    pub reason: PriceReason,
}

impl From<PriceDecision> for PriceResponse {
    fn from(d: PriceDecision) -> Self {
        Self {
            recommended_price: d.recommended_price,
            reason: d.reason,
        }
    }
}

// -------------------------
// Inventory
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRequest {
    pub forecast_mean: f64,
    pub forecast_std: f64,
    pub lead_time_days: i64,
    /// Falls back to the configured default (0.95).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_level: Option<f64>,
    /// On-hand stock; when given the response also carries the reorder decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_quantity: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryResponse {
    pub reorder_point: u64,
    pub safety_stock: u64,
    pub suggested_order_quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replenishment: Option<ReorderDecision>,
}

impl InventoryResponse {
    pub fn new(plan: ReplenishmentPlan, current_quantity: Option<i64>) -> Self {
        Self {
            reorder_point: plan.reorder_point,
            safety_stock: plan.safety_stock,
            suggested_order_quantity: plan.suggested_order_quantity,
            replenishment: current_quantity.map(|q| plan.evaluate(q)),
        }
    }
}

// -------------------------
// Segmentation
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRequest {
    pub customers: Vec<CustomerFeatureVector>,
    /// Falls back to the configured default (3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_segments: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentResponse {
    /// customer_id -> segment rank; keys serialise as strings.
    pub segments: BTreeMap<CustomerId, usize>,
}

impl From<SegmentAssignment> for SegmentResponse {
    fn from(a: SegmentAssignment) -> Self {
        Self {
            segments: a.assignments,
        }
    }
}

// -------------------------
// Routing
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub order_id: OrderId,
    pub sku_id: SkuId,
    pub quantity: u64,
    pub nodes: Vec<FulfillmentNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub order_id: OrderId,
    pub fulfillment_node_id: NodeId,
    pub status: String,
}

impl From<RoutingDecision> for RouteResponse {
    fn from(d: RoutingDecision) -> Self {
        Self {
            order_id: d.order_id,
            fulfillment_node_id: d.assigned_node_id,
            status: "routed".to_string(),
        }
    }
}

// -------------------------
// Helpers
// -------------------------

/// Accepts `YYYY-MM-DD`, a naive datetime (`T` or space separated) or RFC 3339;
/// only the calendar day is kept.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn de_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_day(&raw).ok_or_else(|| serde::de::Error::custom(format!("ds is not a date: {raw:?}")))
}
