//! Decision service: the configured components behind the JSON contracts.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use optibrain_core::{EngineResult, SkuId};
use optibrain_forecasting::{Forecaster, ModelRegistry, TimeSeriesPoint};
use optibrain_inventory::InventoryOptimizer;
use optibrain_pricing::{PriceBand, PricingEngine};
use optibrain_routing::{Order, OrderRouter};
use optibrain_segmentation::CustomerSegmenter;

use crate::config::EngineConfig;
use crate::dto::{
    ForecastRequest, ForecastResponse, InventoryRequest, InventoryResponse, PriceRequest, PriceResponse,
    RouteRequest, RouteResponse, SegmentRequest, SegmentResponse,
};
use crate::errors::ApiError;

/// SKU label for forecasts requested without one (never cached).
const UNSPECIFIED_SKU: &str = "unspecified";

/// One decision operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Forecast,
    Price,
    Inventory,
    Segment,
    Route,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Forecast => "forecast",
            Operation::Price => "price",
            Operation::Inventory => "inventory",
            Operation::Segment => "segment",
            Operation::Route => "route",
        }
    }
}

/// Holds one instance of every component plus the per-SKU model registry.
///
/// All methods take `&self`; the service can be shared across threads.
#[derive(Debug)]
pub struct DecisionService {
    registry: ModelRegistry,
    inventory: InventoryOptimizer,
    pricing: PricingEngine,
    segmenter: CustomerSegmenter,
    router: OrderRouter,
}

impl DecisionService {
    pub fn new(config: &EngineConfig) -> EngineResult<Self> {
        let forecaster = Forecaster::new(config.forecast.clone())?;
        Ok(Self {
            registry: ModelRegistry::new(forecaster, config.registry.clone())?,
            inventory: InventoryOptimizer::new(config.inventory.clone())?,
            pricing: PricingEngine::new(config.pricing.clone())?,
            segmenter: CustomerSegmenter::new(config.segmentation.clone())?,
            router: OrderRouter::new(),
        })
    }

    /// Replace the router, e.g. with [`OrderRouter::inventory_aware`].
    pub fn with_router(mut self, router: OrderRouter) -> Self {
        self.router = router;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn forecast(&self, req: &ForecastRequest) -> Result<ForecastResponse, ApiError> {
        let history: Vec<TimeSeriesPoint> = req.history.iter().map(TimeSeriesPoint::from).collect();
        let result = match &req.sku_id {
            Some(sku) => self.registry.forecast(sku, &history, req.days)?,
            None => self
                .registry
                .forecaster()
                .forecast(&SkuId::new(UNSPECIFIED_SKU), &history, req.days)?,
        };
        Ok(result.into())
    }

    pub fn optimize_price(&self, req: &PriceRequest) -> Result<PriceResponse, ApiError> {
        let mut band = PriceBand::new(req.min_price, req.max_price)?;
        if let Some(pct) = req.max_increase_pct {
            band = band.with_max_increase_pct(pct)?;
        }
        let decision = self
            .pricing
            .recommend(req.current_price, req.forecast, req.inventory_level, &band)?;
        Ok(decision.into())
    }

    pub fn optimize_inventory(&self, req: &InventoryRequest) -> Result<InventoryResponse, ApiError> {
        let plan = match req.service_level {
            Some(level) => self
                .inventory
                .optimize(req.forecast_mean, req.forecast_std, req.lead_time_days, level)?,
            None => self
                .inventory
                .optimize_default(req.forecast_mean, req.forecast_std, req.lead_time_days)?,
        };
        Ok(InventoryResponse::new(plan, req.current_quantity))
    }

    pub fn segment(&self, req: &SegmentRequest) -> Result<SegmentResponse, ApiError> {
        let assignment = match req.n_segments {
            Some(k) => self.segmenter.segment(&req.customers, k)?,
            None => self.segmenter.segment_default(&req.customers)?,
        };
        Ok(assignment.into())
    }

    pub fn route(&self, req: &RouteRequest) -> Result<RouteResponse, ApiError> {
        let mut order = Order::new(req.order_id, req.sku_id.clone(), req.quantity)?;
        let decision = self.router.route(&mut order, &req.nodes)?;
        Ok(decision.into())
    }

    /// JSON in, JSON out for one operation.
    pub fn handle_json(&self, op: Operation, body: &str) -> Result<serde_json::Value, ApiError> {
        let outcome = match op {
            Operation::Forecast => call(body, |r: &ForecastRequest| self.forecast(r)),
            Operation::Price => call(body, |r: &PriceRequest| self.optimize_price(r)),
            Operation::Inventory => call(body, |r: &InventoryRequest| self.optimize_inventory(r)),
            Operation::Segment => call(body, |r: &SegmentRequest| self.segment(r)),
            Operation::Route => call(body, |r: &RouteRequest| self.route(r)),
        };

        match &outcome {
            Ok(_) => info!(operation = op.as_str(), "request handled"),
            Err(e) => warn!(operation = op.as_str(), code = e.code(), error = %e, "request rejected"),
        }
        outcome
    }
}

fn call<Req, Resp, F>(body: &str, f: F) -> Result<serde_json::Value, ApiError>
where
    Req: DeserializeOwned,
    Resp: Serialize,
    F: FnOnce(&Req) -> Result<Resp, ApiError>,
{
    let req: Req = serde_json::from_str(body).map_err(ApiError::malformed)?;
    let resp = f(&req)?;
    serde_json::to_value(resp).map_err(ApiError::encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> DecisionService {
        DecisionService::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn forecasts_with_sku_are_cached() {
        let svc = service();
        let history: Vec<_> = (1..=21)
            .map(|d| json!({"ds": format!("2024-01-{d:02}"), "y": 10.0 + d as f64}))
            .collect();
        let body = json!({"sku_id": "SKU-9", "history": history, "days": 3}).to_string();

        let out = svc.handle_json(Operation::Forecast, &body).unwrap();
        assert_eq!(out["forecast"].as_array().unwrap().len(), 3);
        assert_eq!(svc.registry().len(), 1);

        let no_sku = json!({"history": history, "days": 3}).to_string();
        svc.handle_json(Operation::Forecast, &no_sku).unwrap();
        assert_eq!(svc.registry().len(), 1);
    }

    #[test]
    fn cached_sku_does_not_mask_invalid_history() {
        let svc = service();
        let history: Vec<_> = (1..=21)
            .map(|d| json!({"ds": format!("2024-01-{d:02}"), "y": 10.0 + d as f64}))
            .collect();
        let body = json!({"sku_id": "SKU-9", "history": history, "days": 3}).to_string();
        svc.handle_json(Operation::Forecast, &body).unwrap();

        let empty = json!({"sku_id": "SKU-9", "history": [], "days": 3}).to_string();
        let err = svc.handle_json(Operation::Forecast, &empty).unwrap_err();
        assert_eq!(err.code(), "insufficient_data");

        let mut reversed = history.clone();
        reversed.swap(4, 5);
        let body = json!({"sku_id": "SKU-9", "history": reversed, "days": 3}).to_string();
        let err = svc.handle_json(Operation::Forecast, &body).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn malformed_json_is_reported_as_such() {
        let err = service().handle_json(Operation::Price, "{not json").unwrap_err();
        assert_eq!(err.code(), "malformed_request");
    }

    #[test]
    fn inventory_uses_default_service_level() {
        let out = service()
            .optimize_inventory(&InventoryRequest {
                forecast_mean: 50.0,
                forecast_std: 10.0,
                lead_time_days: 9,
                service_level: None,
                current_quantity: None,
            })
            .unwrap();
        assert_eq!(out.safety_stock, 50);
        assert_eq!(out.reorder_point, 500);
    }

    #[test]
    fn inventory_aware_router_can_be_swapped_in() {
        use optibrain_core::NodeId;
        use optibrain_routing::InMemoryStock;
        use std::sync::Arc;

        let stock = Arc::new(InMemoryStock::new());
        stock.set(NodeId::new(2), SkuId::new("A"), 10);
        let svc = service().with_router(OrderRouter::inventory_aware(stock));

        let body = json!({
            "order_id": 1,
            "sku_id": "A",
            "quantity": 4,
            "nodes": [
                {"id": 1, "is_active": true, "priority": 0},
                {"id": 2, "is_active": true, "priority": 5}
            ]
        })
        .to_string();
        let out = svc.handle_json(Operation::Route, &body).unwrap();
        assert_eq!(out["fulfillment_node_id"], 2);
    }
}
