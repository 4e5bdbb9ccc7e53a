//! Black-box tests: JSON requests in, JSON responses out, through the public
//! `DecisionService` exactly as the CLI drives it.

use optibrain_api::{DecisionService, EngineConfig, ErrorKind, Operation};
use serde_json::{Value, json};

fn service() -> DecisionService {
    DecisionService::new(&EngineConfig::default()).expect("default config is valid")
}

fn call(op: Operation, body: Value) -> Result<Value, optibrain_api::ApiError> {
    service().handle_json(op, &body.to_string())
}

fn weekly_history(days: u32) -> Vec<Value> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..days)
        .map(|t| {
            let weekly = [12.0, 3.0, 0.0, -2.0, -4.0, -6.0, -3.0][(t % 7) as usize];
            let ds = start + chrono::Days::new(u64::from(t));
            json!({"ds": ds.format("%Y-%m-%d").to_string(), "y": 100.0 + 0.5 * f64::from(t) + weekly})
        })
        .collect()
}

#[test]
fn forecast_contract() {
    let out = call(Operation::Forecast, json!({"history": weekly_history(56), "days": 10})).unwrap();
    let points = out["forecast"].as_array().unwrap();
    assert_eq!(points.len(), 10);

    // Starts the day after the last observation (2024-02-25) and is contiguous.
    assert_eq!(points[0]["ds"], "2024-02-26");
    assert_eq!(points[9]["ds"], "2024-03-06");

    let mut prev_width = 0.0;
    for p in points {
        let (lo, y, hi) = (
            p["yhat_lower"].as_f64().unwrap(),
            p["yhat"].as_f64().unwrap(),
            p["yhat_upper"].as_f64().unwrap(),
        );
        assert!(lo <= y && y <= hi);
        assert!(hi - lo >= prev_width - 1e-9);
        prev_width = hi - lo;
    }
}

#[test]
fn forecast_accepts_datetime_ds() {
    let history: Vec<Value> = weekly_history(14)
        .into_iter()
        .map(|mut p| {
            let day = p["ds"].as_str().unwrap().to_string();
            p["ds"] = json!(format!("{day}T00:00:00"));
            p
        })
        .collect();
    let out = call(Operation::Forecast, json!({"history": history, "days": 1})).unwrap();
    assert_eq!(out["forecast"][0]["ds"], "2024-01-15");
}

#[test]
fn forecast_errors() {
    let err = call(Operation::Forecast, json!({"history": weekly_history(5), "days": 3})).unwrap_err();
    assert_eq!(err.code(), "insufficient_data");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = call(Operation::Forecast, json!({"history": weekly_history(28), "days": 0})).unwrap_err();
    assert_eq!(err.code(), "invalid_horizon");
}

#[test]
fn price_contract() {
    let out = call(
        Operation::Price,
        json!({
            "current_price": 100.0,
            "forecast": 150.0,
            "inventory_level": 5,
            "min_price": 90.0,
            "max_price": 120.0
        }),
    )
    .unwrap();
    assert_eq!(out, json!({"recommended_price": 115.5, "reason": "combined"}));

    let out = call(
        Operation::Price,
        json!({
            "current_price": 115.0,
            "forecast": 150.0,
            "inventory_level": 5,
            "min_price": 90.0,
            "max_price": 120.0
        }),
    )
    .unwrap();
    assert_eq!(out["recommended_price"], 120.0);
}

#[test]
fn inverted_price_band_is_rejected() {
    let err = call(
        Operation::Price,
        json!({
            "current_price": 100.0,
            "forecast": 50.0,
            "inventory_level": 50,
            "min_price": 120.0,
            "max_price": 90.0
        }),
    )
    .unwrap_err();
    assert_eq!(err.code(), "invalid_price_band");
    assert_eq!(err.to_json()["error"], "invalid_price_band");
}

#[test]
fn inventory_contract() {
    let out = call(
        Operation::Inventory,
        json!({"forecast_mean": 50.0, "forecast_std": 10.0, "lead_time_days": 9, "service_level": 0.95}),
    )
    .unwrap();
    assert_eq!(
        out,
        json!({"reorder_point": 500, "safety_stock": 50, "suggested_order_quantity": 700})
    );
}

#[test]
fn replenishment_check_is_idempotent() {
    let body = json!({
        "forecast_mean": 50.0,
        "forecast_std": 10.0,
        "lead_time_days": 9,
        "service_level": 0.95,
        "current_quantity": 120
    });
    let first = call(Operation::Inventory, body.clone()).unwrap();
    let second = call(Operation::Inventory, body).unwrap();
    assert_eq!(first["replenishment"], json!({"decision": "reorder", "quantity": 700}));
    assert_eq!(first, second);

    let stocked = call(
        Operation::Inventory,
        json!({"forecast_mean": 50.0, "forecast_std": 10.0, "lead_time_days": 9, "current_quantity": 500}),
    )
    .unwrap();
    assert_eq!(stocked["replenishment"], json!({"decision": "sufficient"}));
}

#[test]
fn unsupported_service_level_is_rejected() {
    let err = call(
        Operation::Inventory,
        json!({"forecast_mean": 5.0, "forecast_std": 1.0, "lead_time_days": 3, "service_level": 1.0}),
    )
    .unwrap_err();
    assert_eq!(err.code(), "unsupported_service_level");
}

#[test]
fn segment_contract() {
    let mut customers = Vec::new();
    for i in 0..6 {
        let j = f64::from(i);
        customers.push(json!({"customer_id": i, "recency": 200.0 + j, "frequency": 1.0, "monetary": 30.0 + j}));
        customers.push(json!({"customer_id": 100 + i, "recency": 40.0 + j, "frequency": 9.0, "monetary": 600.0 + j}));
        customers.push(json!({"customer_id": 200 + i, "recency": 3.0 + j, "frequency": 40.0, "monetary": 9000.0 + j}));
    }
    let out = call(Operation::Segment, json!({"customers": customers})).unwrap();
    let segments = out["segments"].as_object().unwrap();

    assert_eq!(segments.len(), 18);
    assert_eq!(segments["0"], 0);
    assert_eq!(segments["105"], 1);
    assert_eq!(segments["203"], 2);

    let again = call(Operation::Segment, json!({"customers": customers})).unwrap();
    assert_eq!(out, again);
}

#[test]
fn segment_degenerate_and_string_ids() {
    let out = call(
        Operation::Segment,
        json!({
            "customers": [
                {"customer_id": "1", "recency": 10.0, "frequency": 2.0, "monetary": 50.0},
                {"customer_id": 2, "recency": 90.0, "frequency": 1.0, "monetary": 10.0}
            ],
            "n_segments": 3
        }),
    )
    .unwrap();
    assert_eq!(out, json!({"segments": {"1": 0, "2": 0}}));

    let err = call(Operation::Segment, json!({"customers": []})).unwrap_err();
    assert_eq!(err.code(), "empty_input");
}

#[test]
fn route_contract() {
    let out = call(
        Operation::Route,
        json!({
            "order_id": 77,
            "sku_id": "SKU-1",
            "quantity": 2,
            "nodes": [
                {"id": 1, "is_active": true, "priority": 2},
                {"id": 2, "is_active": true, "priority": 1},
                {"id": 3, "is_active": false, "priority": 0}
            ]
        }),
    )
    .unwrap();
    assert_eq!(out, json!({"order_id": 77, "fulfillment_node_id": 2, "status": "routed"}));
}

#[test]
fn route_errors_are_distinct() {
    let empty = call(
        Operation::Route,
        json!({"order_id": 1, "sku_id": "A", "quantity": 1, "nodes": []}),
    )
    .unwrap_err();
    assert_eq!(empty.code(), "empty_input");

    let inactive = call(
        Operation::Route,
        json!({
            "order_id": 1,
            "sku_id": "A",
            "quantity": 1,
            "nodes": [{"id": 1, "is_active": false, "priority": 0}]
        }),
    )
    .unwrap_err();
    assert_eq!(inactive.code(), "no_available_node");
    assert_eq!(inactive.http_status(), 404);
}

#[test]
fn malformed_requests_never_reach_components() {
    let err = call(Operation::Inventory, json!({"forecast_mean": "lots"})).unwrap_err();
    assert_eq!(err.code(), "malformed_request");
    assert_eq!(err.http_status(), 400);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 200,
            ..ProptestConfig::default()
        })]

        /// Property: whatever the signals, the JSON price lands inside the band.
        #[test]
        fn price_response_stays_in_band(
            current in 0.0f64..1_000.0,
            forecast in 0.0f64..300.0,
            inventory in 0i64..50,
            min in 0.0f64..500.0,
            width in 0.0f64..500.0,
        ) {
            let svc = service();
            let body = json!({
                "current_price": current,
                "forecast": forecast,
                "inventory_level": inventory,
                "min_price": min,
                "max_price": min + width
            });
            let out = svc.handle_json(Operation::Price, &body.to_string()).unwrap();
            let price = out["recommended_price"].as_f64().unwrap();
            prop_assert!(price >= min && price <= min + width);
        }
    }
}
