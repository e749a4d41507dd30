//! End-to-end request flows through the router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use gold_tracker::dashboard::build_router;

use crate::fake_source::{app_state, ist, FakeSource, ManualClock};

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_live_then_cached_then_stale() {
    let source = FakeSource::new(dec!(2650));
    let clock = ManualClock::at(ist(8, 0));
    let app = build_router(app_state(source.clone(), clock.clone()));

    let (status, live) = get(&app, "/api/gold-price").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(live["fromCache"], false);
    assert_eq!(live["gold24K"], 8083);
    assert_eq!(live["nextChennaiUpdate"], "4h 0m");
    assert!(live.get("cacheAge").is_none());

    clock.advance(Duration::minutes(45));
    source.set_price(dec!(2700));
    let (_, cached) = get(&app, "/api/gold-price").await;
    assert_eq!(cached["fromCache"], true);
    assert_eq!(cached["cacheAge"], "45 minutes");
    assert_eq!(cached["gold24K"], 8083);
    assert_eq!(source.calls(), 1);

    clock.advance(Duration::minutes(60));
    source.fail_with(502);
    let (status, stale) = get(&app, "/api/gold-price").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stale["fromCache"], true);
    assert_eq!(stale["warning"], "Using cached data (API error)");
    assert_eq!(stale["cacheAge"], "105 minutes");
    assert_eq!(stale["gold24K"], 8083);
    assert_eq!(source.calls(), 2);

    source.recover();
    let (_, refreshed) = get(&app, "/api/gold-price").await;
    assert_eq!(refreshed["fromCache"], false);
    assert!(refreshed["gold24K"].as_i64().unwrap() > 8083);
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_outage_with_empty_cache_is_500() {
    let source = FakeSource::new(dec!(2650));
    source.fail_with(503);
    let app = build_router(app_state(source, ManualClock::at(ist(8, 0))));

    let (status, body) = get(&app, "/api/gold-price").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch prices", "message": "Please try again" }));
}

#[tokio::test]
async fn test_revision_window_bypasses_cache() {
    let source = FakeSource::new(dec!(2650));
    let clock = ManualClock::at(ist(23, 40));
    let app = build_router(app_state(source.clone(), clock.clone()));

    get(&app, "/api/gold-price").await;
    clock.advance(Duration::minutes(17)); // 23:57
    let (_, status) = get(&app, "/").await;
    assert_eq!(status["cacheStatus"], "Expired");

    let (_, resp) = get(&app, "/api/gold-price").await;
    assert_eq!(resp["fromCache"], false);
    assert_eq!(source.calls(), 2);

    clock.advance(Duration::minutes(10)); // 00:07, past the window
    let (_, resp) = get(&app, "/api/gold-price").await;
    assert_eq!(resp["fromCache"], true);
    assert_eq!(resp["cacheAge"], "10 minutes");
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_root_reflects_cache_state() {
    let source = FakeSource::new(dec!(2650));
    let app = build_router(app_state(source, ManualClock::at(ist(14, 30))));

    let (_, before) = get(&app, "/").await;
    assert_eq!(before["cacheStatus"], "Expired");
    assert_eq!(before["nextChennaiUpdate"], "9h 30m");
    assert_eq!(before["message"], "Gold Tracker API - Chennai Edition");

    get(&app, "/api/gold-price").await;
    let (_, after) = get(&app, "/").await;
    assert_eq!(after["cacheStatus"], "Valid");
}

#[tokio::test]
async fn test_gst_with_string_inputs() {
    let app = build_router(app_state(FakeSource::new(dec!(2650)), ManualClock::at(ist(8, 0))));

    let (status, body) = post(
        &app,
        "/api/calculate-gst",
        json!({ "goldPrice": "7417", "grams": "8" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "basePrice": 59336, "gst": 1780, "makingCharges": 1187, "totalPrice": 62303 })
    );
}

#[tokio::test]
async fn test_gst_missing_fields() {
    let app = build_router(app_state(FakeSource::new(dec!(2650)), ManualClock::at(ist(8, 0))));

    let (status, body) = post(&app, "/api/calculate-gst", json!({ "grams": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
}

#[tokio::test]
async fn test_investment_flow() {
    let source = FakeSource::new(dec!(2650));
    let app = build_router(app_state(source.clone(), ManualClock::at(ist(8, 0))));

    let (status, plan) = post(
        &app,
        "/api/calculate-investment",
        json!({ "budget": "50000", "purity": "18k" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["purity"], "18K");
    assert_eq!(plan["pricePerGram"], 6152);
    assert_eq!(plan["grams"].as_f64().unwrap(), 8.13);

    // Served from the cache the first call filled.
    let (_, plan) = post(&app, "/api/calculate-investment", json!({ "budget": 10000 })).await;
    assert_eq!(plan["purity"], "22K");
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_investment_before_prices_load() {
    let source = FakeSource::new(dec!(2650));
    source.fail_with(500);
    let app = build_router(app_state(source, ManualClock::at(ist(8, 0))));

    let (status, body) = post(&app, "/api/calculate-investment", json!({ "budget": 10000 })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Wait for prices to load");
}

#[tokio::test]
async fn test_investment_bad_budget() {
    let app = build_router(app_state(FakeSource::new(dec!(2650)), ManualClock::at(ist(8, 0))));

    let (status, body) = post(&app, "/api/calculate-investment", json!({ "budget": -5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Enter valid budget");
}
