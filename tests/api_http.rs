//! HTTP-level tests for the two query endpoints, boundary validation, cache
//! diagnostics, and the admin/debug surface. The router is exercised
//! in-process via `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::Request,
    Router,
};
use http::StatusCode;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

// --- Global serialization of tests that mutate env (cache TTL, metrics) ---
static TEST_GUARD: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

async fn build_app() -> Router {
    recipe_demand_analyzer::app()
        .await
        .expect("app() should build a Router")
}

fn demand_body(titles: &[&str], topics: &[&str]) -> Value {
    let items: Vec<Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            json!({
                "id": format!("v{i}"),
                "viewCount": 40_000 + i * 1_000,
                "publishedAt": "2025-06-01T12:00:00Z",
                "title": title,
                "description": "weeknight dinner",
            })
        })
        .collect();
    json!({ "items": items, "topics": topics })
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value, Option<String>) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let cache_header = resp
        .headers()
        .get("x-demand-cache")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value, cache_header)
}

async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

#[tokio::test]
async fn health_is_ok() {
    let _lock = TEST_GUARD.lock();
    let app = build_app().await;
    let (status, body) = get_text(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn empty_and_oversized_topic_lists_are_rejected() {
    let _lock = TEST_GUARD.lock();
    let app = build_app().await;

    let (status, body, _) = post_json(&app, "/demand", &demand_body(&[], &[])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));

    let too_many = ["a", "b", "c", "d", "e", "f"];
    let (status, body, _) = post_json(&app, "/demand", &demand_body(&[], &too_many)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("maximum"));

    let (status, _, _) = post_json(&app, "/gaps", &json!({ "topics": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = post_json(&app, "/gaps", &json!({ "topics": too_many })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn demand_endpoint_returns_full_signal_and_cache_diagnostics() {
    let _lock = TEST_GUARD.lock();
    std::env::set_var("DEMAND_CACHE_TTL_MS", "30000");
    let app = build_app().await;

    let body = demand_body(
        &["miso pasta tonight", "miso pasta for two", "the miso pasta", "miso pasta again"],
        &["miso", "pasta"],
    );

    let (status, v, cache) = post_json(&app, "/demand", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("MISS"));
    assert_eq!(v["sampleSize"], json!(4));
    assert!(v["demandScore"].as_u64().unwrap() <= 100);
    assert!(v["demandBand"].is_string());
    assert!(v["contentGap"]["reasoning"].is_string());
    assert!(v["confidence"].as_f64().unwrap() <= 1.0);

    // Identical topic set: second call must be served from the cache.
    let (status, _, cache) = post_json(&app, "/demand", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("HIT"));
}

#[tokio::test]
async fn demand_cache_expires_after_ttl() {
    let _lock = TEST_GUARD.lock();
    // Short TTL to prove expiration deterministically.
    std::env::set_var("DEMAND_CACHE_TTL_MS", "50");
    let app = build_app().await;
    std::env::set_var("DEMAND_CACHE_TTL_MS", "30000");

    let body = demand_body(&["miso pasta", "miso pasta ii", "miso pasta iii"], &["miso", "pasta"]);

    let (_, _, cache) = post_json(&app, "/demand", &body).await;
    assert_eq!(cache.as_deref(), Some("MISS"));
    let (_, _, cache) = post_json(&app, "/demand", &body).await;
    assert_eq!(cache.as_deref(), Some("HIT"));

    // Wait well over TTL (5x headroom for slow CI timers).
    tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    let (_, _, cache) = post_json(&app, "/demand", &body).await;
    assert_eq!(cache.as_deref(), Some("MISS"));
}

#[tokio::test]
async fn gaps_endpoint_reports_empty_catalog_honestly() {
    let _lock = TEST_GUARD.lock();
    let app = build_app().await;
    let (status, v, _) = post_json(&app, "/gaps", &json!({ "topics": ["miso"] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["gaps"], json!([]));
    assert_eq!(v["totalVideos"], json!(0));
    assert_eq!(v["source"], json!("recipe_analysis"));
    assert_eq!(v["baseTopics"], json!(["miso"]));
}

#[tokio::test]
async fn debug_and_admin_surface() {
    let _lock = TEST_GUARD.lock();
    std::env::set_var("DEMAND_CACHE_TTL_MS", "30000");
    let app = build_app().await;

    // Nothing computed yet.
    let (status, body) = get_text(&app, "/debug/last-signal").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "null");

    let body_json = demand_body(&["miso pasta", "miso pasta b", "miso pasta c"], &["miso", "pasta"]);
    let _ = post_json(&app, "/demand", &body_json).await;

    let (status, body) = get_text(&app, "/debug/last-signal").await;
    assert_eq!(status, StatusCode::OK);
    let v: Value = serde_json::from_str(&body).unwrap();
    assert!(v["band"].is_string());
    assert_eq!(v["sample_size"], json!(3));

    let (status, body) = get_text(&app, "/debug/config").await;
    assert_eq!(status, StatusCode::OK);
    let cfg: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(cfg["demand"]["band_hot"], json!(75));

    // Invalidate a single key, then everything.
    let (status, v, _) = post_json(
        &app,
        "/admin/invalidate-cache?key=miso%2Bpasta",
        &Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, Value::Null); // plain-text response, not JSON

    let (_, _, cache) = post_json(&app, "/demand", &body_json).await;
    assert_eq!(cache.as_deref(), Some("MISS"), "invalidation must force recompute");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let _lock = TEST_GUARD.lock();
    std::env::set_var("DEMAND_METRICS", "1");
    std::env::set_var("DEMAND_CACHE_TTL_MS", "30000");
    let app = build_app().await;
    std::env::remove_var("DEMAND_METRICS");

    let (status, body) = get_text(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    for needle in [
        "demand_cache_ttl_ms",
        "demand_requests_total",
        "gap_requests_total",
        "demand_cache_hits_total",
        "demand_cache_misses_total",
        "trends_fallback_total",
    ] {
        assert!(body.contains(needle), "metrics exposition missing '{needle}'");
    }
}
