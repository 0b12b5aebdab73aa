//! Integration tests for the HTTP API endpoints.
//!
//! Uses axum's oneshot pattern (via tower::ServiceExt), no TCP binding needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use super6::server::create_router;
use super6::{solve, Solution};

// Shared solution, computed once per test binary.
static SOLUTION: std::sync::OnceLock<Arc<Solution>> = std::sync::OnceLock::new();

fn app() -> axum::Router {
    let solution = SOLUTION
        .get_or_init(|| Arc::new(solve(6).unwrap()))
        .clone();
    create_router(solution)
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// ── GET /health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_200() {
    let (status, json) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["total"], 6);
}

// ── GET /state_value ─────────────────────────────────────────────────

#[tokio::test]
async fn state_value_known_configuration() {
    let (status, json) = get("/state_value?lid=1&player1=1&player2=1&forced=false").await;
    assert_eq!(status, StatusCode::OK);
    let value = json["value"].as_f64().unwrap();
    assert!((value - 2.0 / 3.0).abs() < 1e-9, "value={value}");
    assert_eq!(json["strategy"], false);
    assert_eq!(json["action"], "stop");
    let prob = json["prob"].as_f64().unwrap();
    assert!((prob - 5.0 / 6.0).abs() < 1e-9);
    let stop = json["stop_value"].as_f64().unwrap();
    assert!((stop - value).abs() < 1e-9);
}

#[tokio::test]
async fn state_value_forced_defaults_to_false() {
    let (status, json) = get("/state_value?lid=0&player1=2&player2=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["forced"], false);
    let value = json["value"].as_f64().unwrap();
    assert!((-1.0..=1.0).contains(&value));
}

#[tokio::test]
async fn state_value_terminal_is_bad_request() {
    let (status, json) = get("/state_value?lid=0&player1=0&player2=3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("terminal"));
}

#[tokio::test]
async fn state_value_overfull_lid_is_bad_request() {
    let (status, _) = get("/state_value?lid=6&player1=1&player2=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn state_value_beyond_total_is_not_found() {
    let (status, _) = get("/state_value?lid=0&player1=4&player2=4").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn state_value_huge_counts_are_bad_request() {
    let (status, json) = get("/state_value?lid=5&player1=4294967295&player2=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("exceeds"));

    let (status, _) = get("/state_value?lid=0&player1=1&player2=4294967295&seat=waiting").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn state_value_waiting_seat_negates_die_holder() {
    // Caller holds 1, opponent holds 2 and must roll: looked up as 0/2/1 forced.
    let (status, json) =
        get("/state_value?lid=0&player1=1&player2=2&forced=true&seat=waiting").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["seat"], "waiting");
    assert_eq!(json["player1"], 1);
    assert_eq!(json["state"]["player1"], 2);
    assert_eq!(json["state"]["player2"], 1);
    assert_eq!(json["state"]["forced"], true);
    let value = json["value"].as_f64().unwrap();
    assert!((value + 13.0 / 18.0).abs() < 1e-9, "value={value}");
    assert_eq!(json["action"], "continue");

    let (_, acting) = get("/state_value?lid=0&player1=2&player2=1&forced=true").await;
    assert_eq!(acting["seat"], "acting");
    assert!((acting["value"].as_f64().unwrap() + value).abs() < 1e-15);
}

#[tokio::test]
async fn state_value_unknown_seat_is_bad_request() {
    let (status, _) = get("/state_value?lid=0&player1=1&player2=1&seat=standing").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn state_value_missing_param_is_bad_request() {
    let (status, _) = get("/state_value?lid=0&player1=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── GET /strategy ────────────────────────────────────────────────────

#[tokio::test]
async fn strategy_returns_all_rows() {
    let (status, json) = get("/strategy").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), solve(6).unwrap().states().len());
    let first = &rows[0];
    for column in ["lid", "player1", "player2", "forced", "value", "strategy", "prob"] {
        assert!(first.get(column).is_some(), "missing column {column}");
    }
}

#[tokio::test]
async fn strategy_filters_forced() {
    let (status, json) = get("/strategy?forced=true").await;
    assert_eq!(status, StatusCode::OK);
    let rows = json["rows"].as_array().unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r["forced"] == true && r["strategy"] == true));
}
