//! Axum HTTP server: read-only endpoints over a solved strategy table.
//!
//! The solution is shared as `Arc<Solution>` across async handlers.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/state_value` | Value, strategy and Q-values of one configuration |
//!
//! `/state_value` reads `player1` as the caller's hand. With `seat=waiting` the
//! opponent holds the die: the position is looked up from the opponent's side,
//! `value`/`prob` are returned from the caller's side, while `strategy`,
//! `action` and the Q-values belong to the die holder. `state` is the
//! configuration actually looked up.
//! | GET | `/strategy` | All table rows, optionally filtered by `forced` |

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};

use crate::api_computations::{evaluate_for_seat, Seat};
use crate::error::Error;
use crate::strategy_table::StrategyTable;
use crate::types::Configuration;
use crate::value_iteration::Solution;

pub type AppState = Arc<Solution>;

pub fn create_router(solution: Arc<Solution>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/state_value", get(handle_get_state_value))
        .route("/strategy", get(handle_get_strategy))
        .layer(cors)
        .with_state(solution)
}

// ── Request types ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct StateValueQuery {
    lid: u32,
    player1: u32,
    player2: u32,
    #[serde(default)]
    forced: bool,
    #[serde(default)]
    seat: Seat,
}

#[derive(Deserialize)]
struct StrategyQuery {
    forced: Option<bool>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": msg })))
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check(State(solution): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK", "total": solution.total() }))
}

async fn handle_get_state_value(
    State(solution): State<AppState>,
    Query(params): Query<StateValueQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let config = Configuration::new(params.lid, params.player1, params.player2, params.forced);
    let lookup = evaluate_for_seat(
        &solution,
        params.lid,
        params.player1,
        params.player2,
        params.seat,
        params.forced,
    );
    let evaluation = match lookup {
        Ok(Some(e)) => e,
        Ok(None) => {
            return Err(error_response(
                StatusCode::NOT_FOUND,
                &format!(
                    "{} has {} sticks but the table covers at most {}",
                    config,
                    config.total(),
                    solution.total()
                ),
            ))
        }
        Err(e @ Error::InvalidConfiguration { .. }) => {
            return Err(error_response(StatusCode::BAD_REQUEST, &e.to_string()))
        }
        Err(e) => return Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())),
    };

    Ok(Json(serde_json::json!({
        "lid": config.lid,
        "player1": config.player1,
        "player2": config.player2,
        "forced": config.forced,
        "seat": params.seat,
        "state": evaluation.configuration,
        "value": evaluation.value,
        "strategy": evaluation.action.is_continue(),
        "action": evaluation.action,
        "prob": evaluation.win_probability,
        "continue_value": evaluation.action_values.continue_value,
        "stop_value": evaluation.action_values.stop_value,
    })))
}

async fn handle_get_strategy(
    State(solution): State<AppState>,
    Query(params): Query<StrategyQuery>,
) -> Json<serde_json::Value> {
    let table = StrategyTable::from_solution(&solution);
    let rows: Vec<_> = match params.forced {
        Some(forced) => table.with_forced(forced).copied().collect(),
        None => table.rows,
    };
    Json(serde_json::json!({
        "total": solution.total(),
        "iterations": solution.iterations(),
        "rows": rows,
    }))
}
