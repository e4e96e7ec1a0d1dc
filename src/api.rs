//! HTTP API for the Ledger Engine.
//!
//! This module exposes a minimal REST API around the calculation
//! engine using the [`axum`](https://crates.io/crates/axum)
//! framework.  Clients submit record snapshots together with the
//! requested period and receive the computed payroll run or
//! profit-and-loss statement as JSON.  The handlers hold no state:
//! every request carries its own snapshot, so the server is as
//! referentially transparent as the engine underneath it.

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use tracing::info;

use crate::error::EngineError;
use crate::models::{PayRunInput, PlRequest};
use crate::payroll::run_payroll;
use crate::pnl::compute_profit_and_loss;

/// Builds the API router.
pub fn build_router() -> Router {
    Router::new()
        .route("/api/payroll", post(payroll_handler))
        .route("/api/profit-loss", post(profit_loss_handler))
}

fn error_response(err: EngineError) -> axum::response::Response {
    let status = match err {
        // The only failure the engine propagates; everything else is
        // absorbed into the computation.
        EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
    };
    let body = Json(serde_json::json!({ "error": err.to_string() }));
    (status, body).into_response()
}

/// Handler for POST /api/payroll
async fn payroll_handler(Json(input): Json<PayRunInput>) -> impl IntoResponse {
    match run_payroll(input) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Handler for POST /api/profit-loss
async fn profit_loss_handler(Json(request): Json<PlRequest>) -> impl IntoResponse {
    match compute_profit_and_loss(&request) {
        Ok(statement) => (StatusCode::OK, Json(statement)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Launch the API server.  Binds to the supplied address and blocks
/// until the server terminates (e.g. when interrupted).
pub async fn serve(addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "ledger engine listening");
    axum::serve(listener, build_router()).await?;
    Ok(())
}
