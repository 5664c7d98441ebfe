//! Scheduled sweep handlers.
//!
//! The scheduler calls these endpoints with any HTTP method. `OPTIONS` short-circuits
//! with a CORS preflight response. Otherwise the sweep runs and the handler answers
//! `{ "success": true, "message": ... }`, or `{ "error": ... }` with status 500 if the run
//! could not start or the candidate orders could not be fetched.

use super::AppState;
use crate::core::sweep::{self, SweepKind, format_sweep_summary};
use axum::extract::State;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

const CORS_ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Sweep route group.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/functions/cancel-stale-orders", any(cancel_stale_orders))
        .route(
            "/functions/cancel-post-harvest-orders",
            any(cancel_post_harvest_orders),
        )
}

/// Body of a successful sweep run.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    /// Always true
    pub success: bool,
    /// Summary of the run
    pub message: String,
}

/// Body of a failed sweep run.
#[derive(Debug, Serialize)]
pub struct SweepError {
    /// What went wrong
    pub error: String,
}

fn cors_headers() -> [(HeaderName, &'static str); 2] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS),
    ]
}

fn failure(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        cors_headers(),
        Json(SweepError { error: message }),
    )
        .into_response()
}

/// Any method on `/functions/cancel-stale-orders`.
pub async fn cancel_stale_orders(State(state): State<AppState>, method: Method) -> Response {
    run_sweep(&state, &method, SweepKind::StalePending).await
}

/// Any method on `/functions/cancel-post-harvest-orders`.
pub async fn cancel_post_harvest_orders(
    State(state): State<AppState>,
    method: Method,
) -> Response {
    run_sweep(&state, &method, SweepKind::PostHarvest).await
}

async fn run_sweep(state: &AppState, method: &Method, kind: SweepKind) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::OK, cors_headers(), "ok").into_response();
    }

    let Some(credentials) = state.credentials.as_ref() else {
        error!("Sweep {kind:?} refused: service credentials are not configured");
        return failure("Missing service credentials".to_string());
    };
    info!(service_url = %credentials.url, "Running {kind:?} sweep");

    let now = Utc::now();
    let result = match kind {
        SweepKind::StalePending => {
            sweep::cancel_stale_pending_orders(&state.db, &state.sweep_policy, now).await
        }
        SweepKind::PostHarvest => {
            sweep::cancel_post_harvest_orders(&state.db, &state.sweep_policy, now).await
        }
    };

    match result {
        Ok(report) => (
            StatusCode::OK,
            cors_headers(),
            Json(SweepResponse {
                success: true,
                message: format_sweep_summary(&report),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Sweep {kind:?} aborted: {e}");
            failure(e.to_string())
        }
    }
}
