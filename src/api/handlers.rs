//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::error;

use crate::state::AppState;
use super::responses::{HealthResponse, StatusResponse, TimeSync};

/// Handle GET /timer - Polling fallback for clients without a persistent
/// connection; returns the same time-sync payload the WebSocket pushes.
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimeSync>, StatusCode> {
    match state.snapshot() {
        Ok(snapshot) => Ok(Json(TimeSync::from_snapshot(snapshot))),
        Err(e) => {
            error!("Failed to read timer snapshot: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return current server diagnostics
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to read timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let connected_subscribers = match state.subscriber_count() {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to read subscriber count: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_command, last_command_time) = state.get_last_command();

    Ok(Json(StatusResponse {
        timer: TimeSync::from_snapshot(snapshot),
        connected_subscribers,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_command,
        last_command_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
