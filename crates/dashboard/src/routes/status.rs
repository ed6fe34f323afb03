//! Liveness, readiness and connection status.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::config::ConnectionTarget;
use crate::db::ConnectionStatus;
use crate::state::AppState;

/// Liveness check.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness check: ready only while the store holds a live connection.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.store().status().is_connected() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}

/// JSON body of `/api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: &'static str,
    pub label: String,
    pub server_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ConnectionTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<ConnectionStatus> for StatusResponse {
    fn from(status: ConnectionStatus) -> Self {
        let state = status.state();
        let label = status.label();
        let server_version = status.server_version().to_string();
        let (target, reason) = match status {
            ConnectionStatus::Connected { target, .. } => (Some(target), None),
            ConnectionStatus::Offline { reason } => (None, Some(reason)),
            ConnectionStatus::Closed => (None, None),
        };
        Self {
            state,
            label,
            server_version,
            target,
            reason,
        }
    }
}

/// Connection status as JSON.
pub async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.store().status().into())
}
