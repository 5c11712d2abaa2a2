use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub api_version: &'static str,
    pub server_name: String,
    pub version: &'static str,
}

// ── GET /pulp/api/v2/status/ ─────────────────────────────────────────────────

pub async fn get_status<R>(State(state): State<AppState<R>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        api_version: "2",
        server_name: state.server_name,
        version: env!("CARGO_PKG_VERSION"),
    })
}
