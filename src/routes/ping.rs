//! Liveness endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

pub const PLUGIN_NAME: &str = "refbridge";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub status: &'static str,
    pub plugin: &'static str,
    pub version: &'static str,
    pub host_version: String,
}

pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        plugin: PLUGIN_NAME,
        version: env!("CARGO_PKG_VERSION"),
        host_version: state.config().bridge.host_version.clone(),
    })
}
