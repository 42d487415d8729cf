//! Health and stats endpoints

use crate::state::ServerState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_games: usize,
    pub waiting_players: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub active_games: usize,
    pub waiting_players: usize,
    pub total_connections: usize,
}

pub async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        active_games: state.registry.active_sessions(),
        waiting_players: state.registry.queue_len(),
    })
}

pub async fn stats_handler(State(state): State<Arc<ServerState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        active_games: state.registry.active_sessions(),
        waiting_players: state.registry.queue_len(),
        total_connections: state.connection_count(),
    })
}
