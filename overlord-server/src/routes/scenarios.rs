//! Scenario listing endpoint

use crate::state::ServerState;
use axum::{extract::State, Json};
use overlord_core::ScenarioSummary;
use std::sync::Arc;

/// Get list of available scenarios
pub async fn get_scenarios(State(state): State<Arc<ServerState>>) -> Json<Vec<ScenarioSummary>> {
    Json(state.registry.scenarios().summaries())
}
