//! OVERLORD Server - Matchmaking and live play over WebSocket
//!
//! This crate provides the network backend:
//! - Matchmaking queue and per-match authoritative sessions
//! - JSON wire protocol for intents and events
//! - REST endpoints for health, stats and the scenario list
//! - Optional static file serving for a browser client

mod routes;
mod state;

pub mod protocol;
pub mod registry;

use axum::{routing::get, Router};
use overlord_core::{RulesVariant, ScenarioCatalog};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub use protocol::{ClientIntent, MatchId, ServerEvent};
pub use registry::{Delivery, MatchRegistry, ParticipantId, RegistryConfig};
pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory served for any non-API path
    pub static_dir: Option<PathBuf>,
    /// Extra `*.json` scenarios loaded on top of the built-ins
    pub scenario_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub rules: RulesVariant,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            static_dir: None,
            scenario_dir: None,
            seed: None,
            rules: RulesVariant::Standard,
        }
    }
}

/// Build shared state: scenario catalog plus an empty registry
pub fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<ServerState>> {
    let mut catalog = ScenarioCatalog::default();
    if let Some(dir) = &config.scenario_dir {
        let loaded = catalog.load_dir(dir)?;
        tracing::info!("Loaded {} scenario file(s) from {}", loaded, dir.display());
    }

    let registry = MatchRegistry::new(
        catalog,
        RegistryConfig {
            rules: config.rules,
            seed: config.seed,
        },
    );
    Ok(Arc::new(ServerState::new(registry)))
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let router = Router::new()
        // Status endpoints
        .route("/api/health", get(routes::status::health_handler))
        .route("/api/stats", get(routes::status::stats_handler))
        // Scenarios
        .route("/api/scenarios", get(routes::scenarios::get_scenarios))
        // Live play
        .route("/ws", get(routes::ws::ws_handler))
        // Shared state
        .with_state(state)
        .layer(CorsLayer::permissive());

    // Static file serving (must be last)
    match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = build_state(&config)?;
    let router = create_router(&config, state);

    tracing::info!("OVERLORD Server starting on http://0.0.0.0:{}", config.port);
    if let Some(dir) = &config.static_dir {
        tracing::info!("Static files served from: {}", dir.display());
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}
