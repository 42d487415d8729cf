//! Run a seeded practice server with the basic rules
//!
//! Run with: cargo run -p overlord-server --example run_server -- [SCENARIO_DIR]
//!
//! Basic rules ignore terrain costs and line of sight, which makes hand-played
//! matches easier to follow. Any `*.json` scenarios in SCENARIO_DIR are offered
//! alongside the built-ins.

use std::path::PathBuf;

use overlord_core::RulesVariant;
use overlord_server::{run_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = ServerConfig {
        scenario_dir: std::env::args().nth(1).map(PathBuf::from),
        seed: Some(44),
        rules: RulesVariant::Basic,
        ..ServerConfig::default()
    };

    match &config.scenario_dir {
        Some(dir) => println!("Extra scenarios from {}", dir.display()),
        None => println!("Built-in scenarios only"),
    }
    println!("Basic rules, seed 44: ws://localhost:{}/ws", config.port);

    run_server(config).await
}
