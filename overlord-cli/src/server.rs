//! Server command - start the matchmaking and play server
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to overlord-server crate)
//! - Level 4: configuration validation

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};

use overlord_core::RulesVariant;
use overlord_server::{run_server, ServerConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Movement and sight rules
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RulesArg {
    Standard,
    Basic,
}

impl From<RulesArg> for RulesVariant {
    fn from(arg: RulesArg) -> Self {
        match arg {
            RulesArg::Standard => RulesVariant::Standard,
            RulesArg::Basic => RulesVariant::Basic,
        }
    }
}

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, env = "PORT", default_value = "3001")]
    pub port: u16,

    /// Directory of static files for a browser client
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Directory of extra scenario JSON files
    #[arg(long, env = "OVERLORD_SCENARIOS")]
    pub scenario_dir: Option<PathBuf>,

    /// Seed for dice, cards and random terrain
    #[arg(long, env = "OVERLORD_SEED")]
    pub seed: Option<u64>,

    /// Rules variant
    #[arg(long, value_enum, default_value = "standard")]
    pub rules: RulesArg,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
///
/// This function reads like a table of contents:
/// 1. Configure server
/// 2. Start server (blocking)
pub fn run(args: ServerArgs) -> Result<()> {
    let config = configure_server(&args)?;

    tracing::info!(
        port = config.port,
        seeded = config.seed.is_some(),
        rules = ?config.rules,
        "Starting OVERLORD server"
    );

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> Result<ServerConfig> {
    if let Some(dir) = &args.static_dir {
        validate_static_dir(dir)?;
    }
    if let Some(dir) = &args.scenario_dir {
        validate_scenario_dir(dir)?;
    }

    Ok(ServerConfig {
        port: args.port,
        static_dir: args.static_dir.clone(),
        scenario_dir: args.scenario_dir.clone(),
        seed: args.seed,
        rules: args.rules.into(),
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    // Create tokio runtime for async server
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Validate that static directory exists
fn validate_static_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        tracing::warn!(
            "Static directory does not exist: {}. Server will start but may not serve files.",
            path.display()
        );
    } else if !path.is_dir() {
        anyhow::bail!(
            "Static path exists but is not a directory: {}",
            path.display()
        );
    }

    Ok(())
}

/// Scenario directory must exist; a bad file fails startup later
fn validate_scenario_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Scenario directory not found: {}", path.display());
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
