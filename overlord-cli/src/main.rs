//! OVERLORD CLI - Command-line interface
//!
//! Commands:
//! - serve: Start the matchmaking and play server
//! - scenarios: List available scenarios

mod scenarios;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "overlord")]
#[command(about = "OVERLORD two-player hex wargame server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the matchmaking and play server
    Serve(server::ServerArgs),
    /// List available scenarios
    Scenarios(scenarios::ScenariosArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args),
        Commands::Scenarios(args) => scenarios::run(args),
    }
}
