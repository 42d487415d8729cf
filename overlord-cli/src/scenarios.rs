//! Scenarios command - list the scenario catalog
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_catalog(), report()
//! - Level 3: format_table()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use overlord_core::{ScenarioCatalog, ScenarioSummary};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct ScenariosArgs {
    /// Directory of extra scenario JSON files
    #[arg(long, env = "OVERLORD_SCENARIOS", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: ScenariosArgs) -> Result<()> {
    let catalog = load_catalog(&args)?;
    report(&catalog.summaries(), args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn load_catalog(args: &ScenariosArgs) -> Result<ScenarioCatalog> {
    let mut catalog = ScenarioCatalog::default();
    if let Some(dir) = &args.dir {
        let loaded = catalog
            .load_dir(dir)
            .with_context(|| format!("Failed to load scenarios from {}", dir.display()))?;
        tracing::info!("Loaded {} scenario file(s) from {}", loaded, dir.display());
    }
    Ok(catalog)
}

fn report(summaries: &[ScenarioSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
    } else {
        print!("{}", format_table(summaries));
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - FORMATTING
// ============================================================================

fn format_table(summaries: &[ScenarioSummary]) -> String {
    let id_width = summaries.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);
    let mut out = format!("{:<width$}  {:>3}  {}\n", "ID", "VP", "NAME", width = id_width);
    for s in summaries {
        out.push_str(&format!(
            "{:<width$}  {:>3}  {} - {}\n",
            s.id,
            s.victory_points,
            s.name,
            s.description,
            width = id_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_builtins() {
        let table = format_table(&ScenarioCatalog::default().summaries());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].starts_with("pegasus-bridge"));
        assert!(lines[1].contains("  6  Pegasus Bridge"));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let args = ScenariosArgs {
            dir: Some(PathBuf::from("/nonexistent/scenarios")),
            json: false,
        };
        assert!(load_catalog(&args).is_err());
    }
}
