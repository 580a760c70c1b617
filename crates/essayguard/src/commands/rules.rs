//! Rules command: list the detection catalog.

use clap::Args;
use essayguard_core::{Analyzer, Severity};
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

/// Arguments for the `rules` subcommand.
#[derive(Args, Debug, Default)]
pub struct RulesArgs {
    /// Only list rules at or above this severity.
    #[arg(long, value_enum)]
    pub min_severity: Option<Severity>,
}

/// Print every rule in the catalog.
#[instrument(name = "cmd_rules", skip_all)]
pub fn cmd_rules(args: RulesArgs, global_json: bool, analyzer: &Analyzer) -> anyhow::Result<()> {
    let mut rules = analyzer.list_rules();
    if let Some(min) = args.min_severity {
        rules.retain(|r| r.severity >= min);
    }
    debug!(count = rules.len(), "listing rules");

    if global_json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    for rule in &rules {
        println!(
            "{:<28} {:>8} {:>3}  -> {}",
            rule.id.bold(),
            rule.severity.to_string(),
            rule.weight,
            rule.default_fix.green(),
        );
        println!("  {}", rule.rationale.dimmed());
    }
    println!("\n{} rules", rules.len());
    Ok(())
}
