//! Analyze command: score a text and list its flagged phrases.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use essayguard_core::{
    AnalysisReport, AnalyzeOptions, Analyzer, Config, RiskBand, Severity, StructuralIssueKind,
};
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use super::{read_input_file, request_options};

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// File to analyze (`-` reads stdin).
    pub file: Utf8PathBuf,

    /// Phrases or rule ids to leave out of the flag list (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Show at most this many flags.
    #[arg(long)]
    pub max_flags: Option<usize>,

    /// Blend in a language-model score (requires an API key).
    #[arg(long)]
    pub model: bool,
}

/// Analyze a file and print its risk score and flags.
#[instrument(name = "cmd_analyze", skip_all, fields(file = %args.file))]
pub fn cmd_analyze(
    args: AnalyzeArgs,
    global_json: bool,
    analyzer: &Analyzer,
    config: &Config,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, exclude = ?args.exclude, model = args.model, "executing analyze command");

    let content = read_input_file(&args.file, max_input)?;
    let options = request_options(&args.exclude);

    let mut report = if args.model || config.model.enabled {
        analyze_with_model(analyzer, &content, &options, config)
    } else {
        analyzer.analyze(&content, &options).map_err(Into::into)
    }
    .with_context(|| format!("failed to analyze {}", args.file))?;

    if let Some(max) = args.max_flags.or(config.max_visible_flags) {
        report.truncate_flags(max);
    }

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&args.file, &report);
    Ok(())
}

#[cfg(feature = "model")]
fn analyze_with_model(
    analyzer: &Analyzer,
    text: &str,
    options: &AnalyzeOptions,
    config: &Config,
) -> anyhow::Result<AnalysisReport> {
    use essayguard_core::HttpModelOracle;

    match HttpModelOracle::from_config(&config.model) {
        Ok(oracle) => {
            let rt = tokio::runtime::Runtime::new()
                .context("failed to create async runtime for model call")?;
            let report =
                rt.block_on(analyzer.analyze_with_model(text, options, &oracle, &config.model))?;
            Ok(report)
        }
        Err(e) => {
            tracing::warn!(error = %e, "model unavailable, using pattern score");
            let mut report = analyzer.analyze(text, options)?;
            report.model_note = Some(e.to_string());
            Ok(report)
        }
    }
}

#[cfg(not(feature = "model"))]
fn analyze_with_model(
    analyzer: &Analyzer,
    text: &str,
    options: &AnalyzeOptions,
    _config: &Config,
) -> anyhow::Result<AnalysisReport> {
    tracing::warn!("built without the `model` feature, using pattern score");
    let mut report = analyzer.analyze(text, options)?;
    report.model_note = Some("model support not compiled in".to_string());
    Ok(report)
}

fn print_report(source: &Utf8Path, report: &AnalysisReport) {
    println!("{}", source.bold());
    println!(
        "\n  {} {}/100 ({})",
        "Risk:".cyan(),
        colored_score(report.score, report.band),
        report.band,
    );
    println!("  {}", report.reasoning.dimmed());

    if report.flags.is_empty() {
        println!("\n  {} none", "Flags:".cyan());
    } else {
        println!("\n  {}", "Flags:".cyan());
        for flag in &report.flags {
            let tag = format!("[{}]", flag.severity);
            let tag = match flag.severity {
                Severity::Critical => tag.red().bold().to_string(),
                Severity::High => tag.red().to_string(),
                Severity::Medium => tag.yellow().to_string(),
                Severity::Low => tag.dimmed().to_string(),
            };
            println!(
                "    {tag} \"{}\" x{} -> \"{}\" ({})",
                flag.phrase, flag.occurrences, flag.suggested_fix, flag.context,
            );
            println!("      {}", flag.rationale.dimmed());
        }
    }
    if report.hidden_flags > 0 {
        println!("    ... {} more not shown", report.hidden_flags);
    }

    let structure = &report.structure;
    if !structure.issues.is_empty() {
        let sentences: Vec<String> = structure
            .sentences_with_issues
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "\n  {} {} issues in sentences {}",
            "Structure:".cyan(),
            structure.issues.len(),
            sentences.join(", "),
        );
        for issue in &structure.issues {
            let label = match issue.kind {
                StructuralIssueKind::PassiveVoice => "passive voice",
                StructuralIssueKind::UniformLength => "uniform length",
            };
            println!(
                "    sentence {}: {label} {:.1} ({}) {}",
                issue.sentence_num,
                issue.measure,
                issue.severity,
                issue.suggestion.dimmed(),
            );
        }
    }

    if let Some(ref note) = report.model_note {
        println!("\n  {} {}", "Model:".yellow(), note);
    }
}

fn colored_score(score: u8, band: RiskBand) -> String {
    let s = score.to_string();
    match band {
        RiskBand::Minimal | RiskBand::Low => s.green().to_string(),
        RiskBand::Moderate => s.yellow().to_string(),
        RiskBand::High | RiskBand::Critical => s.red().to_string(),
    }
}
