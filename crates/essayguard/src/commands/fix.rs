//! Fix command: rewrite flagged phrases and re-score.

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use essayguard_core::{Analyzer, Config, FixOutcome};
use owo_colors::OwoColorize;
use tracing::{debug, info, instrument};

use super::{read_input_file, request_options};

/// Arguments for the `fix` subcommand.
#[derive(Args, Debug)]
pub struct FixArgs {
    /// File to fix (`-` reads stdin).
    pub file: Utf8PathBuf,

    /// Phrases or rule ids to leave untouched (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Write the fixed text here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Ask the language model for a full rewrite, falling back to local fixes.
    #[arg(long)]
    pub model: bool,
}

/// Apply every flag's suggested fix and report the new score.
///
/// The fixed text goes to `--output` or stdout; the summary goes to stderr
/// so the text can be piped.
#[instrument(name = "cmd_fix", skip_all, fields(file = %args.file))]
pub fn cmd_fix(
    args: FixArgs,
    global_json: bool,
    analyzer: &Analyzer,
    config: &Config,
    max_input: Option<usize>,
) -> anyhow::Result<()> {
    debug!(file = %args.file, exclude = ?args.exclude, model = args.model, "executing fix command");

    let content = read_input_file(&args.file, max_input)?;
    let options = request_options(&args.exclude);

    if args.model {
        return model_rewrite(&args, global_json, analyzer, config, &content);
    }

    let outcome = analyzer
        .fix_and_rescan(&content, &options)
        .with_context(|| format!("failed to fix {}", args.file))?;

    if let Some(ref out) = args.output {
        std::fs::write(out.as_std_path(), &outcome.fix.text)
            .with_context(|| format!("failed to write {out}"))?;
        info!(output = %out, "fixed text written");
    }

    if global_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    print_summary(&outcome);
    if args.output.is_none() {
        print!("{}", outcome.fix.text);
        if !outcome.fix.text.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn print_summary(outcome: &FixOutcome) {
    eprintln!(
        "{} {} -> {} ({} replacements)",
        "Score:".cyan(),
        outcome.original_score,
        outcome.analysis.score.green(),
        outcome.fix.changed(),
    );
    for applied in &outcome.fix.applied {
        if applied.replaced == 0 {
            eprintln!(
                "  {} \"{}\" {}",
                "skipped".dimmed(),
                applied.phrase,
                "(not found)".dimmed()
            );
        } else {
            eprintln!(
                "  \"{}\" -> \"{}\" x{}",
                applied.phrase, applied.replacement, applied.replaced
            );
        }
    }
}

#[cfg(feature = "model")]
fn model_rewrite(
    args: &FixArgs,
    global_json: bool,
    analyzer: &Analyzer,
    config: &Config,
    content: &str,
) -> anyhow::Result<()> {
    use essayguard_core::{HttpModelOracle, Rewrite, RewriteSource};

    let options = request_options(&args.exclude);
    let rewrite = match HttpModelOracle::from_config(&config.model) {
        Ok(oracle) => {
            let rt = tokio::runtime::Runtime::new()
                .context("failed to create async runtime for model call")?;
            rt.block_on(analyzer.rewrite_with_model(content, &options, &oracle, &config.model))?
        }
        Err(e) => {
            tracing::warn!(error = %e, "model unavailable, applying local fixes");
            let outcome = analyzer.fix_and_rescan(content, &options)?;
            Rewrite {
                text: outcome.fix.text,
                source: RewriteSource::Local,
                note: Some(e.to_string()),
            }
        }
    };

    if let Some(ref out) = args.output {
        std::fs::write(out.as_std_path(), &rewrite.text)
            .with_context(|| format!("failed to write {out}"))?;
    }

    if global_json {
        println!("{}", serde_json::to_string_pretty(&rewrite)?);
        return Ok(());
    }

    if let Some(ref note) = rewrite.note {
        eprintln!("{} {}", "Model:".yellow(), note);
    }
    if args.output.is_none() {
        println!("{}", rewrite.text.trim_end());
    }
    Ok(())
}

#[cfg(not(feature = "model"))]
fn model_rewrite(
    _args: &FixArgs,
    _global_json: bool,
    _analyzer: &Analyzer,
    _config: &Config,
    _content: &str,
) -> anyhow::Result<()> {
    anyhow::bail!("--model requires essayguard built with the `model` feature")
}
