//! Serve command: MCP server on stdio.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use essayguard_core::{Analyzer, Config};
use rmcp::ServiceExt;
use tracing::{info, instrument};

use crate::server::ProjectServer;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Default flag limit for `analyze_text` (overrides config).
    #[arg(long)]
    pub max_flags: Option<usize>,
}

/// Serve MCP requests on stdin/stdout until the client disconnects.
///
/// Logging must stay off stdout, which carries the protocol.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(
    args: ServeArgs,
    analyzer: Analyzer,
    max_input: Option<usize>,
    config: Config,
) -> anyhow::Result<()> {
    let rules = analyzer.catalog().len();
    let server = ProjectServer::new(Arc::new(analyzer))
        .with_max_input(max_input)
        .with_max_visible_flags(args.max_flags.or(config.max_visible_flags));

    info!(rules, "starting MCP server on stdio");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await.context("MCP server terminated")?;
    info!("MCP server stopped");
    Ok(())
}
