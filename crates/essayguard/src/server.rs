//! MCP (Model Context Protocol) server implementation.
//!
//! This module exposes the analyzer over the MCP protocol, making it
//! available to AI assistants via stdio transport.
//!
//! # Architecture
//!
//! The MCP server is a presentation layer: it wraps the same [`Analyzer`]
//! the CLI commands use, shared across calls so the result cache is too.
//! Input errors surface as `invalid_params`; anything else is an
//! `internal_error`.

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use essayguard_core::fixer::{self, Fix};
use essayguard_core::{AnalysisError, AnalyzeOptions, Analyzer};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `analyze_text` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AnalyzeTextParams {
    /// The essay text to analyze.
    pub text: String,
    /// Phrases or rule ids to leave out of the flag list.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Return at most this many flags.
    pub max_flags: Option<usize>,
}

/// Parameters for the `apply_fixes` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ApplyFixesParams {
    /// The text to rewrite.
    pub text: String,
    /// Phrase/replacement pairs, usually taken from `analyze_text` flags.
    pub fixes: Vec<Fix>,
}

/// Parameters for the `fix_text` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct FixTextParams {
    /// The essay text to fix.
    pub text: String,
    /// Phrases or rule ids to leave untouched.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// MCP server exposing the analyzer to AI assistants.
///
/// Each `#[tool]` method in the `#[tool_router]` impl block is automatically
/// registered and callable via the MCP protocol.
#[derive(Clone)]
pub struct ProjectServer {
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
    analyzer: Arc<Analyzer>,
    max_input: Option<usize>,
    max_visible_flags: Option<usize>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialization error: {e}"), None))
}

fn analysis_error(e: AnalysisError) -> McpError {
    match e.as_input() {
        Some(input) => McpError::invalid_params(input.to_string(), None),
        None => McpError::internal_error(e.to_string(), None),
    }
}

#[tool_router]
impl ProjectServer {
    /// Create a server around a shared analyzer.
    pub fn new(analyzer: Arc<Analyzer>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            analyzer,
            max_input: None,
            max_visible_flags: None,
        }
    }

    /// Reject request text larger than `max` bytes.
    #[must_use]
    pub const fn with_max_input(mut self, max: Option<usize>) -> Self {
        self.max_input = max;
        self
    }

    /// Default flag limit when a request does not set one.
    #[must_use]
    pub const fn with_max_visible_flags(mut self, max: Option<usize>) -> Self {
        self.max_visible_flags = max;
        self
    }

    fn check_size(&self, text: &str) -> Result<(), McpError> {
        match self.max_input {
            Some(max) if text.len() > max => Err(McpError::invalid_params(
                format!("input too large: {} bytes (limit: {max} bytes)", text.len()),
                None,
            )),
            _ => Ok(()),
        }
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "rules": self.analyzer.catalog().len(),
        });

        let text = if params.format == "json" {
            to_json(&info)?
        } else {
            format!(
                "{} v{}\n{}\n{} detection rules",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
                self.analyzer.catalog().len(),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// Score a text and list its flagged phrases.
    #[tool(
        description = "Score how machine-written an essay sounds (0-100) and list flagged phrases with suggested fixes, context-aware alternatives, and sentence-level issues."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", text_len = params.text.len()))]
    fn analyze_text(
        &self,
        Parameters(params): Parameters<AnalyzeTextParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "analyze_text", exclude = ?params.exclude, "executing MCP tool");
        self.check_size(&params.text)?;

        let options = AnalyzeOptions::new().excluding(params.exclude);
        let mut report = self
            .analyzer
            .analyze(&params.text, &options)
            .map_err(analysis_error)?;
        if let Some(max) = params.max_flags.or(self.max_visible_flags) {
            report.truncate_flags(max);
        }

        let json = to_json(&report)?;
        tracing::info!(
            tool = "analyze_text",
            score = report.score,
            flags = report.flags.len(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Substitute caller-chosen replacements.
    #[tool(
        description = "Replace each given phrase with its replacement (whole words, case-insensitive, original casing kept). Returns the new text and how many times each fix applied."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", fixes = params.fixes.len()))]
    fn apply_fixes(
        &self,
        Parameters(params): Parameters<ApplyFixesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "apply_fixes", "executing MCP tool");
        self.check_size(&params.text)?;

        let report = fixer::apply_fixes(&params.text, &params.fixes);

        let json = to_json(&report)?;
        tracing::info!(
            tool = "apply_fixes",
            changed = report.changed(),
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Fix every flagged phrase and re-score.
    #[tool(
        description = "Apply the suggested fix for every flagged phrase, then re-analyze the result. Returns the fixed text, the fixes applied, the original score, and the new analysis."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server", text_len = params.text.len()))]
    fn fix_text(
        &self,
        Parameters(params): Parameters<FixTextParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "fix_text", exclude = ?params.exclude, "executing MCP tool");
        self.check_size(&params.text)?;

        let options = AnalyzeOptions::new().excluding(params.exclude);
        let outcome = self
            .analyzer
            .fix_and_rescan(&params.text, &options)
            .map_err(analysis_error)?;

        let json = to_json(&outcome)?;
        tracing::info!(
            tool = "fix_text",
            before = outcome.original_score,
            after = outcome.analysis.score,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// List the detection catalog.
    #[tool(description = "List every detection rule: id, severity, weight, pattern, rationale, and default fix.")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn list_rules(&self) -> Result<CallToolResult, McpError> {
        let rules = self.analyzer.list_rules();
        let json = to_json(&rules)?;
        tracing::info!(tool = "list_rules", count = rules.len(), "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Call analyze_text to score an essay and see flagged phrases, \
                 fix_text to rewrite them, and list_rules to see what is detected.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    const ESSAY: &str = "We utilize modern tools to delve into the data. Furthermore, \
        the results are a testament to careful work, and I'd say the team did well here.";

    fn server() -> ProjectServer {
        ProjectServer::new(Arc::new(Analyzer::builtin().unwrap()))
    }

    #[test]
    fn server_info_has_correct_name() {
        let server = server();
        let info = ServerHandler::get_info(&server);

        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn server_has_tools_capability() {
        let server = server();
        let info = ServerHandler::get_info(&server);

        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn server_has_instructions() {
        let server = server();
        let info = ServerHandler::get_info(&server);

        let instructions = info.instructions.expect("server should have instructions");
        assert!(instructions.contains(env!("CARGO_PKG_NAME")));
        assert!(instructions.contains("analyze_text"));
    }

    /// Extract text from the first content item in a `CallToolResult`.
    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn extract_json(result: &CallToolResult) -> serde_json::Value {
        let text = extract_text(result).expect("should have text content");
        serde_json::from_str(text).expect("valid JSON")
    }

    #[test]
    fn get_info_tool_returns_text_by_default() {
        let server = server();
        let params = Parameters(GetInfoParams {
            format: "text".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");

        assert!(!result.is_error.unwrap_or(false));
        let text = extract_text(&result).expect("should have text content");
        assert!(text.contains(env!("CARGO_PKG_NAME")));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
        assert!(text.contains("detection rules"));
    }

    #[test]
    fn get_info_tool_returns_json_when_requested() {
        let server = server();
        let params = Parameters(GetInfoParams {
            format: "json".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");
        let json = extract_json(&result);

        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["rules"].as_u64().unwrap() > 0);
    }

    #[test]
    fn analyze_text_tool_flags_phrases() {
        let server = server();
        let params = Parameters(AnalyzeTextParams {
            text: ESSAY.to_string(),
            exclude: Vec::new(),
            max_flags: None,
        });

        let result = server
            .analyze_text(params)
            .expect("analyze_text should succeed");
        assert!(!result.is_error.unwrap_or(false));

        let json = extract_json(&result);
        let score = json["score"].as_u64().unwrap();
        assert!((5..=95).contains(&score));
        let phrases: Vec<&str> = json["flags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["phrase"].as_str().unwrap())
            .collect();
        assert!(phrases.contains(&"utilize"));
        assert!(phrases.contains(&"delve"));
    }

    #[test]
    fn analyze_text_tool_honours_exclude_and_limit() {
        let server = server();
        let params = Parameters(AnalyzeTextParams {
            text: ESSAY.to_string(),
            exclude: vec!["utilize".into()],
            max_flags: Some(1),
        });

        let result = server.analyze_text(params).unwrap();
        let json = extract_json(&result);
        let flags = json["flags"].as_array().unwrap();
        assert_eq!(flags.len(), 1);
        assert_ne!(flags[0]["phrase"], "utilize");
        assert!(json["hidden_flags"].as_u64().unwrap() >= 1);
    }

    #[test]
    fn analyze_text_tool_rejects_short_input() {
        let server = server();
        let params = Parameters(AnalyzeTextParams {
            text: "Too short.".to_string(),
            exclude: Vec::new(),
            max_flags: None,
        });

        let err = server.analyze_text(params).unwrap_err();
        assert!(err.message.contains("too short"));
    }

    #[test]
    fn analyze_text_tool_rejects_oversized_input() {
        let server = server().with_max_input(Some(16));
        let params = Parameters(AnalyzeTextParams {
            text: ESSAY.to_string(),
            exclude: Vec::new(),
            max_flags: None,
        });

        let err = server.analyze_text(params).unwrap_err();
        assert!(err.message.contains("input too large"));
    }

    #[test]
    fn apply_fixes_tool_rewrites() {
        let server = server();
        let params = Parameters(ApplyFixesParams {
            text: "Utilize it. We utilize them.".to_string(),
            fixes: vec![Fix::new("utilize", "use")],
        });

        let result = server.apply_fixes(params).unwrap();
        let json = extract_json(&result);
        assert_eq!(json["text"], "Use it. We use them.");
        assert_eq!(json["applied"][0]["replaced"], 2);
    }

    #[test]
    fn fix_text_tool_lowers_or_keeps_score() {
        let server = server();
        let params = Parameters(FixTextParams {
            text: ESSAY.to_string(),
            exclude: Vec::new(),
        });

        let result = server.fix_text(params).expect("fix_text should succeed");
        let json = extract_json(&result);
        let fixed = json["fix"]["text"].as_str().unwrap();
        assert!(!fixed.contains("utilize"));
        let before = json["original_score"].as_u64().unwrap();
        let after = json["analysis"]["score"].as_u64().unwrap();
        assert!(after <= before);
    }

    #[test]
    fn list_rules_tool_lists_catalog() {
        let server = server();
        let result = server.list_rules().unwrap();
        let json = extract_json(&result);
        let rules = json.as_array().unwrap();
        assert!(rules.iter().any(|r| r["id"] == "utilize"));
    }
}
