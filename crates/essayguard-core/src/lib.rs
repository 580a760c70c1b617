//! Core library for essayguard.
//!
//! Detects phrasing typical of machine-written essays, scores a text's
//! AI-risk, and rewrites flagged phrases with context-appropriate
//! replacements.
//!
//! # Modules
//!
//! - [`catalog`] - The table of detection rules
//! - [`detector`] - Flag detection
//! - [`context`] - Context classification for replacement choice
//! - [`scoring`] - Score aggregation
//! - [`fixer`] - Fix application
//! - [`cache`] - Result cache
//! - [`structure`] - Sentence flow analysis
//! - [`engine`] - The analysis pipeline
//! - [`reports`] - Serializable result types
//! - [`text`] - Sentence and word utilities
//! - `model` - Optional language-model scoring and rewriting (feature `model`)
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```no_run
//! use essayguard_core::{AnalyzeOptions, Analyzer};
//!
//! let analyzer = Analyzer::builtin().expect("built-in catalog is valid");
//! let report = analyzer
//!     .analyze("We utilize this tool to delve into the data.", &AnalyzeOptions::default())
//!     .expect("input accepted");
//!
//! println!("{} ({})", report.score, report.band);
//! ```
#![deny(unsafe_code)]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod context;
pub mod detector;
pub mod engine;
pub mod error;
pub mod fixer;
#[cfg(feature = "model")]
pub mod model;
pub mod reports;
pub mod scoring;
pub mod structure;
pub mod text;

pub use cache::ResultCache;
pub use catalog::{Catalog, PatternRule, Replacement, RuleSpec, Severity};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel, ModelConfig};
pub use context::ContextBucket;
pub use engine::{AnalyzeOptions, Analyzer, LengthPolicy};
pub use error::{
    AnalysisError, AnalysisResult, CatalogError, CatalogResult, ConfigError, ConfigResult,
    InputError, ModelError, ModelResult,
};
pub use fixer::Fix;
#[cfg(feature = "model")]
pub use model::{HttpModelOracle, ModelOracle, Rewrite, RewriteSource};
pub use reports::{
    AnalysisReport, FixApplication, FixOutcome, FixReport, Flag, RiskBand, RuleSummary,
    ScoreBreakdown, ScoreSource, StructuralIssue, StructuralIssueKind, StructureReport,
    TextStats,
};
pub use scoring::ScoringParams;

/// Default maximum input size in bytes (5 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5_242_880;
