//! Report structs for analysis and fix results.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for
//! use in both CLI JSON output and MCP tool responses.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{PatternRule, Severity};
use crate::context::ContextBucket;

// -- Flags ------------------------------------------------------------------

/// One detected occurrence class within a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Flag {
    /// Id of the rule that fired.
    pub rule_id: String,
    /// First matched substring, with its original casing.
    pub phrase: String,
    /// Number of non-overlapping matches.
    pub occurrences: usize,
    /// Rule weight.
    pub weight: u32,
    /// Rule severity.
    pub severity: Severity,
    /// Why the phrase is suspicious.
    pub rationale: String,
    /// Replacement chosen for this context.
    pub suggested_fix: String,
    /// Other ranked replacements for this context.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
    /// Context bucket the replacement was chosen for.
    pub context: ContextBucket,
    /// `weight × occurrences`, used for ranking.
    pub impact: u32,
}

// -- Score ------------------------------------------------------------------

/// Text-shape statistics feeding the score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextStats {
    /// Total words.
    pub word_count: usize,
    /// Total sentences.
    pub sentence_count: usize,
    /// Mean words per sentence.
    pub mean_sentence_length: f64,
    /// Population variance of words per sentence.
    pub sentence_length_variance: f64,
    /// Contractions per word.
    pub contraction_rate: f64,
    /// Passive constructions per sentence.
    pub passive_per_sentence: f64,
}

/// Per-signal contributions to the score, before floor and clamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreBreakdown {
    /// Baseline for typical human writing.
    pub baseline: f64,
    /// Sum of flag impacts times the impact factor.
    pub lexical: f64,
    /// Short-text penalty.
    pub short_text: f64,
    /// Low sentence-length variance penalty.
    pub uniform_length: f64,
    /// High mean sentence length penalty.
    pub long_sentences: f64,
    /// Low contraction density penalty.
    pub few_contractions: f64,
    /// High passive-voice density penalty.
    pub passive_voice: f64,
    /// Floor from critical-severity flags, if any applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity_floor: Option<f64>,
}

impl ScoreBreakdown {
    /// Sum of all additive terms.
    pub fn raw_total(&self) -> f64 {
        self.baseline
            + self.lexical
            + self.short_text
            + self.uniform_length
            + self.long_sentences
            + self.few_contractions
            + self.passive_voice
    }
}

/// Risk band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    /// Below 20.
    Minimal,
    /// 20--39.
    Low,
    /// 40--59.
    Moderate,
    /// 60--79.
    High,
    /// 80 and above.
    Critical,
}

impl RiskBand {
    /// Band for a 0--100 score.
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=19 => Self::Minimal,
            20..=39 => Self::Low,
            40..=59 => Self::Moderate,
            60..=79 => Self::High,
            _ => Self::Critical,
        }
    }

    /// Returns the band as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the final score came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    /// Pattern-based aggregator only.
    #[default]
    Pattern,
    /// Pattern score blended with a language-model score.
    Blended,
}

// -- Structure --------------------------------------------------------------

/// Kind of sentence-level structural issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StructuralIssueKind {
    /// Dense passive constructions.
    PassiveVoice,
    /// Sentence length close to a uniform mean.
    UniformLength,
}

/// A sentence flagged for a structural issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructuralIssue {
    /// Sentence number (1-indexed).
    pub sentence_num: usize,
    /// The sentence text.
    pub sentence: String,
    /// Issue kind.
    pub kind: StructuralIssueKind,
    /// `high` or `medium`.
    pub severity: Severity,
    /// Passive percentage or coefficient of variation, rounded to 0.1.
    pub measure: f64,
    /// What to change.
    pub suggestion: String,
}

/// Sentence-level flow analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructureReport {
    /// Individual issues, passive voice first.
    pub issues: Vec<StructuralIssue>,
    /// Sorted, deduplicated sentence numbers with any issue.
    pub sentences_with_issues: Vec<usize>,
    /// Sentence numbers per issue kind.
    pub issues_by_kind: BTreeMap<StructuralIssueKind, Vec<usize>>,
}

// -- Analysis ---------------------------------------------------------------

/// The result of analyzing one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// AI-risk score, 5--95.
    pub score: u8,
    /// Band for `score`.
    pub band: RiskBand,
    /// One-line summary of the score.
    pub reasoning: String,
    /// Flags, highest impact first.
    pub flags: Vec<Flag>,
    /// Flags hidden by the caller's visibility limit.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub hidden_flags: usize,
    /// Text-shape statistics.
    pub stats: TextStats,
    /// Score contributions.
    pub breakdown: ScoreBreakdown,
    /// Sentence-level flow issues.
    pub structure: StructureReport,
    /// Whether a model score was blended in.
    #[serde(default)]
    pub score_source: ScoreSource,
    /// Why a requested model score was not used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_note: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl AnalysisReport {
    /// Keep only the first `max` flags, recording how many were hidden.
    pub fn truncate_flags(&mut self, max: usize) {
        if self.flags.len() > max {
            self.hidden_flags += self.flags.len() - max;
            self.flags.truncate(max);
        }
    }
}

// -- Fixes ------------------------------------------------------------------

/// What happened to one requested fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FixApplication {
    /// Phrase that was targeted.
    pub phrase: String,
    /// Replacement text.
    pub replacement: String,
    /// Number of occurrences replaced; zero when skipped.
    pub replaced: usize,
}

/// Corrected text plus a record of each substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FixReport {
    /// The corrected text.
    pub text: String,
    /// Per-fix records, in processing order.
    pub applied: Vec<FixApplication>,
}

impl FixReport {
    /// Number of fixes that changed the text.
    pub fn changed(&self) -> usize {
        self.applied.iter().filter(|a| a.replaced > 0).count()
    }
}

/// Fix-then-rescan result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FixOutcome {
    /// Score of the original text.
    pub original_score: u8,
    /// Substitutions made.
    pub fix: FixReport,
    /// Fresh analysis of the corrected text.
    pub analysis: AnalysisReport,
}

// -- Catalog ----------------------------------------------------------------

/// Serializable view of a catalog rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RuleSummary {
    /// Rule identifier.
    pub id: String,
    /// Severity tier.
    pub severity: Severity,
    /// Weight per occurrence.
    pub weight: u32,
    /// Matcher source.
    pub pattern: String,
    /// Rationale.
    pub rationale: String,
    /// Default replacement.
    pub default_fix: String,
}

impl From<&PatternRule> for RuleSummary {
    fn from(rule: &PatternRule) -> Self {
        Self {
            id: rule.id().to_string(),
            severity: rule.severity(),
            weight: rule.weight(),
            pattern: rule.matcher().as_str().to_string(),
            rationale: rule.rationale().to_string(),
            default_fix: rule.default_fix().to_string(),
        }
    }
}
