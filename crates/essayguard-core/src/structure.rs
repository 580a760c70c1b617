//! Sentence-level flow analysis: passive-heavy and uniform-length sentences.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Severity;
use crate::reports::{StructuralIssue, StructuralIssueKind, StructureReport};
use crate::text::{self, Sentence};

/// Passive and modal-passive constructions.
static PASSIVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:is|are|was|were)\s+\w+ed\b",
        r"(?i)\b(?:has|have|had)\s+been\b",
        r"(?i)\b(?:will|would|should|could)\s+be\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Share of a sentence's words inside passive constructions, in percent,
/// above which the sentence is flagged.
const PASSIVE_SENTENCE_PERCENT: f64 = 35.0;
/// Passive percentage above which the issue is `high`.
const PASSIVE_HIGH_PERCENT: f64 = 60.0;
/// Minimum sentences before uniformity is judged.
const UNIFORM_MIN_SENTENCES: usize = 3;
/// Coefficient of variation (percent) below which lengths are uniform.
const UNIFORM_CV_PERCENT: f64 = 15.0;
/// Coefficient of variation below which the issue is `high`.
const UNIFORM_HIGH_CV_PERCENT: f64 = 10.0;
/// Sentences within this many words of the mean are reported.
const UNIFORM_WORD_TOLERANCE: f64 = 3.0;
/// Maximum uniform-length sentences reported.
const UNIFORM_REPORT_CAP: usize = 3;

/// Count passive constructions in a span of text.
pub fn count_passive(text: &str) -> usize {
    PASSIVE_PATTERNS
        .iter()
        .map(|re| re.find_iter(text).count())
        .sum()
}

/// Words covered by passive constructions in a span of text.
fn passive_words(text: &str) -> usize {
    PASSIVE_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text))
        .map(|m| m.as_str().split_whitespace().count())
        .sum()
}

/// Analyze sentence flow in `text`.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn analyze_structure(text: &str) -> StructureReport {
    let sentences = text::locate_sentences(text);

    let mut issues = passive_sentences(&sentences);
    issues.extend(uniform_sentences(&sentences));

    let sentences_with_issues: Vec<usize> = issues
        .iter()
        .map(|i| i.sentence_num)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut issues_by_kind: BTreeMap<StructuralIssueKind, Vec<usize>> = BTreeMap::new();
    for issue in &issues {
        issues_by_kind
            .entry(issue.kind)
            .or_default()
            .push(issue.sentence_num);
    }

    StructureReport {
        issues,
        sentences_with_issues,
        issues_by_kind,
    }
}

fn passive_sentences(sentences: &[Sentence]) -> Vec<StructuralIssue> {
    sentences
        .iter()
        .filter_map(|s| {
            let words = s.word_count();
            if words == 0 {
                return None;
            }
            let covered = passive_words(&s.text).min(words);
            let percent = covered as f64 / words as f64 * 100.0;
            if percent <= PASSIVE_SENTENCE_PERCENT {
                return None;
            }
            Some(StructuralIssue {
                sentence_num: s.index,
                sentence: s.text.clone(),
                kind: StructuralIssueKind::PassiveVoice,
                severity: if percent > PASSIVE_HIGH_PERCENT {
                    Severity::High
                } else {
                    Severity::Medium
                },
                measure: round1(percent),
                suggestion: format!("Rewrite sentence {} in active voice", s.index),
            })
        })
        .collect()
}

fn uniform_sentences(sentences: &[Sentence]) -> Vec<StructuralIssue> {
    if sentences.len() < UNIFORM_MIN_SENTENCES {
        return Vec::new();
    }

    let counts: Vec<f64> = sentences.iter().map(|s| s.word_count() as f64).collect();
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return Vec::new();
    }
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    let cv = variance.sqrt() / mean * 100.0;
    if cv >= UNIFORM_CV_PERCENT {
        return Vec::new();
    }

    sentences
        .iter()
        .zip(&counts)
        .filter(|(_, c)| (*c - mean).abs() < UNIFORM_WORD_TOLERANCE)
        .take(UNIFORM_REPORT_CAP)
        .map(|(s, _)| StructuralIssue {
            sentence_num: s.index,
            sentence: s.text.clone(),
            kind: StructuralIssueKind::UniformLength,
            severity: if cv < UNIFORM_HIGH_CV_PERCENT {
                Severity::High
            } else {
                Severity::Medium
            },
            measure: round1(cv),
            suggestion: "Add shorter (5-10 word) or longer (25+ word) sentences to vary rhythm"
                .to_string(),
        })
        .collect()
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
