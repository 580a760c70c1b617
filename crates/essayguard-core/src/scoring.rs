//! Score aggregation.
//!
//! Combines flag impacts with text-shape signals into a single 5--95
//! AI-risk score. Critical-severity flags impose a floor so a handful of
//! strong tells can't be diluted by otherwise ordinary text.
//!
//! Shape signals are judged on the text with every catalog match removed.
//! A trigger phrase therefore only ever adds its own impact; it cannot
//! tip a variance or word-count threshold the other way.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Severity};
use crate::detector;
use crate::error::{ConfigError, ConfigResult};
use crate::reports::{Flag, RiskBand, ScoreBreakdown, TextStats};
use crate::structure;
use crate::text;

/// Tunable constants for the score aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScoringParams {
    /// Starting score for typical human writing.
    pub baseline: f64,
    /// Multiplier applied to the summed flag impacts.
    pub impact_factor: f64,
    /// Texts with fewer words than this get the short-text penalty.
    pub short_text_words: usize,
    /// Short-text penalty.
    pub short_text_penalty: f64,
    /// Minimum sentences before length variance is judged.
    pub uniform_min_sentences: usize,
    /// Variance of words-per-sentence below which lengths count as uniform.
    pub uniform_variance_threshold: f64,
    /// Uniform-length penalty.
    pub uniform_length_penalty: f64,
    /// Mean words-per-sentence above which sentences count as long.
    pub long_sentence_mean: f64,
    /// Long-sentence penalty.
    pub long_sentence_penalty: f64,
    /// Contractions per word below which contractions count as scarce.
    pub contraction_rate_threshold: f64,
    /// Scarce-contraction penalty.
    pub few_contractions_penalty: f64,
    /// Passive constructions per sentence above which passive voice is dense.
    pub passive_rate_threshold: f64,
    /// Dense-passive penalty.
    pub passive_voice_penalty: f64,
    /// Floor before per-flag increases.
    pub critical_floor_base: f64,
    /// Floor increase per additional critical flag.
    pub critical_floor_step: f64,
    /// Highest floor critical flags can impose.
    pub critical_floor_cap: f64,
    /// Lowest reportable score.
    pub min_score: u8,
    /// Highest reportable score.
    pub max_score: u8,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            baseline: 10.0,
            impact_factor: 0.8,
            short_text_words: 100,
            short_text_penalty: 8.0,
            uniform_min_sentences: 3,
            uniform_variance_threshold: 10.0,
            uniform_length_penalty: 10.0,
            long_sentence_mean: 25.0,
            long_sentence_penalty: 5.0,
            contraction_rate_threshold: 0.01,
            few_contractions_penalty: 5.0,
            passive_rate_threshold: 0.3,
            passive_voice_penalty: 6.0,
            critical_floor_base: 45.0,
            critical_floor_step: 15.0,
            critical_floor_cap: 85.0,
            min_score: 5,
            max_score: 95,
        }
    }
}

impl ScoringParams {
    /// Floor imposed by `critical` critical-severity flags, if any.
    ///
    /// `min(cap, base + step × critical)`.
    pub fn severity_floor(&self, critical: usize) -> Option<f64> {
        (critical > 0).then(|| {
            (self.critical_floor_base + self.critical_floor_step * critical as f64)
                .min(self.critical_floor_cap)
        })
    }

    /// Reject constants that cannot produce a bounded, monotonic score.
    pub fn validate(&self) -> ConfigResult<()> {
        let floats = [
            ("baseline", self.baseline),
            ("impact_factor", self.impact_factor),
            ("short_text_penalty", self.short_text_penalty),
            ("uniform_variance_threshold", self.uniform_variance_threshold),
            ("uniform_length_penalty", self.uniform_length_penalty),
            ("long_sentence_mean", self.long_sentence_mean),
            ("long_sentence_penalty", self.long_sentence_penalty),
            ("contraction_rate_threshold", self.contraction_rate_threshold),
            ("few_contractions_penalty", self.few_contractions_penalty),
            ("passive_rate_threshold", self.passive_rate_threshold),
            ("passive_voice_penalty", self.passive_voice_penalty),
            ("critical_floor_base", self.critical_floor_base),
            ("critical_floor_step", self.critical_floor_step),
            ("critical_floor_cap", self.critical_floor_cap),
        ];
        if let Some((name, value)) = floats.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Scoring(format!(
                "{name} must be a finite number, got {value}"
            )));
        }
        if self.impact_factor < 0.0 {
            return Err(ConfigError::Scoring(format!(
                "impact_factor must not be negative, got {}",
                self.impact_factor
            )));
        }
        if self.min_score > self.max_score {
            return Err(ConfigError::Scoring(format!(
                "min_score ({}) is greater than max_score ({})",
                self.min_score, self.max_score
            )));
        }
        if self.max_score > 100 {
            return Err(ConfigError::Scoring(format!(
                "max_score ({}) is greater than 100",
                self.max_score
            )));
        }
        Ok(())
    }

    /// Apply an optional floor, clamp, and round a raw score.
    ///
    /// NaN lands on `min_score`; inverted bounds resolve to `max_score`.
    pub fn finalize(&self, raw: f64, floor: Option<f64>) -> u8 {
        let floored = floor.map_or(raw, |f| raw.max(f));
        let clamped = floored
            .max(f64::from(self.min_score))
            .min(f64::from(self.max_score));
        // clamped into u8 range above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = clamped.round() as u8;
        score
    }
}

/// A score with the data that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    /// Final 5--95 score.
    pub score: u8,
    /// Per-signal contributions.
    pub breakdown: ScoreBreakdown,
    /// Statistics of the text as written.
    pub stats: TextStats,
    /// Statistics the shape penalties were judged on.
    pub shape: TextStats,
}

/// Measure the shape of `text`.
pub fn compute_stats(text: &str) -> TextStats {
    let word_count = text::extract_words(text).len();
    let sentences = text::locate_sentences(text);
    let sentence_count = sentences.len();

    let (mean, variance) = if sentence_count == 0 {
        (0.0, 0.0)
    } else {
        let lengths: Vec<f64> = sentences.iter().map(|s| s.word_count() as f64).collect();
        let n = sentence_count as f64;
        let mean = lengths.iter().sum::<f64>() / n;
        let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
        (mean, variance)
    };

    let contraction_rate = if word_count == 0 {
        0.0
    } else {
        text::count_contractions(text) as f64 / word_count as f64
    };

    let passive_per_sentence = if sentence_count == 0 {
        0.0
    } else {
        structure::count_passive(text) as f64 / sentence_count as f64
    };

    TextStats {
        word_count,
        sentence_count,
        mean_sentence_length: mean,
        sentence_length_variance: variance,
        contraction_rate,
        passive_per_sentence,
    }
}

/// Score `text` given its detected flags.
pub fn score(text: &str, flags: &[Flag], catalog: &Catalog, params: &ScoringParams) -> u8 {
    score_detailed(text, flags, catalog, params).score
}

/// Score `text` given its detected flags, keeping the breakdown.
///
/// The returned stats describe `text` as written; the shape penalties are
/// judged on `text` with every `catalog` match removed.
#[tracing::instrument(skip_all, fields(text_len = text.len(), flags = flags.len()))]
pub fn score_detailed(
    text: &str,
    flags: &[Flag],
    catalog: &Catalog,
    params: &ScoringParams,
) -> Scored {
    let stats = compute_stats(text);
    let shape = compute_stats(&detector::strip_matches(text, catalog));
    let impact: u64 = flags.iter().map(|f| u64::from(f.impact)).sum();
    let critical = flags
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count();

    let penalty = |hit: bool, amount: f64| if hit { amount } else { 0.0 };
    let has_sentences = shape.sentence_count > 0;

    let breakdown = ScoreBreakdown {
        baseline: params.baseline,
        lexical: impact as f64 * params.impact_factor,
        short_text: penalty(
            shape.word_count > 0 && shape.word_count < params.short_text_words,
            params.short_text_penalty,
        ),
        uniform_length: penalty(
            shape.sentence_count >= params.uniform_min_sentences
                && shape.sentence_length_variance < params.uniform_variance_threshold,
            params.uniform_length_penalty,
        ),
        long_sentences: penalty(
            has_sentences && shape.mean_sentence_length > params.long_sentence_mean,
            params.long_sentence_penalty,
        ),
        few_contractions: penalty(
            shape.word_count > 0 && shape.contraction_rate < params.contraction_rate_threshold,
            params.few_contractions_penalty,
        ),
        passive_voice: penalty(
            has_sentences && shape.passive_per_sentence > params.passive_rate_threshold,
            params.passive_voice_penalty,
        ),
        severity_floor: params.severity_floor(critical),
    };

    let score = params.finalize(breakdown.raw_total(), breakdown.severity_floor);
    tracing::debug!(score, raw = breakdown.raw_total(), critical, "scored");

    Scored {
        score,
        breakdown,
        stats,
        shape,
    }
}

/// One-line explanation of a score.
pub fn reasoning(score: u8, flags: &[Flag], breakdown: &ScoreBreakdown) -> String {
    let band = RiskBand::from_score(score);
    let mut parts = Vec::new();

    match flags.first() {
        None => parts.push("no flagged phrases".to_string()),
        Some(top) => {
            let noun = if flags.len() == 1 { "phrase" } else { "phrases" };
            parts.push(format!(
                "{} flagged {noun} led by \"{}\" ({})",
                flags.len(),
                top.phrase,
                top.severity
            ));
        }
    }

    let signals = [
        (breakdown.short_text, "short text"),
        (breakdown.uniform_length, "uniform sentence lengths"),
        (breakdown.long_sentences, "long sentences"),
        (breakdown.few_contractions, "few contractions"),
        (breakdown.passive_voice, "dense passive voice"),
    ];
    parts.extend(
        signals
            .iter()
            .filter(|(v, _)| *v > 0.0)
            .map(|(_, label)| (*label).to_string()),
    );

    if breakdown.severity_floor.is_some_and(|f| f >= breakdown.raw_total()) {
        parts.push("critical phrases set the floor".to_string());
    }

    format!("{} risk ({score}/100): {}", capitalize(band.as_str()), parts.join("; "))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::detector;

    fn scored(text: &str) -> Scored {
        let catalog = Catalog::builtin().unwrap();
        let flags = detector::detect(text, &catalog);
        score_detailed(text, &flags, &catalog, &ScoringParams::default())
    }

    fn cats(n: usize) -> String {
        format!("{}.", vec!["cat"; n].join(" "))
    }

    #[test]
    fn stats_basic() {
        let stats = compute_stats("I don't know. It was fine, we think.");
        assert_eq!(stats.word_count, 8);
        assert_eq!(stats.sentence_count, 2);
        assert!((stats.mean_sentence_length - 4.0).abs() < f64::EPSILON);
        assert!((stats.contraction_rate - 0.125).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_text_has_zero_shape_terms() {
        let s = scored("");
        assert_eq!(s.stats.sentence_count, 0);
        assert!((s.breakdown.raw_total() - 10.0).abs() < f64::EPSILON);
        assert_eq!(s.score, 10);
    }

    #[test]
    fn clean_casual_text_scores_low() {
        let s = scored("I can't believe it. We're going home now, and it's late.");
        assert!(s.breakdown.lexical.abs() < f64::EPSILON);
        assert!(s.breakdown.few_contractions.abs() < f64::EPSILON);
        assert!(s.score < 20, "score {}", s.score);
    }

    #[test]
    fn floor_grows_with_critical_flags() {
        let params = ScoringParams::default();
        assert_eq!(params.severity_floor(0), None);
        assert_eq!(params.severity_floor(1), Some(60.0));
        assert_eq!(params.severity_floor(2), Some(75.0));
        assert_eq!(params.severity_floor(10), Some(85.0));
    }

    #[test]
    fn critical_flag_lifts_to_floor() {
        let s = scored("I'd say we utilize it, don't you think so, pal?");
        assert_eq!(s.breakdown.severity_floor, Some(60.0));
        assert_eq!(s.score, 60);
    }

    #[test]
    fn score_is_clamped() {
        let params = ScoringParams::default();
        assert_eq!(params.finalize(-20.0, None), 5);
        assert_eq!(params.finalize(400.0, None), 95);
        assert_eq!(params.finalize(12.4, Some(45.0)), 45);
    }

    #[test]
    fn finalize_survives_unusable_params() {
        let inverted = ScoringParams {
            min_score: 90,
            max_score: 10,
            ..ScoringParams::default()
        };
        assert_eq!(inverted.finalize(50.0, None), 10);
        assert_eq!(ScoringParams::default().finalize(f64::NAN, None), 5);
        assert_eq!(ScoringParams::default().finalize(f64::NAN, Some(60.0)), 60);
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(ScoringParams::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_unusable_params() {
        let cases = [
            ScoringParams {
                min_score: 90,
                max_score: 10,
                ..ScoringParams::default()
            },
            ScoringParams {
                max_score: 120,
                ..ScoringParams::default()
            },
            ScoringParams {
                baseline: f64::NAN,
                ..ScoringParams::default()
            },
            ScoringParams {
                critical_floor_cap: f64::INFINITY,
                ..ScoringParams::default()
            },
            ScoringParams {
                impact_factor: -0.5,
                ..ScoringParams::default()
            },
        ];
        for params in cases {
            let err = params.validate().unwrap_err();
            assert!(matches!(err, ConfigError::Scoring(_)), "{err}");
        }
    }

    #[test]
    fn inserted_trigger_cannot_flip_shape_penalties() {
        // 29/34/36 words: variance 8.67, just under the uniform threshold
        let before = format!("{} {} {}", cats(29), cats(34), cats(36));
        let after = format!("{} {} various {}", cats(29), cats(34), cats(36));
        let a = scored(&before);
        let b = scored(&after);
        assert_eq!(a.score, 38);
        assert_eq!(b.stats.word_count, 100);
        assert_eq!(a.shape, b.shape);
        assert!(b.score >= a.score, "{} < {}", b.score, a.score);
    }

    #[test]
    fn stats_report_the_text_as_written() {
        let s = scored("We utilize the tool. It works well for us.");
        assert_eq!(s.stats.word_count, 9);
        assert_eq!(s.shape.word_count, 8);
    }

    #[test]
    fn heavy_text_hits_ceiling() {
        let s = scored(
            "We utilize unprecedented synergy to delve into a tapestry. \
             We leverage paradigms to facilitate outcomes.",
        );
        assert_eq!(s.score, 95);
    }

    #[test]
    fn reasoning_names_top_flag_and_signals() {
        let s = scored("We utilize it.");
        let catalog = Catalog::builtin().unwrap();
        let flags = detector::detect("We utilize it.", &catalog);
        let line = reasoning(s.score, &flags, &s.breakdown);
        assert!(line.contains("\"utilize\" (critical)"), "{line}");
        assert!(line.contains("short text"), "{line}");
    }

    #[test]
    fn reasoning_without_flags() {
        let line = reasoning(10, &[], &ScoreBreakdown::default());
        assert_eq!(line, "Minimal risk (10/100): no flagged phrases");
    }
}
