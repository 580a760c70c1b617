//! The analysis pipeline.
//!
//! [`Analyzer`] owns the catalog, the scoring constants, the caller's
//! length policy and the result cache, and exposes the public operations:
//! analyze, apply fixes, fix-and-rescan and rule listing.

use std::sync::Arc;

use crate::cache::{DEFAULT_CACHE_CAPACITY, ResultCache};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::detector;
use crate::error::{AnalysisResult, CatalogResult, ConfigResult, InputError};
use crate::fixer;
use crate::reports::{
    AnalysisReport, FixOutcome, FixReport, Flag, RiskBand, RuleSummary, ScoreSource,
};
use crate::scoring::{self, ScoringParams};
use crate::structure;

/// Accepted text length, in characters of the trimmed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPolicy {
    /// Shortest accepted text.
    pub min_chars: usize,
    /// Longest accepted text.
    pub max_chars: usize,
}

impl LengthPolicy {
    /// Default minimum length.
    pub const DEFAULT_MIN_CHARS: usize = 50;
    /// Default maximum length.
    pub const DEFAULT_MAX_CHARS: usize = 10_000;

    /// A policy that only rejects blank text.
    pub const fn unbounded() -> Self {
        Self {
            min_chars: 0,
            max_chars: usize::MAX,
        }
    }

    /// Check `text` against the policy.
    pub fn check(&self, text: &str) -> Result<(), InputError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InputError::Empty);
        }
        let chars = trimmed.chars().count();
        if chars < self.min_chars {
            return Err(InputError::TooShort {
                chars,
                min: self.min_chars,
            });
        }
        if chars > self.max_chars {
            return Err(InputError::TooLong {
                chars,
                max: self.max_chars,
            });
        }
        Ok(())
    }
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self {
            min_chars: Self::DEFAULT_MIN_CHARS,
            max_chars: Self::DEFAULT_MAX_CHARS,
        }
    }
}

/// Per-request analysis options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Phrases or rule ids already dealt with in this editing session.
    ///
    /// Matching flags are dropped from the visible list; the score still
    /// counts them.
    pub excluded_phrases: Vec<String>,
    /// Verdict of the caller's usage gate.
    pub permitted: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            excluded_phrases: Vec::new(),
            permitted: true,
        }
    }
}

impl AnalyzeOptions {
    /// Options with nothing excluded and analysis permitted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude these phrases or rule ids from the flag list.
    pub fn excluding<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_phrases
            .extend(phrases.into_iter().map(Into::into));
        self
    }

    /// Record the usage gate's verdict.
    pub const fn permitted(mut self, permitted: bool) -> Self {
        self.permitted = permitted;
        self
    }

    fn excludes(&self, flag: &Flag) -> bool {
        let phrase = flag.phrase.to_lowercase();
        let rule_id = flag.rule_id.to_lowercase();
        self.excluded_phrases.iter().any(|p| {
            let p = p.trim().to_lowercase();
            p == phrase || p == rule_id
        })
    }
}

/// The analysis pipeline.
#[derive(Debug)]
pub struct Analyzer {
    catalog: Arc<Catalog>,
    params: ScoringParams,
    policy: LengthPolicy,
    cache: ResultCache,
}

impl Analyzer {
    /// Create an analyzer over `catalog` with default settings.
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self {
            catalog: catalog.into(),
            params: ScoringParams::default(),
            policy: LengthPolicy::default(),
            cache: ResultCache::new(DEFAULT_CACHE_CAPACITY),
        }
    }

    /// Create an analyzer over the built-in catalog.
    pub fn builtin() -> CatalogResult<Self> {
        Ok(Self::new(Catalog::builtin()?))
    }

    /// Create an analyzer from configuration.
    ///
    /// Extra rules and scoring constants are validated here; either one
    /// being bad fails startup.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        config.scoring.validate()?;
        let catalog = Catalog::with_extra_rules(&config.rules)?;
        Ok(Self::new(catalog)
            .with_params(config.scoring.clone())
            .with_length_policy(config.length_policy())
            .with_cache_capacity(config.cache_capacity))
    }

    /// Replace the scoring constants.
    #[must_use]
    pub fn with_params(mut self, params: ScoringParams) -> Self {
        self.params = params;
        self
    }

    /// Replace the length policy.
    #[must_use]
    pub const fn with_length_policy(mut self, policy: LengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the result cache with one of the given capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ResultCache::new(capacity);
        self
    }

    /// The pattern catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The scoring constants.
    pub const fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// The length policy.
    pub const fn length_policy(&self) -> LengthPolicy {
        self.policy
    }

    /// The result cache.
    pub const fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Reject input before any pattern work is done.
    pub fn validate_input(&self, text: &str, options: &AnalyzeOptions) -> Result<(), InputError> {
        if !options.permitted {
            return Err(InputError::NotPermitted);
        }
        self.policy.check(text)
    }

    /// Analyze `text`.
    ///
    /// Fails only with an input error. Repeated calls on the same text
    /// return identical results.
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub fn analyze(&self, text: &str, options: &AnalyzeOptions) -> AnalysisResult<AnalysisReport> {
        self.validate_input(text, options)?;
        let report = self.analyze_unchecked(text, options);
        tracing::info!(
            score = report.score,
            band = report.band.as_str(),
            flags = report.flags.len(),
            "analysis complete"
        );
        Ok(report)
    }

    /// Analyze without the length policy, for text this crate produced.
    fn analyze_unchecked(&self, text: &str, options: &AnalyzeOptions) -> AnalysisReport {
        let cached = self.cache.get_or_compute(text, || self.compute(text));
        let mut report = AnalysisReport::clone(&cached);
        if !options.excluded_phrases.is_empty() {
            report.flags.retain(|f| !options.excludes(f));
        }
        report
    }

    fn compute(&self, text: &str) -> AnalysisReport {
        let mut flags = detector::detect(text, &self.catalog);
        detector::refine(&mut flags, text, &self.catalog);
        let scored = scoring::score_detailed(text, &flags, &self.catalog, &self.params);
        let reasoning = scoring::reasoning(scored.score, &flags, &scored.breakdown);

        AnalysisReport {
            score: scored.score,
            band: RiskBand::from_score(scored.score),
            reasoning,
            flags,
            hidden_flags: 0,
            stats: scored.stats,
            breakdown: scored.breakdown,
            structure: structure::analyze_structure(text),
            score_source: ScoreSource::Pattern,
            model_note: None,
        }
    }

    /// Substitute each flag's suggested fix into `text`.
    ///
    /// Every spelling the flag's rule matches is rewritten, not just the
    /// first one detection recorded.
    pub fn apply_fixes(&self, text: &str, flags: &[Flag]) -> FixReport {
        fixer::apply_flag_fixes(text, flags, &self.catalog)
    }

    /// Analyze, apply every visible flag's fix, and analyze the result.
    ///
    /// The new score comes from re-running the same pipeline on the fixed
    /// text.
    #[tracing::instrument(skip_all, fields(text_len = text.len()))]
    pub fn fix_and_rescan(&self, text: &str, options: &AnalyzeOptions) -> AnalysisResult<FixOutcome> {
        let original = self.analyze(text, options)?;
        let fix = self.apply_fixes(text, &original.flags);
        let analysis = self.analyze_unchecked(&fix.text, options);
        tracing::info!(
            before = original.score,
            after = analysis.score,
            changed = fix.changed(),
            "fix applied"
        );
        Ok(FixOutcome {
            original_score: original.score,
            fix,
            analysis,
        })
    }

    /// Every catalog rule, in catalog order.
    pub fn list_rules(&self) -> Vec<RuleSummary> {
        self.catalog.all_rules().iter().map(RuleSummary::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RuleSpec, Severity};
    use crate::error::{AnalysisError, ConfigError};

    fn analyzer() -> Analyzer {
        Analyzer::builtin()
            .unwrap()
            .with_length_policy(LengthPolicy::unbounded())
    }

    fn analyze(text: &str) -> AnalysisReport {
        analyzer().analyze(text, &AnalyzeOptions::default()).unwrap()
    }

    const ESSAY: &str = "We utilize shared notes in class because the group needs one place to \
        keep every idea and source. Furthermore, the team meets every week to compare drafts \
        and check the evidence for each main claim together. Students utilize the library \
        database to find articles that support the argument in a clear and honest way. The \
        teacher reads each draft carefully and writes short comments that point to the parts \
        needing more work. We utilize those comments when we revise the essay and make every \
        paragraph flow into the next one. The final version goes to the teacher on Friday along \
        with a list of every source we used. Everyone agrees that the process helps the whole \
        group write better essays.";

    #[test]
    fn end_to_end_essay() {
        let report = analyze(ESSAY);
        assert_eq!(report.stats.word_count, 120);
        assert_eq!(report.flags[0].rule_id, "utilize");
        assert_eq!(report.flags[0].occurrences, 3);
        assert!(report.flags.iter().any(|f| f.rule_id == "furthermore"));
        assert!(report.score >= 60, "score {}", report.score);
        assert!(report.breakdown.lexical > 0.0);
        assert!(report.breakdown.uniform_length > 0.0);
        assert_eq!(report.score_source, ScoreSource::Pattern);
    }

    #[test]
    fn empty_input_is_an_input_error() {
        let analyzer = analyzer();
        for text in ["", "   ", "\n\t"] {
            let err = analyzer.analyze(text, &AnalyzeOptions::default()).unwrap_err();
            assert_eq!(err.as_input(), Some(&InputError::Empty));
        }
    }

    #[test]
    fn length_policy_bounds() {
        let analyzer = Analyzer::builtin().unwrap().with_length_policy(LengthPolicy {
            min_chars: 10,
            max_chars: 20,
        });
        let opts = AnalyzeOptions::default();
        assert!(matches!(
            analyzer.analyze("short", &opts),
            Err(AnalysisError::Input(InputError::TooShort { chars: 5, min: 10 }))
        ));
        assert!(matches!(
            analyzer.analyze("this one is far too long to accept", &opts),
            Err(AnalysisError::Input(InputError::TooLong { max: 20, .. }))
        ));
        assert!(analyzer.analyze("  just right  ", &opts).is_ok());
    }

    #[test]
    fn usage_gate_blocks_before_analysis() {
        let analyzer = analyzer();
        let opts = AnalyzeOptions::new().permitted(false);
        let err = analyzer.validate_input("We utilize it.", &opts).unwrap_err();
        assert_eq!(err, InputError::NotPermitted);
        assert!(analyzer.cache().is_empty());
    }

    #[test]
    fn analysis_is_deterministic() {
        let uncached = analyzer().with_cache_capacity(0);
        let opts = AnalyzeOptions::default();
        let a = uncached.analyze(ESSAY, &opts).unwrap();
        let b = uncached.analyze(ESSAY, &opts).unwrap();
        assert_eq!(a, b);

        let cached = analyzer();
        let c = cached.analyze(ESSAY, &opts).unwrap();
        let d = cached.analyze(ESSAY, &opts).unwrap();
        assert_eq!(c, d);
        assert_eq!(a, c);
        assert_eq!(cached.cache().len(), 1);
    }

    #[test]
    fn fixing_removes_fixable_flags() {
        let analyzer = analyzer();
        let report = analyzer.analyze("We utilize this tool.", &AnalyzeOptions::default()).unwrap();
        let fix = analyzer.apply_fixes("We utilize this tool.", &report.flags);
        assert_eq!(fix.text, "We use this tool.");
        let again = analyzer.analyze(&fix.text, &AnalyzeOptions::default()).unwrap();
        assert!(again.flags.is_empty());
    }

    #[test]
    fn fixing_the_essay_leaves_no_flags() {
        let analyzer = analyzer();
        let outcome = analyzer.fix_and_rescan(ESSAY, &AnalyzeOptions::default()).unwrap();
        assert!(outcome.analysis.flags.is_empty());
        assert!(outcome.analysis.score < outcome.original_score);
        assert_eq!(outcome.fix.changed(), 2);
        assert!(!outcome.fix.text.to_lowercase().contains("utilize"));
    }

    #[test]
    fn fixing_covers_every_spelling_of_a_rule() {
        let text = "Our cutting-edge lab uses cutting edge tools every day. A rich tapestry \
                    of songs and a tapestry of voices fill the hall. Music plays a vital role \
                    here and art plays a crucial role too.";
        let analyzer = analyzer();
        let outcome = analyzer.fix_and_rescan(text, &AnalyzeOptions::default()).unwrap();
        assert!(
            outcome.analysis.flags.is_empty(),
            "left {:?} in {:?}",
            outcome.analysis.flags.iter().map(|f| &f.phrase).collect::<Vec<_>>(),
            outcome.fix.text
        );
        let fixed = outcome.fix.text.to_lowercase();
        assert!(!fixed.contains("cutting"));
        assert!(!fixed.contains("tapestry"));
        assert!(!fixed.contains("vital"));
        assert!(!fixed.contains("crucial"));
    }

    #[test]
    fn rescan_is_deterministic() {
        let analyzer = analyzer();
        let opts = AnalyzeOptions::default();
        let a = analyzer.fix_and_rescan(ESSAY, &opts).unwrap();
        let b = analyzer.fix_and_rescan(ESSAY, &opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adding_a_trigger_never_lowers_the_score() {
        let pairs = [
            ("We use the tool, and I'd say it's fine.", "We utilize the tool, and I'd say it's fine."),
            ("We utilize the tool and it helps.", "We utilize the tool and utilize it."),
            (
                "The plan is good. It works well for the whole class.",
                "The plan is robust. It works well for the whole class.",
            ),
            (
                "Also, the plan is good for us.",
                "Furthermore, the plan is good for us.",
            ),
        ];
        for (before, after) in pairs {
            let a = analyze(before).score;
            let b = analyze(after).score;
            assert!(b >= a, "{after:?} scored {b} < {a}");
        }
    }

    #[test]
    fn scores_stay_in_bounds() {
        let texts = [
            "I can't. Won't. Don't.",
            "Hi.",
            ESSAY,
            "We utilize unprecedented synergy to delve into a tapestry. We leverage it to \
             facilitate outcomes. It is important to note that this paradigm is cutting-edge.",
        ];
        for text in texts {
            let score = analyze(text).score;
            assert!((5..=95).contains(&score), "{text:?} scored {score}");
        }
    }

    #[test]
    fn two_critical_flags_hold_the_floor() {
        let params = ScoringParams {
            impact_factor: 0.0,
            ..ScoringParams::default()
        };
        let analyzer = analyzer().with_params(params);
        let text = "Honestly, I'd love to delve into it, but we'll utilize what's left. \
                    That's all I've got for now, so don't wait up for me tonight.";
        let report = analyzer.analyze(text, &AnalyzeOptions::default()).unwrap();
        let critical = report
            .flags
            .iter()
            .filter(|f| f.severity == Severity::Critical)
            .count();
        assert_eq!(critical, 2);
        assert!(report.score >= 45);
        assert_eq!(report.score, 75);
    }

    #[test]
    fn excluded_phrases_hide_flags_but_keep_score() {
        let analyzer = analyzer();
        let full = analyzer.analyze(ESSAY, &AnalyzeOptions::default()).unwrap();
        let opts = AnalyzeOptions::new().excluding(["Furthermore"]);
        let filtered = analyzer.analyze(ESSAY, &opts).unwrap();
        assert!(filtered.flags.iter().all(|f| f.rule_id != "furthermore"));
        assert_eq!(filtered.flags.len(), full.flags.len() - 1);
        assert_eq!(filtered.score, full.score);

        let by_id = analyzer
            .analyze(ESSAY, &AnalyzeOptions::new().excluding(["utilize"]))
            .unwrap();
        assert!(by_id.flags.iter().all(|f| f.rule_id != "utilize"));
    }

    #[test]
    fn exclusions_fold_non_ascii_case() {
        let mut config = Config::default();
        config.rules.push(RuleSpec {
            id: "flourish".to_string(),
            pattern: r"\bélan\b".to_string(),
            weight: 12,
            severity: None,
            rationale: "Borrowed flourish".to_string(),
            default_fix: "energy".to_string(),
            alternatives: Default::default(),
        });
        config.min_chars = 0;
        let analyzer = Analyzer::from_config(&config).unwrap();
        let text = "They argued with ÉLAN and left.";
        let full = analyzer.analyze(text, &AnalyzeOptions::default()).unwrap();
        assert_eq!(full.flags[0].phrase, "ÉLAN");

        for exclusion in ["élan", " Élan ", "ÉLAN"] {
            let opts = AnalyzeOptions::new().excluding([exclusion]);
            let report = analyzer.analyze(text, &opts).unwrap();
            assert!(report.flags.is_empty(), "{exclusion:?} did not hide the flag");
        }
    }

    #[test]
    fn exclusions_do_not_leak_between_requests() {
        let analyzer = analyzer();
        let opts = AnalyzeOptions::new().excluding(["utilize"]);
        let _ = analyzer.analyze(ESSAY, &opts).unwrap();
        let plain = analyzer.analyze(ESSAY, &AnalyzeOptions::default()).unwrap();
        assert!(plain.flags.iter().any(|f| f.rule_id == "utilize"));
    }

    #[test]
    fn no_flags_is_a_valid_result() {
        let report = analyze("I can't come today, sorry. We'll talk tomorrow about the trip.");
        assert!(report.flags.is_empty());
        assert!(report.reasoning.contains("no flagged phrases"));
    }

    #[test]
    fn from_config_adds_extra_rules() {
        let mut config = Config::default();
        config.rules.push(RuleSpec {
            id: "synergy".to_string(),
            pattern: r"\bsynergy\b".to_string(),
            weight: 30,
            severity: None,
            rationale: "Buzzword".to_string(),
            default_fix: "teamwork".to_string(),
            alternatives: Default::default(),
        });
        config.min_chars = 0;
        let analyzer = Analyzer::from_config(&config).unwrap();
        let report = analyzer
            .analyze("We want synergy.", &AnalyzeOptions::default())
            .unwrap();
        assert_eq!(report.flags[0].rule_id, "synergy");
        assert_eq!(report.flags[0].severity, Severity::High);
        assert_eq!(analyzer.list_rules().len(), Catalog::builtin().unwrap().len() + 1);
    }

    #[test]
    fn from_config_rejects_bad_rules() {
        let mut config = Config::default();
        config.rules.push(RuleSpec {
            id: "broken".to_string(),
            pattern: "(unclosed".to_string(),
            weight: 10,
            severity: None,
            rationale: "x".to_string(),
            default_fix: "y".to_string(),
            alternatives: Default::default(),
        });
        assert!(matches!(
            Analyzer::from_config(&config),
            Err(ConfigError::Rules(_))
        ));
    }

    #[test]
    fn from_config_rejects_unusable_scoring() {
        let mut config = Config::default();
        config.scoring.min_score = 90;
        config.scoring.max_score = 10;
        let err = Analyzer::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Scoring(_)), "{err}");

        let mut config = Config::default();
        config.scoring.baseline = f64::NAN;
        assert!(matches!(
            Analyzer::from_config(&config),
            Err(ConfigError::Scoring(_))
        ));
    }

    #[test]
    fn list_rules_in_catalog_order() {
        let rules = analyzer().list_rules();
        assert_eq!(rules[0].id, "utilize");
        assert!(rules.iter().all(|r| !r.default_fix.is_empty()));
    }
}
