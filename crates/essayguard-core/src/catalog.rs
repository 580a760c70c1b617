//! Pattern catalog: the read-only table of detection rules.
//!
//! Rules are data, not code. Each entry carries a case-insensitive matcher,
//! a weight, a rationale, a default replacement, and optional replacement
//! lists keyed by [`ContextBucket`]. The built-in table is grouped by
//! severity tier for readability only; the `weight` field drives behavior.
//!
//! A [`Catalog`] is built once at startup and shared behind an `Arc`.
//! Building validates every rule, so a bad rule is a startup error and
//! never a per-request one.

use std::collections::{BTreeMap, HashSet};

use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::context::ContextBucket;
use crate::error::{CatalogError, CatalogResult};

/// Severity tier of a rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Severity {
    /// Mild signal.
    Low,
    /// Moderate signal.
    Medium,
    /// Strong signal.
    High,
    /// Near-certain signal on its own.
    Critical,
}

impl Severity {
    /// Derive the tier from a rule weight.
    pub const fn from_weight(weight: u32) -> Self {
        match weight {
            35.. => Self::Critical,
            25..=34 => Self::High,
            15..=24 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Returns the severity as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate replacement with a confidence rating (0--100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Replacement {
    /// Replacement text.
    pub word: String,
    /// How well the replacement fits its bucket (0--100).
    #[serde(default = "default_confidence")]
    pub confidence: u8,
}

const fn default_confidence() -> u8 {
    80
}

/// Declarative form of a rule, as written in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleSpec {
    /// Unique rule identifier.
    pub id: String,
    /// Regular expression, matched case-insensitively.
    pub pattern: String,
    /// Severity contribution per occurrence.
    pub weight: u32,
    /// Explicit tier; derived from `weight` when omitted.
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Why the pattern reads as machine-written.
    pub rationale: String,
    /// Replacement used when no bucketed alternative applies.
    pub default_fix: String,
    /// Replacement lists keyed by context bucket.
    #[serde(default)]
    pub alternatives: BTreeMap<ContextBucket, Vec<Replacement>>,
}

/// A compiled, validated detection rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    id: String,
    matcher: Regex,
    weight: u32,
    severity: Severity,
    rationale: String,
    default_fix: String,
    alternatives: BTreeMap<ContextBucket, Vec<Replacement>>,
}

impl PatternRule {
    /// Compile and validate a rule.
    pub fn compile(spec: &RuleSpec) -> CatalogResult<Self> {
        let matcher = RegexBuilder::new(&spec.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| CatalogError::InvalidPattern {
                id: spec.id.clone(),
                source,
            })?;

        if matcher.is_match("") {
            return Err(CatalogError::EmptyMatch {
                id: spec.id.clone(),
            });
        }
        if spec.weight == 0 {
            return Err(CatalogError::ZeroWeight {
                id: spec.id.clone(),
            });
        }
        if spec.default_fix.trim().is_empty() {
            return Err(CatalogError::EmptyDefaultFix {
                id: spec.id.clone(),
            });
        }

        Ok(Self {
            id: spec.id.clone(),
            matcher,
            weight: spec.weight,
            severity: spec
                .severity
                .unwrap_or_else(|| Severity::from_weight(spec.weight)),
            rationale: spec.rationale.clone(),
            default_fix: spec.default_fix.clone(),
            alternatives: spec.alternatives.clone(),
        })
    }

    /// Rule identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Compiled matcher.
    pub const fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Severity contribution per occurrence.
    pub const fn weight(&self) -> u32 {
        self.weight
    }

    /// Severity tier.
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Human-readable rationale.
    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    /// Replacement used when nothing better applies.
    pub fn default_fix(&self) -> &str {
        &self.default_fix
    }

    /// Ranked replacements for a bucket.
    ///
    /// Walks the bucket's parent chain (e.g. `formal_negative` → `formal`
    /// → `general`) and returns the first non-empty list. Empty when the
    /// rule has no bucketed alternatives on that chain.
    pub fn replacements_for(&self, bucket: ContextBucket) -> &[Replacement] {
        let mut current = Some(bucket);
        while let Some(b) = current {
            if let Some(list) = self.alternatives.get(&b)
                && !list.is_empty()
            {
                return list;
            }
            current = b.parent();
        }
        &[]
    }

    /// Best replacement for a bucket, falling back to the default fix.
    pub fn suggested_fix(&self, bucket: ContextBucket) -> &str {
        self.replacements_for(bucket)
            .first()
            .map_or(self.default_fix.as_str(), |r| r.word.as_str())
    }
}

/// The process-wide, read-only rule table.
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<PatternRule>,
}

impl Catalog {
    /// Build the built-in catalog.
    pub fn builtin() -> CatalogResult<Self> {
        Self::from_specs(&builtin_specs())
    }

    /// Build the built-in catalog followed by `extra` rules.
    pub fn with_extra_rules(extra: &[RuleSpec]) -> CatalogResult<Self> {
        let mut specs = builtin_specs();
        specs.extend_from_slice(extra);
        Self::from_specs(&specs)
    }

    /// Build a catalog from rule specs, preserving their order.
    #[tracing::instrument(skip_all, fields(rules = specs.len()))]
    pub fn from_specs(specs: &[RuleSpec]) -> CatalogResult<Self> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: spec.id.clone(),
                });
            }
            rules.push(PatternRule::compile(spec)?);
        }
        tracing::debug!(rules = rules.len(), "pattern catalog built");
        Ok(Self { rules })
    }

    /// All rules in catalog order.
    pub fn all_rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Number of rules.
    pub const fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the catalog has no rules.
    pub const fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

type Alternatives = &'static [(ContextBucket, &'static [(&'static str, u8)])];

/// Built-in rule row.
struct Builtin {
    id: &'static str,
    pattern: &'static str,
    weight: u32,
    rationale: &'static str,
    default_fix: &'static str,
    alternatives: Alternatives,
}

use ContextBucket::{
    Business, Casual, CasualNegative, CasualPositive, Formal, FormalNegative, FormalPositive,
    General,
};

// No replacement in this table may itself match a rule, or fixing would
// re-introduce a flag.
const BUILTIN: &[Builtin] = &[
    // -- critical ---------------------------------------------------------
    Builtin {
        id: "utilize",
        pattern: r"\butilize\b",
        weight: 42,
        rationale: "\"Utilize\" is a stock inflation of \"use\" in generated prose",
        default_fix: "use",
        alternatives: &[
            (General, &[("use", 95), ("employ", 80), ("apply", 78)]),
            (Casual, &[("use", 92), ("tap into", 80)]),
        ],
    },
    Builtin {
        id: "unprecedented",
        pattern: r"\bunprecedented\b",
        weight: 42,
        rationale: "Hyperbolic framing common in model output",
        default_fix: "major",
        alternatives: &[
            (FormalNegative, &[("significant", 92), ("major", 88), ("serious", 84)]),
            (FormalPositive, &[("remarkable", 91), ("exceptional", 89), ("historic", 87)]),
            (CasualNegative, &[("big", 75), ("serious", 72)]),
            (CasualPositive, &[("amazing", 70), ("incredible", 68)]),
        ],
    },
    Builtin {
        id: "delve",
        pattern: r"\bdelve\b",
        weight: 40,
        rationale: "\"Delve\" is one of the most over-represented words in model text",
        default_fix: "look",
        alternatives: &[(General, &[("look", 85), ("dig", 80)])],
    },
    Builtin {
        id: "leverage",
        pattern: r"\bleverage\b",
        weight: 40,
        rationale: "Corporate verb that students rarely reach for",
        default_fix: "use",
        alternatives: &[
            (Business, &[("use", 92), ("capitalize on", 88), ("take advantage of", 85)]),
            (Casual, &[("use", 90), ("make use of", 80)]),
        ],
    },
    Builtin {
        id: "facilitate",
        pattern: r"\bfacilitate\b",
        weight: 40,
        rationale: "Formal filler verb typical of generated text",
        default_fix: "help",
        alternatives: &[
            (Formal, &[("help", 92), ("enable", 88), ("make easier", 85)]),
            (Casual, &[("help", 90), ("make it easier", 87)]),
        ],
    },
    Builtin {
        id: "important-to-note",
        pattern: r"\bit(?: is|['\u{2019}]s) important to note that\b",
        weight: 40,
        rationale: "Signposting preamble that adds no content",
        default_fix: "notably,",
        alternatives: &[],
    },
    Builtin {
        id: "demonstrate",
        pattern: r"\bdemonstrate\b",
        weight: 38,
        rationale: "Academic register where a plain verb would do",
        default_fix: "show",
        alternatives: &[
            (Formal, &[("show", 94), ("prove", 91), ("reveal", 88)]),
            (Casual, &[("show", 92), ("illustrate", 85)]),
        ],
    },
    Builtin {
        id: "cutting-edge",
        pattern: r"\bcutting[- ]edge\b",
        weight: 38,
        rationale: "Marketing cliché frequent in generated essays",
        default_fix: "modern",
        alternatives: &[
            (Formal, &[("modern", 90), ("current", 88), ("latest", 86)]),
            (Casual, &[("new", 85), ("up-to-date", 82)]),
        ],
    },
    Builtin {
        id: "paradigm",
        pattern: r"\bparadigm\b",
        weight: 38,
        rationale: "Abstract jargon uncommon in student writing",
        default_fix: "model",
        alternatives: &[
            (Formal, &[("model", 91), ("approach", 85)]),
            (Casual, &[("way of thinking", 80), ("outlook", 78)]),
        ],
    },
    Builtin {
        id: "fast-paced-world",
        pattern: r"\bin today['\u{2019}]s fast[- ]paced world\b",
        weight: 38,
        rationale: "Formulaic opener strongly associated with generated essays",
        default_fix: "today",
        alternatives: &[],
    },
    Builtin {
        id: "synthesize",
        pattern: r"\bsynthesize\b",
        weight: 36,
        rationale: "Elevated verb where \"combine\" is natural",
        default_fix: "combine",
        alternatives: &[
            (Formal, &[("combine", 92), ("bring together", 89), ("merge", 86)]),
            (Casual, &[("put together", 85), ("mix", 80)]),
        ],
    },
    Builtin {
        id: "juxtapose",
        pattern: r"\bjuxtapose\b",
        weight: 36,
        rationale: "Rare verb that models overuse",
        default_fix: "compare",
        alternatives: &[
            (Formal, &[("compare", 90), ("contrast", 88)]),
            (Casual, &[("compare", 88), ("put next to", 82)]),
        ],
    },
    Builtin {
        id: "efficacy",
        pattern: r"\befficacy\b",
        weight: 36,
        rationale: "Technical noun where \"effectiveness\" reads naturally",
        default_fix: "effectiveness",
        alternatives: &[
            (Formal, &[("effectiveness", 92), ("success", 89), ("impact", 86)]),
            (Casual, &[("how well it works", 85)]),
        ],
    },
    Builtin {
        id: "tapestry",
        pattern: r"\b(?:rich |intricate |vibrant )?tapestry\b",
        weight: 36,
        rationale: "Decorative metaphor characteristic of model prose",
        default_fix: "mix",
        alternatives: &[],
    },
    // -- high -------------------------------------------------------------
    Builtin {
        id: "innovative",
        pattern: r"\binnovative\b",
        weight: 32,
        rationale: "Generic praise word",
        default_fix: "new",
        alternatives: &[
            (FormalPositive, &[("creative", 90), ("new", 88), ("original", 86)]),
            (Casual, &[("creative", 85), ("fresh", 82)]),
        ],
    },
    Builtin {
        id: "comprehensive",
        pattern: r"\bcomprehensive\b",
        weight: 30,
        rationale: "Inflated adjective common in summaries",
        default_fix: "thorough",
        alternatives: &[
            (Formal, &[("thorough", 92), ("complete", 90), ("full", 87)]),
            (Casual, &[("complete", 88), ("whole", 85)]),
        ],
    },
    Builtin {
        id: "crucial-role",
        pattern: r"\bplays a (?:crucial|pivotal|vital) role\b",
        weight: 30,
        rationale: "Stock phrase for importance",
        default_fix: "is key",
        alternatives: &[],
    },
    Builtin {
        id: "navigate-complexities",
        pattern: r"\bnavigate the complexities of\b",
        weight: 30,
        rationale: "Abstract stock phrase",
        default_fix: "deal with",
        alternatives: &[],
    },
    Builtin {
        id: "strategic",
        pattern: r"\bstrategic\b",
        weight: 28,
        rationale: "Business jargon in non-business writing",
        default_fix: "planned",
        alternatives: &[
            (Business, &[("planned", 91), ("calculated", 88), ("thoughtful", 85)]),
            (Casual, &[("smart", 85), ("planned out", 82)]),
        ],
    },
    Builtin {
        id: "optimize",
        pattern: r"\boptimize\b",
        weight: 28,
        rationale: "Technical verb used loosely",
        default_fix: "improve",
        alternatives: &[
            (Formal, &[("improve", 92), ("make better", 90)]),
            (Casual, &[("improve", 90), ("make better", 88)]),
        ],
    },
    Builtin {
        id: "testament",
        pattern: r"\ba testament to\b",
        weight: 28,
        rationale: "Formulaic phrase of praise",
        default_fix: "proof of",
        alternatives: &[],
    },
    Builtin {
        id: "implement",
        pattern: r"\bimplement\b",
        weight: 26,
        rationale: "Process jargon",
        default_fix: "put in place",
        alternatives: &[
            (Formal, &[("put in place", 91), ("set up", 89), ("establish", 86)]),
            (Casual, &[("put in place", 88), ("start using", 85)]),
        ],
    },
    Builtin {
        id: "myriad",
        pattern: r"\ba myriad of\b",
        weight: 26,
        rationale: "Ornate quantifier",
        default_fix: "many",
        alternatives: &[],
    },
    Builtin {
        id: "seamless",
        pattern: r"\bseamless\b",
        weight: 25,
        rationale: "Marketing adjective",
        default_fix: "smooth",
        alternatives: &[],
    },
    Builtin {
        id: "robust",
        pattern: r"\brobust\b",
        weight: 25,
        rationale: "Overused technical adjective",
        default_fix: "strong",
        alternatives: &[],
    },
    // -- medium -----------------------------------------------------------
    Builtin {
        id: "holistic",
        pattern: r"\bholistic\b",
        weight: 22,
        rationale: "Buzzword adjective",
        default_fix: "whole",
        alternatives: &[],
    },
    Builtin {
        id: "substantial",
        pattern: r"\bsubstantial\b",
        weight: 20,
        rationale: "Formal intensifier",
        default_fix: "large",
        alternatives: &[
            (Formal, &[("considerable", 89), ("significant", 87), ("large", 84)]),
            (Casual, &[("big", 85), ("large", 83)]),
        ],
    },
    Builtin {
        id: "foster",
        pattern: r"\bfoster\b",
        weight: 20,
        rationale: "Abstract verb favored by models",
        default_fix: "build",
        alternatives: &[],
    },
    Builtin {
        id: "pivotal",
        pattern: r"\bpivotal\b",
        weight: 20,
        rationale: "Overused intensifier",
        default_fix: "key",
        alternatives: &[],
    },
    Builtin {
        id: "moreover",
        pattern: r"\bmoreover\b",
        weight: 18,
        rationale: "Stiff connective",
        default_fix: "also",
        alternatives: &[
            (Formal, &[("also", 88), ("besides", 80)]),
            (Casual, &[("plus", 86), ("also", 85)]),
        ],
    },
    Builtin {
        id: "in-conclusion",
        pattern: r"\bin conclusion\b",
        weight: 18,
        rationale: "Template closing phrase",
        default_fix: "overall",
        alternatives: &[],
    },
    Builtin {
        id: "additionally",
        pattern: r"\badditionally\b",
        weight: 16,
        rationale: "Stiff connective",
        default_fix: "also",
        alternatives: &[],
    },
    Builtin {
        id: "showcase",
        pattern: r"\bshowcase\b",
        weight: 16,
        rationale: "Promotional verb",
        default_fix: "show",
        alternatives: &[],
    },
    Builtin {
        id: "crucial",
        pattern: r"\bcrucial\b",
        weight: 15,
        rationale: "Overused intensifier",
        default_fix: "key",
        alternatives: &[],
    },
    Builtin {
        id: "ultimately",
        pattern: r"\bultimately\b",
        weight: 15,
        rationale: "Summarizing adverb models lean on",
        default_fix: "in the end",
        alternatives: &[],
    },
    // -- low --------------------------------------------------------------
    Builtin {
        id: "meticulous",
        pattern: r"\bmeticulous\b",
        weight: 14,
        rationale: "Ornate adjective",
        default_fix: "careful",
        alternatives: &[],
    },
    Builtin {
        id: "endeavor",
        pattern: r"\bendeavou?r\b",
        weight: 14,
        rationale: "Ornate noun",
        default_fix: "effort",
        alternatives: &[],
    },
    Builtin {
        id: "furthermore",
        pattern: r"\bfurthermore\b",
        weight: 12,
        rationale: "Stiff connective",
        default_fix: "also",
        alternatives: &[
            (Formal, &[("also", 89), ("in addition", 87)]),
            (Casual, &[("also", 90), ("plus", 86)]),
        ],
    },
    Builtin {
        id: "vibrant",
        pattern: r"\bvibrant\b",
        weight: 12,
        rationale: "Decorative adjective",
        default_fix: "lively",
        alternatives: &[],
    },
    Builtin {
        id: "various",
        pattern: r"\bvarious\b",
        weight: 10,
        rationale: "Vague quantifier",
        default_fix: "different",
        alternatives: &[],
    },
];

fn builtin_specs() -> Vec<RuleSpec> {
    BUILTIN
        .iter()
        .map(|b| RuleSpec {
            id: b.id.to_string(),
            pattern: b.pattern.to_string(),
            weight: b.weight,
            severity: None,
            rationale: b.rationale.to_string(),
            default_fix: b.default_fix.to_string(),
            alternatives: b
                .alternatives
                .iter()
                .map(|(bucket, list)| {
                    let list = list
                        .iter()
                        .map(|(word, confidence)| Replacement {
                            word: (*word).to_string(),
                            confidence: *confidence,
                        })
                        .collect();
                    (*bucket, list)
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, pattern: &str, weight: u32) -> RuleSpec {
        RuleSpec {
            id: id.to_string(),
            pattern: pattern.to_string(),
            weight,
            severity: None,
            rationale: "test".to_string(),
            default_fix: "fix".to_string(),
            alternatives: BTreeMap::new(),
        }
    }

    #[test]
    fn builtin_catalog_builds() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), BUILTIN.len());
        assert!(catalog.get("utilize").is_some());
    }

    #[test]
    fn builtin_ids_are_unique() {
        let ids: HashSet<_> = BUILTIN.iter().map(|b| b.id).collect();
        assert_eq!(ids.len(), BUILTIN.len());
    }

    #[test]
    fn builtin_replacements_never_trigger_a_rule() {
        let catalog = Catalog::builtin().unwrap();
        for rule in catalog.all_rules() {
            let mut fixes: Vec<&str> = vec![rule.default_fix()];
            for list in rule.alternatives.values() {
                fixes.extend(list.iter().map(|r| r.word.as_str()));
            }
            for fix in fixes {
                for other in catalog.all_rules() {
                    assert!(
                        !other.matcher().is_match(fix),
                        "replacement {fix:?} of {} triggers {}",
                        rule.id(),
                        other.id()
                    );
                }
            }
        }
    }

    #[test]
    fn severity_derived_from_weight() {
        assert_eq!(Severity::from_weight(42), Severity::Critical);
        assert_eq!(Severity::from_weight(35), Severity::Critical);
        assert_eq!(Severity::from_weight(30), Severity::High);
        assert_eq!(Severity::from_weight(20), Severity::Medium);
        assert_eq!(Severity::from_weight(8), Severity::Low);
    }

    #[test]
    fn explicit_severity_wins() {
        let mut s = spec("x", r"\bx\b", 10);
        s.severity = Some(Severity::Critical);
        let rule = PatternRule::compile(&s).unwrap();
        assert_eq!(rule.severity(), Severity::Critical);
    }

    #[test]
    fn rejects_empty_matching_pattern() {
        let err = PatternRule::compile(&spec("opt", r"(?:foo)?", 10)).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyMatch { .. }));
    }

    #[test]
    fn rejects_invalid_pattern() {
        let err = PatternRule::compile(&spec("bad", r"(unclosed", 10)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_zero_weight() {
        let err = PatternRule::compile(&spec("zero", r"\bzero\b", 0)).unwrap_err();
        assert!(matches!(err, CatalogError::ZeroWeight { .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let specs = vec![spec("dup", r"\ba\b", 10), spec("dup", r"\bb\b", 10)];
        let err = Catalog::from_specs(&specs).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { .. }));
    }

    #[test]
    fn extra_rules_append_after_builtins() {
        let catalog = Catalog::with_extra_rules(&[spec("custom", r"\bsynergy\b", 30)]).unwrap();
        assert_eq!(catalog.all_rules().last().unwrap().id(), "custom");
    }

    #[test]
    fn replacement_fallback_chain() {
        let catalog = Catalog::builtin().unwrap();

        let unprecedented = catalog.get("unprecedented").unwrap();
        assert_eq!(
            unprecedented.suggested_fix(ContextBucket::FormalPositive),
            "remarkable"
        );
        // formal_negative → formal → general: nothing for plain formal
        assert_eq!(unprecedented.suggested_fix(ContextBucket::Formal), "major");

        let facilitate = catalog.get("facilitate").unwrap();
        assert_eq!(
            facilitate.suggested_fix(ContextBucket::CasualNegative),
            "help"
        );

        let utilize = catalog.get("utilize").unwrap();
        assert_eq!(utilize.suggested_fix(ContextBucket::Business), "use");
        assert_eq!(utilize.replacements_for(ContextBucket::Formal).len(), 3);
    }

    #[test]
    fn rule_spec_from_yaml_with_alternatives() {
        let yaml = r#"
id: synergy
pattern: '\bsynergy\b'
weight: 28
rationale: Corporate filler.
default_fix: teamwork
alternatives:
  casual:
    - word: working together
  business:
    - word: collaboration
      confidence: 90
"#;
        let spec: RuleSpec = serde_yaml::from_str(yaml).unwrap();
        let rule = PatternRule::compile(&spec).unwrap();
        assert_eq!(rule.severity(), Severity::High);
        assert_eq!(rule.suggested_fix(ContextBucket::Business), "collaboration");
        assert_eq!(rule.suggested_fix(ContextBucket::CasualPositive), "working together");
        assert_eq!(rule.replacements_for(ContextBucket::Casual)[0].confidence, 80);
        assert_eq!(rule.suggested_fix(ContextBucket::Formal), "teamwork");
    }
}
