//! Flag detection.
//!
//! Scans text against every catalog rule and emits one [`Flag`] per rule
//! that matches. Rules are independent: overlapping matches from different
//! rules all fire, and the fix applier copes with the overlap.

use crate::catalog::Catalog;
use crate::context;
use crate::reports::Flag;

/// Detect flags in `text`.
///
/// Each flag carries the first matched phrase, the total match count, and
/// the rule's default fix. Flags are sorted by impact, highest first; ties
/// keep catalog order. Blank text yields no flags.
#[tracing::instrument(skip_all, fields(text_len = text.len(), rules = catalog.len()))]
pub fn detect(text: &str, catalog: &Catalog) -> Vec<Flag> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut flags: Vec<Flag> = catalog
        .all_rules()
        .iter()
        .filter_map(|rule| {
            let mut matches = rule.matcher().find_iter(text);
            let first = matches.next()?;
            let occurrences = 1 + matches.count();
            let weight = rule.weight();
            Some(Flag {
                rule_id: rule.id().to_string(),
                phrase: first.as_str().to_string(),
                occurrences,
                weight,
                severity: rule.severity(),
                rationale: rule.rationale().to_string(),
                suggested_fix: rule.default_fix().to_string(),
                alternatives: Vec::new(),
                context: context::ContextBucket::General,
                impact: weight.saturating_mul(u32::try_from(occurrences).unwrap_or(u32::MAX)),
            })
        })
        .collect();

    // stable: equal impact keeps catalog order
    flags.sort_by(|a, b| b.impact.cmp(&a.impact));

    tracing::debug!(flags = flags.len(), "detection complete");
    flags
}

/// `text` with every span a catalog rule matches removed.
///
/// Text-shape statistics are measured on this, so inserting a trigger
/// phrase leaves them unchanged.
pub fn strip_matches(text: &str, catalog: &Catalog) -> String {
    catalog
        .all_rules()
        .iter()
        .fold(text.to_string(), |acc, rule| {
            rule.matcher().replace_all(&acc, "").into_owned()
        })
}

/// Replace each flag's default fix with a context-aware choice.
///
/// The bucket comes from [`context::classify`] on the flag's phrase in
/// `text`. Flags whose rule is not in `catalog` are left alone.
#[tracing::instrument(skip_all, fields(flags = flags.len()))]
pub fn refine(flags: &mut [Flag], text: &str, catalog: &Catalog) {
    for flag in flags.iter_mut() {
        let Some(rule) = catalog.get(&flag.rule_id) else {
            continue;
        };
        let bucket = context::classify(&flag.phrase, text);
        let ranked = rule.replacements_for(bucket);

        flag.context = bucket;
        flag.suggested_fix = rule.suggested_fix(bucket).to_string();
        flag.alternatives = ranked
            .iter()
            .skip(1)
            .map(|r| r.word.clone())
            .collect();
    }
}
