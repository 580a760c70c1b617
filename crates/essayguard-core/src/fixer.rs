//! Fix application.
//!
//! Substitutes each flagged phrase with its replacement, rightmost phrase
//! first, re-reading the live text before every step so that one
//! substitution can never shift or truncate another.

use regex::{Captures, Regex};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::reports::{Flag, FixApplication, FixReport};
use crate::text;

/// A phrase and the text that should replace it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Fix {
    /// Phrase to replace, matched case-insensitively.
    pub phrase: String,
    /// Replacement text.
    pub replacement: String,
}

impl Fix {
    /// Create a fix.
    pub fn new(phrase: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            replacement: replacement.into(),
        }
    }
}

impl From<&Flag> for Fix {
    fn from(flag: &Flag) -> Self {
        Self::new(flag.phrase.clone(), flag.suggested_fix.clone())
    }
}

/// Apply `fixes` to `text`.
///
/// Fixes are processed in descending order of their phrase's last
/// occurrence. A fix with an empty phrase, or whose phrase is gone from
/// the text by the time it is reached, is recorded with `replaced: 0`.
#[tracing::instrument(skip_all, fields(text_len = text.len(), fixes = fixes.len()))]
pub fn apply_fixes(text: &str, fixes: &[Fix]) -> FixReport {
    let targets = fixes
        .iter()
        .map(|fix| Target {
            phrase: &fix.phrase,
            replacement: &fix.replacement,
            matcher: text::phrase_matcher(&fix.phrase),
        })
        .collect();
    apply_targets(text, targets)
}

/// Apply each flag's suggested fix to every surface form its rule matches.
///
/// A rule can match several spellings ("cutting-edge", "cutting edge");
/// all of them are rewritten. Flags whose rule is not in `catalog` fall
/// back to their recorded phrase.
#[tracing::instrument(skip_all, fields(text_len = text.len(), flags = flags.len()))]
pub fn apply_flag_fixes(text: &str, flags: &[Flag], catalog: &Catalog) -> FixReport {
    let targets = flags
        .iter()
        .map(|flag| Target {
            phrase: &flag.phrase,
            replacement: &flag.suggested_fix,
            matcher: catalog
                .get(&flag.rule_id)
                .map(|rule| rule.matcher().clone())
                .or_else(|| text::phrase_matcher(&flag.phrase)),
        })
        .collect();
    apply_targets(text, targets)
}

/// Apply `fixes` and return only the corrected text.
pub fn apply_fixes_to_text(text: &str, fixes: &[Fix]) -> String {
    apply_fixes(text, fixes).text
}

struct Target<'a> {
    phrase: &'a str,
    replacement: &'a str,
    matcher: Option<Regex>,
}

fn apply_targets(text: &str, targets: Vec<Target<'_>>) -> FixReport {
    let mut ordered: Vec<(Option<usize>, Target<'_>)> = targets
        .into_iter()
        .map(|t| (last_occurrence(text, t.matcher.as_ref()), t))
        .collect();
    // stable: equal positions keep input order
    ordered.sort_by(|a, b| b.0.cmp(&a.0));

    let mut live = text.to_string();
    let mut applied = Vec::with_capacity(ordered.len());

    for (_, target) in ordered {
        let replaced = replace_all(&mut live, &target);
        if replaced == 0 {
            tracing::debug!(phrase = %target.phrase, "fix skipped, phrase not present");
        }
        applied.push(FixApplication {
            phrase: target.phrase.to_string(),
            replacement: target.replacement.to_string(),
            replaced,
        });
    }

    FixReport {
        text: live,
        applied,
    }
}

fn last_occurrence(text: &str, matcher: Option<&Regex>) -> Option<usize> {
    matcher?.find_iter(text).last().map(|m| m.start())
}

/// Replace every match of the target in `live`, returning the count.
fn replace_all(live: &mut String, target: &Target<'_>) -> usize {
    let Some(re) = target.matcher.as_ref() else {
        return 0;
    };
    let count = re.find_iter(live).count();
    if count == 0 {
        return 0;
    }
    let replaced = re
        .replace_all(live, |caps: &Captures<'_>| {
            match_case(&caps[0], target.replacement)
        })
        .into_owned();
    *live = replaced;
    count
}

/// Carry the casing pattern of `matched` over to `replacement`.
///
/// All-caps matches upper-case the whole replacement; a capitalized match
/// capitalizes its first character; anything else is used as given.
pub fn match_case(matched: &str, replacement: &str) -> String {
    let mut letters = matched.chars().filter(|c| c.is_alphabetic()).peekable();
    let has_letters = letters.peek().is_some();
    let all_upper = has_letters && letters.all(char::is_uppercase);
    // "I" alone reads as capitalized, not shouted
    let multi_letter = matched.chars().filter(|c| c.is_alphabetic()).nth(1).is_some();

    if all_upper && multi_letter {
        return replacement.to_uppercase();
    }
    if matched.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        return chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        });
    }
    replacement.to_string()
}
