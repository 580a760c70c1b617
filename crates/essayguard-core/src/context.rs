//! Context classification for replacement selection.
//!
//! Looks at the words around a flagged phrase and sorts them into a tone
//! bucket, which the catalog uses to pick an apt replacement. The lists are
//! small and flat on purpose; this is a coarse heuristic, not a model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::text;

/// Characters of context taken on each side of the phrase.
pub const WINDOW_CHARS: usize = 30;

/// Word stems that signal negative sentiment.
const NEGATIVE_STEMS: &[&str] = &[
    "bad", "problem", "challeng", "issue", "difficult", "struggl", "fail", "declin", "harm",
    "crisis", "loss", "risk", "threat", "poor", "worse",
];

/// Word stems that signal positive sentiment.
const POSITIVE_STEMS: &[&str] = &[
    "good", "success", "achiev", "gain", "improv", "growth", "benefit", "great", "progress",
    "win", "strong", "best",
];

/// Word stems that signal a formal or academic register.
const FORMAL_STEMS: &[&str] = &[
    "demonstrat",
    "methodolog",
    "framework",
    "analys",
    "implement",
    "comprehensive",
    "therefore",
    "research",
    "significan",
    "hypothes",
    "furthermore",
    "moreover",
];

/// Word stems that signal a business register.
const BUSINESS_STEMS: &[&str] = &[
    "business",
    "market",
    "compan",
    "customer",
    "revenue",
    "profit",
    "stakeholder",
    "client",
    "brand",
    "invest",
];

/// First and second person pronouns that mark casual writing.
const CASUAL_WORDS: &[&str] = &["i", "me", "my", "we", "our", "us", "you", "your"];

/// Tone/register bucket for a phrase in context.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ContextBucket {
    /// Formal register with negative sentiment.
    FormalNegative,
    /// Formal register with positive sentiment.
    FormalPositive,
    /// Formal register, neutral sentiment.
    Formal,
    /// Business register.
    Business,
    /// Casual register with negative sentiment.
    CasualNegative,
    /// Casual register with positive sentiment.
    CasualPositive,
    /// Casual register, neutral sentiment.
    Casual,
    /// No register or sentiment markers.
    General,
}

impl ContextBucket {
    /// Returns the bucket name as used in configuration and reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FormalNegative => "formal_negative",
            Self::FormalPositive => "formal_positive",
            Self::Formal => "formal",
            Self::Business => "business",
            Self::CasualNegative => "casual_negative",
            Self::CasualPositive => "casual_positive",
            Self::Casual => "casual",
            Self::General => "general",
        }
    }

    /// The next, less specific bucket to try when this one has no entries.
    ///
    /// Sentiment variants fall back to their register, registers fall back
    /// to `general`, and `general` is the end of the chain.
    pub const fn parent(&self) -> Option<Self> {
        match self {
            Self::FormalNegative | Self::FormalPositive | Self::Business => Some(Self::Formal),
            Self::CasualNegative | Self::CasualPositive => Some(Self::Casual),
            Self::Formal | Self::Casual => Some(Self::General),
            Self::General => None,
        }
    }
}

impl std::fmt::Display for ContextBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the context around the first occurrence of `phrase` in
/// `surrounding`.
///
/// The window is the enclosing sentence, narrowed to [`WINDOW_CHARS`] on
/// each side of the phrase. The phrase itself is left out so a trigger
/// word never classifies its own context.
///
/// Precedence: formal signals win, then business, then casual; sentiment
/// refines formal and casual. Sentiment with no register marker reads as
/// casual. With no markers at all the bucket is `general`.
pub fn classify(phrase: &str, surrounding: &str) -> ContextBucket {
    let Some((start, end)) = text::find_phrase(surrounding, phrase) else {
        return ContextBucket::General;
    };

    let (sentence_start, sentence_end) = text::enclosing_sentence(surrounding, start);
    let window_start = text::step_back(surrounding, start, WINDOW_CHARS).max(sentence_start);
    let window_end = text::step_forward(surrounding, end, WINDOW_CHARS).min(sentence_end.max(end));

    let before = &surrounding[window_start..start];
    let after = &surrounding[end..window_end];
    let mut words = text::extract_words(before);
    words.extend(text::extract_words(after));

    classify_words(&words)
}

fn classify_words(words: &[String]) -> ContextBucket {
    let has = |stems: &[&str]| {
        words
            .iter()
            .any(|w| stems.iter().any(|stem| w.starts_with(stem)))
    };

    let negative = has(NEGATIVE_STEMS);
    let positive = has(POSITIVE_STEMS);
    let formal = has(FORMAL_STEMS);
    let business = has(BUSINESS_STEMS);
    let casual = words
        .iter()
        .any(|w| CASUAL_WORDS.contains(&w.as_str()) || w.contains('\''));

    if formal {
        return if negative {
            ContextBucket::FormalNegative
        } else if positive {
            ContextBucket::FormalPositive
        } else {
            ContextBucket::Formal
        };
    }

    if business {
        return ContextBucket::Business;
    }

    if casual || negative || positive {
        return if negative {
            ContextBucket::CasualNegative
        } else if positive {
            ContextBucket::CasualPositive
        } else {
            ContextBucket::Casual
        };
    }

    ContextBucket::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_markers_is_general() {
        let text = "The tool can utilize the data in the file.";
        assert_eq!(classify("utilize", text), ContextBucket::General);
    }

    #[test]
    fn missing_phrase_is_general() {
        assert_eq!(
            classify("leverage", "Nothing relevant here."),
            ContextBucket::General
        );
    }

    #[test]
    fn formal_beats_sentiment() {
        let text = "The methodology shows an unprecedented failure of the framework.";
        assert_eq!(classify("unprecedented", text), ContextBucket::FormalNegative);

        let text = "The analysis found unprecedented growth.";
        assert_eq!(classify("unprecedented", text), ContextBucket::FormalPositive);
    }

    #[test]
    fn pronouns_and_contractions_read_casual() {
        assert_eq!(
            classify("leverage", "We can leverage this for the club."),
            ContextBucket::Casual
        );
        assert_eq!(
            classify("leverage", "Don't leverage that one."),
            ContextBucket::Casual
        );
    }

    #[test]
    fn business_register() {
        let text = "The company will leverage its brand.";
        assert_eq!(classify("leverage", text), ContextBucket::Business);
    }

    #[test]
    fn window_stays_inside_sentence() {
        let text = "Our research failed badly. This was unprecedented in size.";
        assert_eq!(classify("unprecedented", text), ContextBucket::General);
    }

    #[test]
    fn phrase_does_not_classify_itself() {
        let text = "They implement the plan.";
        assert_eq!(classify("implement", text), ContextBucket::General);
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "I think we had an unprecedented problem at school.";
        let first = classify("unprecedented", text);
        for _ in 0..5 {
            assert_eq!(classify("unprecedented", text), first);
        }
        assert_eq!(first, ContextBucket::CasualNegative);
    }

    #[test]
    fn parent_chain_ends_at_general() {
        let mut bucket = ContextBucket::FormalNegative;
        let mut chain = vec![bucket];
        while let Some(next) = bucket.parent() {
            chain.push(next);
            bucket = next;
        }
        assert_eq!(
            chain,
            vec![
                ContextBucket::FormalNegative,
                ContextBucket::Formal,
                ContextBucket::General
            ]
        );
    }
}
