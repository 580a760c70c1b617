//! Text processing utilities.
//!
//! Provides sentence splitting, word extraction, and contraction counting
//! for use by the detector, classifier, and score aggregator.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// A run of text ending in `.`, `!` or `?`.
static SENTENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]+[.!?]+").expect("valid regex"));

/// Apostrophe contractions: don't, it's, we'll, I'm, they've, I'd.
static CONTRACTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z]+(?:n't|'s|'re|'ll|'m|'ve|'d)\b").expect("valid regex")
});

/// A sentence located in its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    /// Sentence number (1-indexed).
    pub index: usize,
    /// Trimmed sentence text.
    pub text: String,
    /// Byte offset of the untrimmed run in the source text.
    pub start: usize,
    /// Byte offset one past the end of the run.
    pub end: usize,
}

impl Sentence {
    /// Number of words in the sentence.
    pub fn word_count(&self) -> usize {
        extract_words(&self.text).len()
    }
}

/// Split text into located sentences.
///
/// A sentence is a run of characters ending in one or more terminators.
/// Trailing text without a terminator counts as a final sentence, so a
/// single unpunctuated line still yields one sentence.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn locate_sentences(text: &str) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut consumed = 0;

    for m in SENTENCE_PATTERN.find_iter(text) {
        push_sentence(&mut sentences, text, m.start(), m.end());
        consumed = m.end();
    }

    if consumed < text.len() {
        push_sentence(&mut sentences, text, consumed, text.len());
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<Sentence>, text: &str, start: usize, end: usize) {
    let trimmed = text[start..end].trim();
    if trimmed.is_empty() || !trimmed.chars().any(char::is_alphanumeric) {
        return;
    }
    sentences.push(Sentence {
        index: sentences.len() + 1,
        text: trimmed.to_string(),
        start,
        end,
    });
}

/// Split text into trimmed sentence strings.
pub fn split_sentences(text: &str) -> Vec<String> {
    locate_sentences(text).into_iter().map(|s| s.text).collect()
}

/// Extract words from text, splitting on whitespace and stripping punctuation.
pub fn extract_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Count apostrophe contractions ("don't", "it's", "we'll").
pub fn count_contractions(text: &str) -> usize {
    let normalized = text.replace('\u{2019}', "'");
    CONTRACTION_PATTERN.find_iter(&normalized).count()
}

/// Find the byte range of the sentence that contains `pos`.
pub fn enclosing_sentence(text: &str, pos: usize) -> (usize, usize) {
    let start = text[..pos]
        .rfind(['.', '!', '?'])
        .map_or(0, |i| i + 1);
    let end = text[pos..]
        .find(['.', '!', '?'])
        .map_or(text.len(), |i| pos + i + 1);
    (start, end)
}

/// Returns `true` if `phrase` is a single alphabetic token.
pub fn is_single_word(phrase: &str) -> bool {
    !phrase.is_empty() && phrase.chars().all(char::is_alphabetic)
}

/// Build a case-insensitive matcher for a literal phrase.
///
/// Single alphabetic tokens match whole words only; anything else matches
/// as a plain substring. Returns `None` for blank phrases.
pub fn phrase_matcher(phrase: &str) -> Option<Regex> {
    if phrase.trim().is_empty() {
        return None;
    }
    let escaped = regex::escape(phrase);
    let pattern = if is_single_word(phrase) {
        format!(r"\b{escaped}\b")
    } else {
        escaped
    };
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(phrase, error = %e, "cannot build phrase matcher");
            None
        }
    }
}

/// Byte range of the first case-insensitive occurrence of `phrase`.
pub fn find_phrase(text: &str, phrase: &str) -> Option<(usize, usize)> {
    phrase_matcher(phrase)?
        .find(text)
        .map(|m| (m.start(), m.end()))
}

/// Byte offset `n` characters before `pos` (clamped to the start).
pub fn step_back(text: &str, pos: usize, n: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .take(n)
        .last()
        .map_or(pos, |(i, _)| i)
}

/// Byte offset `n` characters after `pos` (clamped to the end).
pub fn step_forward(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| pos + i)
}
