// Keyword extraction.
//
// A keyword is a lowercase token of ASCII letters, at least `min_len` long,
// that fills an entire word. Tokens glued to digits, underscores or accented
// letters are not keywords: "clouds2" and "café" yield nothing.

use std::collections::{BTreeSet, HashSet};

use stop_words::{get, LANGUAGE};

use super::is_word_char;

/// Set of lowercase keyword tokens. Ordered only so output is deterministic.
pub type KeywordSet = BTreeSet<String>;

/// Minimum keyword length used when nothing else is configured.
pub const DEFAULT_MIN_KEYWORD_LEN: usize = 5;

/// Configurable keyword extractor.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    /// Shortest token (in ASCII letters) that counts as a keyword
    pub min_len: usize,
    /// Tokens to drop even when they qualify (e.g. English stop words)
    pub stop_words: Option<HashSet<String>>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_KEYWORD_LEN,
            stop_words: None,
        }
    }
}

impl KeywordExtractor {
    /// Extractor that also drops English stop words ("about", "there", ...).
    pub fn with_english_stop_words() -> Self {
        let words: Vec<String> = get(LANGUAGE::English);
        Self {
            stop_words: Some(words.into_iter().map(|w| w.to_lowercase()).collect()),
            ..Self::default()
        }
    }

    /// Extract the distinct keywords of `text`.
    pub fn extract(&self, text: &str) -> KeywordSet {
        let lower = text.to_lowercase();
        lower
            .split(|c: char| !is_word_char(c))
            .filter(|token| token.len() >= self.min_len.max(1))
            .filter(|token| token.bytes().all(|b| b.is_ascii_alphabetic()))
            .filter(|token| {
                self.stop_words
                    .as_ref()
                    .is_none_or(|stop| !stop.contains(*token))
            })
            .map(str::to_string)
            .collect()
    }
}

/// Extract keywords with the default settings (length >= 5, no stop words).
pub fn extract_keywords(text: &str) -> KeywordSet {
    KeywordExtractor::default().extract(text)
}

/// Intersection of all keyword sets. No sets at all gives an empty set.
pub fn common_keywords<'a, I>(sets: I) -> KeywordSet
where
    I: IntoIterator<Item = &'a KeywordSet>,
{
    let mut iter = sets.into_iter();
    let Some(first) = iter.next() else {
        return KeywordSet::new();
    };
    let mut common = first.clone();
    for set in iter {
        common.retain(|kw| set.contains(kw));
        if common.is_empty() {
            break;
        }
    }
    common
}
