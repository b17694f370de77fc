// Shared-keyword highlighting.
//
// All keywords are compiled into a single case-insensitive alternation,
// longest first (ties broken lexicographically). The leftmost-first semantics
// of the alternation then guarantee a longer keyword wins over a shorter one
// starting at the same position, and the text is scanned once, so markers that
// were already inserted can never be matched again.
//
// Matches are anchored with Unicode `\b` and compared with Unicode case
// folding, so "cloud" stays unmarked inside "cloudé" and "kernel" matches a
// text spelled with the Kelvin sign.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use regex::Regex;

/// Opening and closing strings wrapped around each highlighted keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub open: String,
    pub close: String,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            open: "<mark>".to_string(),
            close: "</mark>".to_string(),
        }
    }
}

impl Marker {
    /// Split marked text into `(highlighted, segment)` pairs.
    ///
    /// An opening marker without a matching close highlights the rest of the
    /// text. Empty segments are skipped.
    pub fn segments<'a>(&self, text: &'a str) -> Vec<(bool, &'a str)> {
        let mut segments = Vec::new();
        if self.open.is_empty() || self.close.is_empty() {
            if !text.is_empty() {
                segments.push((false, text));
            }
            return segments;
        }
        let mut rest = text;

        while let Some(open_at) = rest.find(&self.open) {
            if open_at > 0 {
                segments.push((false, &rest[..open_at]));
            }
            let inner = &rest[open_at + self.open.len()..];
            match inner.find(&self.close) {
                Some(close_at) => {
                    if close_at > 0 {
                        segments.push((true, &inner[..close_at]));
                    }
                    rest = &inner[close_at + self.close.len()..];
                }
                None => {
                    if !inner.is_empty() {
                        segments.push((true, inner));
                    }
                    rest = "";
                }
            }
        }

        if !rest.is_empty() {
            segments.push((false, rest));
        }
        segments
    }

    /// Remove every marker, recovering the unannotated text.
    pub fn strip(&self, text: &str) -> String {
        self.segments(text).into_iter().map(|(_, s)| s).collect()
    }
}

/// A compiled keyword highlighter, reusable across many texts.
#[derive(Debug, Clone)]
pub struct Highlighter {
    /// `None` when there are no keywords; highlighting is then a no-op
    pattern: Option<Regex>,
    keywords: Vec<String>,
    marker: Marker,
}

impl Highlighter {
    /// Compile a highlighter for `keywords`.
    ///
    /// Keywords are lowercased and deduplicated; empty strings are ignored.
    /// Regex metacharacters in keywords are escaped.
    pub fn new<I, S>(keywords: I, marker: Marker) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = keywords
            .into_iter()
            .map(|kw| kw.as_ref().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();

        let mut ordered: Vec<String> = unique.into_iter().collect();
        // BTreeSet iteration is already lexicographic; a stable sort by
        // descending length keeps that order among equal lengths.
        ordered.sort_by_key(|kw| Reverse(kw.chars().count()));

        let pattern = if ordered.is_empty() {
            None
        } else {
            let alternation = ordered
                .iter()
                .map(|kw| regex::escape(kw))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))?)
        };

        Ok(Self {
            pattern,
            keywords: ordered,
            marker,
        })
    }

    /// Keywords in matching order (longest first, then lexicographic).
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Wrap every whole-word keyword occurrence in `text` with the marker.
    ///
    /// The matched text keeps its original casing.
    pub fn highlight(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return text.to_string();
        };

        let mut out = String::with_capacity(text.len());
        let mut copied = 0;
        for m in pattern.find_iter(text) {
            out.push_str(&text[copied..m.start()]);
            out.push_str(&self.marker.open);
            out.push_str(m.as_str());
            out.push_str(&self.marker.close);
            copied = m.end();
        }
        out.push_str(&text[copied..]);
        out
    }
}

/// Highlight `keywords` in `text` with the default `<mark>` marker.
///
/// An empty keyword set returns the text unchanged.
pub fn highlight_keywords<I, S>(text: &str, keywords: I) -> Result<String, regex::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Highlighter::new(keywords, Marker::default())?.highlight(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_preserves_case() {
        let out = highlight_keywords("Cloud computing trends", ["cloud", "computing", "trends"])
            .unwrap();
        assert_eq!(
            out,
            "<mark>Cloud</mark> <mark>computing</mark> <mark>trends</mark>"
        );
    }

    #[test]
    fn test_highlight_whole_words_only() {
        let out = highlight_keywords("The clouded sky had one cloud.", ["cloud"]).unwrap();
        assert_eq!(out, "The clouded sky had one <mark>cloud</mark>.");
    }

    #[test]
    fn test_highlight_non_ascii_neighbor_is_not_boundary() {
        let out = highlight_keywords("cloudé cloud", ["cloud"]).unwrap();
        assert_eq!(out, "cloudé <mark>cloud</mark>");
    }

    #[test]
    fn test_highlight_empty_keywords_is_noop() {
        let none: [&str; 0] = [];
        let text = "Nothing <b>to</b> see here.";
        assert_eq!(highlight_keywords(text, none).unwrap(), text);
        assert_eq!(highlight_keywords(text, [""]).unwrap(), text);
    }

    #[test]
    fn test_highlight_escapes_metacharacters() {
        let out = highlight_keywords("use c++ or (maybe) a.b", ["c++", "(maybe)", "a.b"]).unwrap();
        // `\b` needs a word character on one side, so keywords that start or
        // end with punctuation do not match between spaces.
        assert_eq!(out, "use c++ or (maybe) <mark>a.b</mark>");
        // The dot is literal, not a wildcard
        let out = highlight_keywords("axb", ["a.b"]).unwrap();
        assert_eq!(out, "axb");
    }

    #[test]
    fn test_highlight_folds_unicode_case() {
        // U+212A KELVIN SIGN lowercases to ASCII 'k'
        let text = "\u{212A}ernel panic";
        let keywords = crate::keywords::extract_keywords(text);
        assert_eq!(
            keywords.iter().map(String::as_str).collect::<Vec<_>>(),
            ["kernel", "panic"]
        );
        let out = highlight_keywords(text, &keywords).unwrap();
        assert_eq!(out, "<mark>\u{212A}ernel</mark> <mark>panic</mark>");
    }

    #[test]
    fn test_keyword_order_longest_then_lexicographic() {
        let hl = Highlighter::new(["zebra", "apple", "computing", "CLOUD"], Marker::default())
            .unwrap();
        assert_eq!(hl.keywords(), ["computing", "apple", "cloud", "zebra"]);
    }

    #[test]
    fn test_markers_are_not_rematched() {
        let marker = Marker {
            open: "[mark]".to_string(),
            close: "[/mark]".to_string(),
        };
        let hl = Highlighter::new(["mark", "spark"], marker.clone()).unwrap();
        let out = hl.highlight("spark mark");
        assert_eq!(out, "[mark]spark[/mark] [mark]mark[/mark]");
        assert_eq!(marker.strip(&out), "spark mark");
    }

    #[test]
    fn test_segments_unterminated() {
        let marker = Marker::default();
        let segs = marker.segments("a <mark>b</mark> <mark>c");
        assert_eq!(
            segs,
            vec![(false, "a "), (true, "b"), (false, " "), (true, "c")]
        );
    }
}
