// Keyword extraction and shared-keyword highlighting.

pub mod extract;
pub mod highlight;

pub use extract::{common_keywords, extract_keywords, KeywordExtractor, KeywordSet};
pub use highlight::{highlight_keywords, Highlighter, Marker};

/// Word characters for boundary purposes: Unicode alphanumerics and `_`.
///
/// A keyword occurrence only counts when the characters on either side of it
/// are not word characters (or are the start/end of the text).
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
