//! Small text helpers shared across the engine.
//!
//! All public offsets in this crate are **character offsets** (Unicode scalar
//! values); these helpers do the char<->byte bookkeeping in one place.

use unicode_segmentation::UnicodeSegmentation;

/// Count the words in `text` using Unicode word segmentation (UAX #29).
///
/// Punctuation-only tokens do not count as words.
pub fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}

pub(crate) fn split_lines_preserve_trailing(text: &str) -> Vec<String> {
    // `str::split('\n')` preserves trailing empty segments, which matches typical editor
    // line semantics (N newlines => N+1 lines), and keeps behavior consistent with Rope.
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[derive(Debug)]
pub(crate) struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte
            .get(clamped)
            .cloned()
            .unwrap_or(self.text_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_ignores_punctuation() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("Hello, world!"), 2);
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count("... !!"), 0);
    }

    #[test]
    fn test_split_lines_preserves_trailing_empty_line() {
        assert_eq!(split_lines_preserve_trailing("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split_lines_preserve_trailing(""), vec![""]);
        assert_eq!(split_lines_preserve_trailing("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_char_index_multibyte() {
        let index = CharIndex::new("a你b");
        assert_eq!(index.char_count(), 3);
        assert_eq!(index.char_to_byte(0), 0);
        assert_eq!(index.char_to_byte(1), 1);
        assert_eq!(index.char_to_byte(2), 4);
        assert_eq!(index.char_to_byte(3), 5);
        // Out-of-range offsets clamp to the end of text.
        assert_eq!(index.char_to_byte(10), 5);
    }
}
