//! Versioned text buffer.
//!
//! [`TextBuffer`] owns the document text and is the only mutable text state in
//! the engine. Every mutation goes through [`TextBuffer::splice`], which bumps
//! the version counter and returns a structured [`SpliceRecord`]. Derived state
//! (annotation sets, overlays) records the version it was computed against and
//! must be discarded when the versions no longer match.
//!
//! All offsets are character offsets (Unicode scalar values); ranges are
//! half-open `[start, end)`.

use crate::text::word_count;
use ropey::Rope;

/// A structured description of a single buffer mutation.
///
/// `start` is a character offset in the document at the time the splice was
/// applied. The deleted range is defined by the length (in `char`s) of
/// `deleted_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceRecord {
    /// Start character offset of the splice.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
    /// Buffer version before the splice.
    pub old_version: u64,
    /// Buffer version after the splice.
    pub new_version: u64,
}

impl SpliceRecord {
    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end character offset of the deleted range in the pre-splice document.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }
}

/// The engine's text buffer: rope-backed storage plus a version counter.
///
/// The version starts at 0 and increments on every mutation, including
/// no-op-looking splices that replace a range with identical text (callers
/// that care should compare texts first).
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    version: u64,
}

impl TextBuffer {
    /// Create a buffer from initial text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            version: 0,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Current buffer version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total character count.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the buffer contains no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total line count (an empty document has one empty line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Word count of the whole document (UAX #29 word segmentation).
    pub fn word_count(&self) -> usize {
        word_count(&self.text())
    }

    /// Text of the given line, without the trailing line break.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let text: String = self.rope.line(line).chars().collect();
        let text = text.strip_suffix('\n').unwrap_or(&text);
        let text = text.strip_suffix('\r').unwrap_or(text);
        Some(text.to_string())
    }

    /// Character offset of the start of the given line (clamped to the last line).
    pub fn line_to_char(&self, line: usize) -> usize {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line)
    }

    /// Line index containing the given character offset (clamped to the document).
    pub fn char_to_line(&self, char_offset: usize) -> usize {
        let offset = char_offset.min(self.rope.len_chars());
        self.rope.char_to_line(offset)
    }

    /// Extract the text of the half-open character range `[start, end)`.
    ///
    /// Offsets are clamped to the document.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let len = self.rope.len_chars();
        let start = start.min(len);
        let end = end.min(len).max(start);
        self.rope.slice(start..end).to_string()
    }

    /// Replace the half-open character range `[start, end)` with `replacement`.
    ///
    /// Offsets are clamped to the document; the version is incremented and a
    /// [`SpliceRecord`] describing the exact change is returned. This is an
    /// atomic read-modify-write: readers never observe a partial state.
    pub fn splice(&mut self, start: usize, end: usize, replacement: &str) -> SpliceRecord {
        let len = self.rope.len_chars();
        let start = start.min(len);
        let end = end.min(len).max(start);

        let deleted_text = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.rope.insert(start, replacement);

        let old_version = self.version;
        self.version += 1;

        SpliceRecord {
            start,
            deleted_text,
            inserted_text: replacement.to_string(),
            old_version,
            new_version: self.version,
        }
    }

    /// Insert `text` at `offset` (clamped to the document).
    pub fn insert(&mut self, offset: usize, text: &str) -> SpliceRecord {
        self.splice(offset, offset, text)
    }

    /// Delete the half-open character range `[start, end)`.
    pub fn delete(&mut self, start: usize, end: usize) -> SpliceRecord {
        self.splice(start, end, "")
    }
}
