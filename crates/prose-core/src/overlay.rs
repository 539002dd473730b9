//! Overlay rendering (highlight layer).
//!
//! The overlay is a visual layer kept in exact alignment with an editable text
//! surface: [`render`] produces an ordered span stream that covers the whole
//! document with no gaps and no overlaps, so a renderer can draw it
//! character-for-character over the surface. Concatenating the span texts
//! reconstructs the input exactly; newlines are carried through and exposed as
//! explicit line breaks by [`OverlayDocument::lines`], never collapsed.
//!
//! Where annotations of different kinds overlap, the highest-priority kind
//! wins deterministically (see [`AnnotationKind::priority`]).

use crate::annotations::{AnnotationId, AnnotationKind, AnnotationSet};
use crate::text::CharIndex;

/// Per-kind visibility toggles for the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityFlags {
    /// Show spelling annotations.
    pub spelling: bool,
    /// Show grammar annotations.
    pub grammar: bool,
    /// Show punctuation annotations.
    pub punctuation: bool,
    /// Show vocabulary annotations.
    pub vocabulary: bool,
    /// Show style annotations.
    pub style: bool,
}

impl VisibilityFlags {
    /// All kinds visible.
    pub fn all() -> Self {
        Self {
            spelling: true,
            grammar: true,
            punctuation: true,
            vocabulary: true,
            style: true,
        }
    }

    /// All kinds hidden.
    pub fn none() -> Self {
        Self {
            spelling: false,
            grammar: false,
            punctuation: false,
            vocabulary: false,
            style: false,
        }
    }

    /// Returns `true` if annotations of `kind` should be shown.
    pub fn allows(&self, kind: AnnotationKind) -> bool {
        match kind {
            AnnotationKind::Spelling => self.spelling,
            AnnotationKind::Grammar => self.grammar,
            AnnotationKind::Punctuation => self.punctuation,
            AnnotationKind::Vocabulary => self.vocabulary,
            AnnotationKind::Style => self.style,
        }
    }

    /// Set visibility for one kind.
    pub fn set(&mut self, kind: AnnotationKind, visible: bool) {
        match kind {
            AnnotationKind::Spelling => self.spelling = visible,
            AnnotationKind::Grammar => self.grammar = visible,
            AnnotationKind::Punctuation => self.punctuation = visible,
            AnnotationKind::Vocabulary => self.vocabulary = visible,
            AnnotationKind::Style => self.style = visible,
        }
    }
}

impl Default for VisibilityFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// The highlight applied to an [`OverlaySpan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayHighlight {
    /// The winning annotation's id.
    pub annotation_id: AnnotationId,
    /// The winning annotation's kind (what to style the span as).
    pub kind: AnnotationKind,
}

/// One contiguous run of the document with a uniform highlight state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySpan {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// The exact text of `[start, end)` (may contain newlines).
    pub text: String,
    /// Highlight to apply, or `None` for plain text.
    pub highlight: Option<OverlayHighlight>,
}

/// One visual line of the overlay; the terminating newline is implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLine {
    /// Segments of this line, in order. An empty list is an empty line.
    pub segments: Vec<OverlaySpan>,
}

/// The rendered overlay: an ordered, gapless, non-overlapping span stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDocument {
    /// Spans in document order, covering `[0, char_count)` exactly.
    pub spans: Vec<OverlaySpan>,
}

impl OverlayDocument {
    /// Reconstruct the document text by concatenating all span texts.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Split the span stream at newlines into per-line segment lists.
    ///
    /// N newlines produce N+1 lines; a trailing newline yields a final empty
    /// line, matching editor line semantics.
    pub fn lines(&self) -> Vec<OverlayLine> {
        let mut lines = Vec::new();
        let mut current = OverlayLine {
            segments: Vec::new(),
        };

        for span in &self.spans {
            let mut cursor = span.start;
            let mut piece = String::new();

            for ch in span.text.chars() {
                if ch == '\n' {
                    if !piece.is_empty() {
                        let piece_len = piece.chars().count();
                        current.segments.push(OverlaySpan {
                            start: cursor,
                            end: cursor + piece_len,
                            text: std::mem::take(&mut piece),
                            highlight: span.highlight,
                        });
                        cursor += piece_len;
                    }
                    lines.push(std::mem::replace(
                        &mut current,
                        OverlayLine {
                            segments: Vec::new(),
                        },
                    ));
                    cursor += 1;
                } else {
                    piece.push(ch);
                }
            }

            if !piece.is_empty() {
                let piece_len = piece.chars().count();
                current.segments.push(OverlaySpan {
                    start: cursor,
                    end: cursor + piece_len,
                    text: piece,
                    highlight: span.highlight,
                });
            }
        }

        lines.push(current);
        lines
    }
}

/// Render `text` with `set`'s annotations into a gapless highlight span stream.
///
/// `set` is taken as given; callers are responsible for passing a set that is
/// current for `text` (the state manager discards stale sets before rendering).
/// Annotation ranges are clamped to the document, hidden kinds are skipped,
/// and adjacent spans with identical highlight state are merged.
pub fn render(text: &str, set: &AnnotationSet, visibility: VisibilityFlags) -> OverlayDocument {
    let index = CharIndex::new(text);
    let char_count = index.char_count();

    if char_count == 0 {
        return OverlayDocument { spans: Vec::new() };
    }

    struct Candidate {
        start: usize,
        end: usize,
        priority: u8,
        id: AnnotationId,
        kind: AnnotationKind,
    }

    let candidates: Vec<Candidate> = set
        .annotations()
        .iter()
        .filter(|a| visibility.allows(a.kind))
        .filter_map(|a| {
            let start = a.range.start.min(char_count);
            let end = a.range.end.min(char_count);
            (start < end).then_some(Candidate {
                start,
                end,
                priority: a.kind.priority(),
                id: a.id,
                kind: a.kind,
            })
        })
        .collect();

    let mut boundaries: Vec<usize> = vec![0, char_count];
    for c in &candidates {
        boundaries.push(c.start);
        boundaries.push(c.end);
    }
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut spans: Vec<OverlaySpan> = Vec::new();
    for pair in boundaries.windows(2) {
        let (seg_start, seg_end) = (pair[0], pair[1]);

        let highlight = candidates
            .iter()
            .filter(|c| c.start <= seg_start && seg_end <= c.end)
            .min_by_key(|c| (c.priority, c.start, c.id))
            .map(|c| OverlayHighlight {
                annotation_id: c.id,
                kind: c.kind,
            });

        let seg_text =
            text[index.char_to_byte(seg_start)..index.char_to_byte(seg_end)].to_string();

        match spans.last_mut() {
            Some(last) if last.highlight == highlight && last.end == seg_start => {
                last.end = seg_end;
                last.text.push_str(&seg_text);
            }
            _ => spans.push(OverlaySpan {
                start: seg_start,
                end: seg_end,
                text: seg_text,
                highlight,
            }),
        }
    }

    OverlayDocument { spans }
}
