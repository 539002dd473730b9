//! Span annotation data model.
//!
//! Annotations are lint-like findings (misspellings, grammar slips, weak
//! vocabulary, ...) anchored to half-open character ranges over a
//! [`TextBuffer`](crate::TextBuffer). They are derived state: an
//! [`AnnotationSet`] records the buffer version it was computed against and
//! becomes stale (to be discarded wholesale, never patched) the moment the
//! buffer mutates.

use crate::buffer::TextBuffer;

/// Annotation ID type.
pub type AnnotationId = u64;

/// The category of issue an annotation describes.
///
/// Kinds carry a total priority order used as the deterministic tie-break
/// whenever spans of different kinds overlap (sorting, overlay rendering,
/// pointer resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    /// Misspelled word with dictionary corrections.
    Spelling,
    /// Grammar issue (e.g. capitalization of fixed phrases).
    Grammar,
    /// Punctuation spacing/repetition issue.
    Punctuation,
    /// Weak word with stronger ranked alternatives.
    Vocabulary,
    /// Stylistic issue (e.g. word repetition within a window).
    Style,
}

impl AnnotationKind {
    /// Priority rank of this kind; lower ranks win ties.
    ///
    /// Order: `Spelling > Grammar > Punctuation > Vocabulary > Style`.
    pub fn priority(self) -> u8 {
        match self {
            Self::Spelling => 0,
            Self::Grammar => 1,
            Self::Punctuation => 2,
            Self::Vocabulary => 3,
            Self::Style => 4,
        }
    }

    /// All kinds in priority order.
    pub const ALL: [AnnotationKind; 5] = [
        Self::Spelling,
        Self::Grammar,
        Self::Punctuation,
        Self::Vocabulary,
        Self::Style,
    ];
}

/// A half-open character-offset range (`start..end`) in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationRange {
    /// Range start offset (inclusive), in Unicode scalar values (`char`) from the start of the document.
    pub start: usize,
    /// Range end offset (exclusive), in Unicode scalar values (`char`) from the start of the document.
    pub end: usize,
}

impl AnnotationRange {
    /// Create a new annotation range.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the range in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if the range contains a specific position.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if two ranges overlap.
    pub fn overlaps(&self, other: &AnnotationRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A single annotation over the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Identifier, unique within one [`AnnotationSet`].
    pub id: AnnotationId,
    /// Annotated range in character offsets.
    pub range: AnnotationRange,
    /// Issue category.
    pub kind: AnnotationKind,
    /// Explanatory message shown to the writer.
    pub message: String,
    /// Ordered replacement suggestions (best first; may be empty).
    pub suggestions: Vec<String>,
    /// Identifier of the rule that produced this annotation (e.g. `"spelling.recieve"`).
    pub rule_id: String,
}

/// A versioned collection of annotations tied to one buffer version.
///
/// The constructor normalizes its input: annotations are sorted by
/// `(start, priority, id)`, empty ranges are dropped, and same-kind overlaps
/// are resolved by keeping the earlier annotation (different kinds may
/// legitimately overlap the same span).
///
/// Queries use binary search over the sorted vector with a prefix-max-end
/// array for pruning, O(log n + k) per lookup.
#[derive(Debug, Clone)]
pub struct AnnotationSet {
    buffer_version: u64,
    degraded: bool,
    annotations: Vec<Annotation>,
    /// `prefix_max_end[i] = max(annotations[0..=i].range.end)`, for query pruning.
    prefix_max_end: Vec<usize>,
}

impl AnnotationSet {
    /// Build a normalized set from raw annotations computed against `buffer_version`.
    pub fn new(buffer_version: u64, mut annotations: Vec<Annotation>) -> Self {
        annotations.retain(|a| !a.range.is_empty());
        annotations.sort_by_key(|a| (a.range.start, a.kind.priority(), a.id));

        // Same-kind spans must not overlap; keep the earlier annotation.
        let mut last_end_by_kind = [0usize; AnnotationKind::ALL.len()];
        annotations.retain(|a| {
            let slot = &mut last_end_by_kind[a.kind.priority() as usize];
            if a.range.start < *slot {
                return false;
            }
            *slot = a.range.end;
            true
        });

        let mut prefix_max_end = Vec::with_capacity(annotations.len());
        let mut max_end = 0usize;
        for annotation in &annotations {
            max_end = max_end.max(annotation.range.end);
            prefix_max_end.push(max_end);
        }

        Self {
            buffer_version,
            degraded: false,
            annotations,
            prefix_max_end,
        }
    }

    /// An empty set for the given buffer version.
    pub fn empty(buffer_version: u64) -> Self {
        Self::new(buffer_version, Vec::new())
    }

    /// Mark the set as the result of a capped (length-bounded) analysis.
    pub fn with_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    /// The buffer version this set was computed against.
    pub fn buffer_version(&self) -> u64 {
        self.buffer_version
    }

    /// Returns `true` if the producing analysis was capped (partial result).
    pub fn degraded(&self) -> bool {
        self.degraded
    }

    /// Number of annotations in the set.
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Returns `true` if the set contains no annotations.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// All annotations, sorted by `(start, priority, id)`.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Look up an annotation by id.
    pub fn find(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Returns `true` if this set still matches the buffer's version.
    pub fn is_current(&self, buffer: &TextBuffer) -> bool {
        self.buffer_version == buffer.version()
    }

    /// All annotations whose range contains `pos`, in ascending `(start, priority)` order.
    pub fn query_point(&self, pos: usize) -> Vec<&Annotation> {
        self.query_range(pos, pos.saturating_add(1))
    }

    /// All annotations overlapping `[start, end)`, in ascending `(start, priority)` order.
    pub fn query_range(&self, start: usize, end: usize) -> Vec<&Annotation> {
        if self.annotations.is_empty() || start >= end {
            return Vec::new();
        }

        // First index where annotation.start >= end; everything at or after it
        // starts past the query range.
        let idx = self
            .annotations
            .partition_point(|a| a.range.start < end);

        let mut result = Vec::new();
        for i in (0..idx).rev() {
            // If the max end of annotations[0..=i] is <= start, nothing earlier can overlap.
            if self.prefix_max_end[i] <= start {
                break;
            }
            let annotation = &self.annotations[i];
            if annotation.range.start < end && start < annotation.range.end {
                result.push(annotation);
            }
        }

        result.reverse();
        result
    }

    /// The highest-priority annotation covering `pos`, if any.
    ///
    /// Ties are broken by earlier start, then lower id.
    pub fn best_at(&self, pos: usize) -> Option<&Annotation> {
        self.query_point(pos)
            .into_iter()
            .min_by_key(|a| (a.kind.priority(), a.range.start, a.id))
    }

    /// Returns `true` if every annotation fits a document of `char_count`
    /// characters and the set is sorted by start.
    pub fn is_well_formed(&self, char_count: usize) -> bool {
        let in_bounds = self
            .annotations
            .iter()
            .all(|a| a.range.start < a.range.end && a.range.end <= char_count);
        let sorted = self
            .annotations
            .windows(2)
            .all(|w| w[0].range.start <= w[1].range.start);
        in_bounds && sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(id: AnnotationId, start: usize, end: usize, kind: AnnotationKind) -> Annotation {
        Annotation {
            id,
            range: AnnotationRange::new(start, end),
            kind,
            message: format!("annotation {}", id),
            suggestions: Vec::new(),
            rule_id: "test".to_string(),
        }
    }

    #[test]
    fn test_set_sorts_by_start_then_priority() {
        let set = AnnotationSet::new(
            0,
            vec![
                annotation(1, 5, 8, AnnotationKind::Style),
                annotation(2, 0, 3, AnnotationKind::Vocabulary),
                annotation(3, 5, 8, AnnotationKind::Spelling),
            ],
        );

        let ids: Vec<AnnotationId> = set.annotations().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(set.is_well_formed(10));
    }

    #[test]
    fn test_same_kind_overlap_keeps_earlier() {
        let set = AnnotationSet::new(
            0,
            vec![
                annotation(1, 0, 5, AnnotationKind::Spelling),
                annotation(2, 3, 8, AnnotationKind::Spelling),
                annotation(3, 5, 8, AnnotationKind::Spelling),
            ],
        );

        let ids: Vec<AnnotationId> = set.annotations().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_cross_kind_overlap_is_kept() {
        let set = AnnotationSet::new(
            0,
            vec![
                annotation(1, 0, 5, AnnotationKind::Spelling),
                annotation(2, 2, 7, AnnotationKind::Style),
            ],
        );
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_empty_ranges_are_dropped() {
        let set = AnnotationSet::new(0, vec![annotation(1, 3, 3, AnnotationKind::Grammar)]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_query_point_and_range() {
        let set = AnnotationSet::new(
            0,
            vec![
                annotation(1, 0, 4, AnnotationKind::Spelling),
                annotation(2, 2, 6, AnnotationKind::Style),
                annotation(3, 10, 12, AnnotationKind::Vocabulary),
            ],
        );

        let at_3: Vec<AnnotationId> = set.query_point(3).iter().map(|a| a.id).collect();
        assert_eq!(at_3, vec![1, 2]);

        assert!(set.query_point(8).is_empty());

        let in_range: Vec<AnnotationId> = set.query_range(5, 11).iter().map(|a| a.id).collect();
        assert_eq!(in_range, vec![2, 3]);
    }

    #[test]
    fn test_best_at_prefers_priority() {
        let set = AnnotationSet::new(
            0,
            vec![
                annotation(1, 0, 6, AnnotationKind::Style),
                annotation(2, 2, 5, AnnotationKind::Spelling),
            ],
        );

        assert_eq!(set.best_at(3).map(|a| a.id), Some(2));
        assert_eq!(set.best_at(1).map(|a| a.id), Some(1));
        assert_eq!(set.best_at(6), None);
    }

    #[test]
    fn test_is_current_tracks_buffer_version() {
        let mut buffer = TextBuffer::new("hello");
        let set = AnnotationSet::empty(buffer.version());
        assert!(set.is_current(&buffer));

        buffer.insert(0, "x");
        assert!(!set.is_current(&buffer));
    }
}
