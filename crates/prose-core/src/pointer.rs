//! Pointer resolution: mapping a pointer position to the annotation under it.
//!
//! Coordinate-to-offset mapping is approximate whenever simplified geometry is
//! in play (see [`crate::measure`]), so resolution tolerates small errors: an
//! exact cover wins, otherwise the nearest visible annotation within a small
//! column tolerance is chosen. A hit carries everything the host needs to open
//! a suggestion popup, with the anchor clamped to the visible container.

use crate::annotations::{Annotation, AnnotationSet};
use crate::measure::TextMeasure;
use crate::overlay::VisibilityFlags;
use crate::text::{CharIndex, split_lines_preserve_trailing};

/// A pointer position in measure units: `x` horizontal, `y` visual row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerPoint {
    /// Horizontal position (cells for monospace measurement).
    pub x: usize,
    /// Visual row (line index).
    pub y: usize,
}

impl PointerPoint {
    /// Create a pointer point.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Resolution options: hit tolerance and the container the popup anchors into.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Maximum distance (in character columns) between the pointer's implied
    /// offset and an annotation's nearest edge for a near-miss to resolve.
    pub tolerance: usize,
    /// Container width in measure units; popup anchors are clamped to it.
    pub container_width: usize,
    /// Container height in visual rows; popup anchors are clamped to it.
    pub container_height: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            tolerance: 2,
            container_width: 80,
            container_height: 24,
        }
    }
}

/// Where the host should place the suggestion popup, clamped to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupAnchor {
    /// Horizontal anchor position.
    pub x: usize,
    /// Vertical anchor row (the row below the annotated line when it fits).
    pub y: usize,
}

/// A successful pointer resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerHit {
    /// The resolved annotation.
    pub annotation: Annotation,
    /// The original text covered by the annotation's span.
    pub span_text: String,
    /// Popup anchor, clamped to the container bounds.
    pub anchor: PopupAnchor,
}

/// Map `point` to the character offset it implies in `text`.
///
/// Rows past the last line clamp to the last line; x positions clamp to the
/// line end. Returns the offset plus the clamped line index.
fn offset_for_point(
    text: &str,
    measure: &dyn TextMeasure,
    point: PointerPoint,
) -> (usize, usize) {
    let lines = split_lines_preserve_trailing(text);
    let line_idx = point.y.min(lines.len().saturating_sub(1));

    // Char offset of the line start: lengths of prior lines plus their newlines.
    let line_start: usize = lines[..line_idx]
        .iter()
        .map(|l| l.chars().count() + 1)
        .sum();

    let column = measure.x_to_column(&lines[line_idx], point.x);
    (line_start + column, line_idx)
}

/// Resolve `point` to the annotation under (or nearest to) it.
///
/// Resolution order:
/// 1. the highest-priority visible annotation whose `[start, end)` contains
///    the implied offset;
/// 2. otherwise the visible annotation whose nearest edge is within
///    `options.tolerance` characters, preferring smaller distance, then
///    priority, then earlier start, then lower id;
/// 3. otherwise `None`.
///
/// Kinds hidden by `visibility` never resolve.
pub fn resolve(
    text: &str,
    set: &AnnotationSet,
    visibility: VisibilityFlags,
    measure: &dyn TextMeasure,
    point: PointerPoint,
    options: ResolveOptions,
) -> Option<PointerHit> {
    let (offset, line_idx) = offset_for_point(text, measure, point);

    let exact = set
        .query_point(offset)
        .into_iter()
        .filter(|a| visibility.allows(a.kind))
        .min_by_key(|a| (a.kind.priority(), a.range.start, a.id));

    let annotation = exact.or_else(|| {
        set.annotations()
            .iter()
            .filter(|a| visibility.allows(a.kind))
            .filter_map(|a| {
                let distance = if offset < a.range.start {
                    a.range.start - offset
                } else {
                    // offset >= a.range.end here; covered spans matched above.
                    offset.saturating_sub(a.range.end.saturating_sub(1))
                };
                (distance <= options.tolerance).then_some((distance, a))
            })
            .min_by_key(|(distance, a)| (*distance, a.kind.priority(), a.range.start, a.id))
            .map(|(_, a)| a)
    })?;

    let index = CharIndex::new(text);
    let span_text = text
        [index.char_to_byte(annotation.range.start)..index.char_to_byte(annotation.range.end)]
        .to_string();

    let lines = split_lines_preserve_trailing(text);
    let span_line_start: usize = lines[..line_idx]
        .iter()
        .map(|l| l.chars().count() + 1)
        .sum();
    let anchor_column = annotation.range.start.saturating_sub(span_line_start);
    let anchor_x = measure
        .column_to_x(&lines[line_idx], anchor_column)
        .min(options.container_width.saturating_sub(1));
    let anchor_y = (line_idx + 1).min(options.container_height.saturating_sub(1));

    Some(PointerHit {
        annotation: annotation.clone(),
        span_text,
        anchor: PopupAnchor {
            x: anchor_x,
            y: anchor_y,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{AnnotationId, AnnotationKind, AnnotationRange};
    use crate::measure::MonospaceMeasure;

    fn annotation(id: AnnotationId, start: usize, end: usize, kind: AnnotationKind) -> Annotation {
        Annotation {
            id,
            range: AnnotationRange::new(start, end),
            kind,
            message: "msg".to_string(),
            suggestions: vec!["alt".to_string()],
            rule_id: "test".to_string(),
        }
    }

    #[test]
    fn test_exact_hit() {
        let text = "The big dog";
        let set = AnnotationSet::new(0, vec![annotation(1, 4, 7, AnnotationKind::Vocabulary)]);
        let measure = MonospaceMeasure::default();

        let hit = resolve(
            text,
            &set,
            VisibilityFlags::all(),
            &measure,
            PointerPoint::new(5, 0),
            ResolveOptions::default(),
        )
        .unwrap();

        assert_eq!(hit.annotation.id, 1);
        assert_eq!(hit.span_text, "big");
        assert_eq!(hit.anchor, PopupAnchor { x: 4, y: 1 });
    }

    #[test]
    fn test_near_miss_within_tolerance() {
        let text = "The big dog";
        let set = AnnotationSet::new(0, vec![annotation(1, 4, 7, AnnotationKind::Vocabulary)]);
        let measure = MonospaceMeasure::default();

        // x=8 implies offset 8, one past the span end; within tolerance 2.
        let hit = resolve(
            text,
            &set,
            VisibilityFlags::all(),
            &measure,
            PointerPoint::new(8, 0),
            ResolveOptions::default(),
        );
        assert!(hit.is_some());

        // x=10 is three columns past the span; beyond tolerance.
        let miss = resolve(
            text,
            &set,
            VisibilityFlags::all(),
            &measure,
            PointerPoint::new(10, 0),
            ResolveOptions::default(),
        );
        assert!(miss.is_none());
    }

    #[test]
    fn test_hidden_kind_does_not_resolve() {
        let text = "The big dog";
        let set = AnnotationSet::new(0, vec![annotation(1, 4, 7, AnnotationKind::Vocabulary)]);
        let measure = MonospaceMeasure::default();
        let mut visibility = VisibilityFlags::all();
        visibility.set(AnnotationKind::Vocabulary, false);

        let hit = resolve(
            text,
            &set,
            visibility,
            &measure,
            PointerPoint::new(5, 0),
            ResolveOptions::default(),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_overlap_resolves_highest_priority() {
        let text = "abcdef";
        let set = AnnotationSet::new(
            0,
            vec![
                annotation(1, 0, 6, AnnotationKind::Style),
                annotation(2, 2, 4, AnnotationKind::Spelling),
            ],
        );
        let measure = MonospaceMeasure::default();

        let hit = resolve(
            text,
            &set,
            VisibilityFlags::all(),
            &measure,
            PointerPoint::new(3, 0),
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(hit.annotation.id, 2);
    }

    #[test]
    fn test_multiline_and_wide_chars() {
        let text = "你好\nThe big dog";
        // "big" sits at offsets 7..10 (3 chars + newline before the second line).
        let set = AnnotationSet::new(0, vec![annotation(1, 7, 10, AnnotationKind::Vocabulary)]);
        let measure = MonospaceMeasure::default();

        let hit = resolve(
            text,
            &set,
            VisibilityFlags::all(),
            &measure,
            PointerPoint::new(4, 1),
            ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(hit.span_text, "big");
        assert_eq!(hit.anchor.y, 2);
    }

    #[test]
    fn test_anchor_clamps_to_container() {
        let text = "word";
        let set = AnnotationSet::new(0, vec![annotation(1, 0, 4, AnnotationKind::Spelling)]);
        let measure = MonospaceMeasure::default();

        let options = ResolveOptions {
            tolerance: 2,
            container_width: 3,
            container_height: 1,
        };
        let hit = resolve(
            text,
            &set,
            VisibilityFlags::all(),
            &measure,
            PointerPoint::new(1, 0),
            options,
        )
        .unwrap();
        assert!(hit.anchor.x < 3);
        assert_eq!(hit.anchor.y, 0);
    }
}
