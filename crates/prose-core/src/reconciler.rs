//! Suggestion application (edit reconciliation).
//!
//! Applying a suggestion splices the annotated range out of the buffer and
//! inserts the replacement. Because the replacement length may differ from the
//! span length, the prior annotation set is invalidated wholesale and must be
//! recomputed; annotations are never shifted incrementally.
//!
//! Staleness is a contract violation on the caller's side (an annotation held
//! across an intervening edit); the reconciler rejects it without mutating
//! the buffer.

use crate::annotations::{Annotation, AnnotationSet};
use crate::buffer::{SpliceRecord, TextBuffer};

/// Errors returned by [`apply_suggestion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The annotation was computed against an older buffer version, or its
    /// offsets no longer fit the document. The buffer was not mutated.
    StaleAnnotation {
        /// Buffer version the annotation set was computed against.
        annotation_version: u64,
        /// Current buffer version.
        buffer_version: u64,
    },
    /// No annotation with the given id exists in the current set.
    UnknownAnnotation {
        /// The id that failed to resolve.
        id: crate::annotations::AnnotationId,
    },
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleAnnotation {
                annotation_version,
                buffer_version,
            } => write!(
                f,
                "Stale annotation: computed against buffer version {}, buffer is at {}",
                annotation_version, buffer_version
            ),
            Self::UnknownAnnotation { id } => {
                write!(f, "No annotation with id {} in the current set", id)
            }
        }
    }
}

impl std::error::Error for ReconcileError {}

/// The result of a successfully applied suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSuggestion {
    /// The exact buffer change that was applied.
    pub splice: SpliceRecord,
    /// Buffer version after the splice.
    pub new_version: u64,
    /// Character offset just past the inserted replacement (caret placement).
    pub caret_offset: usize,
}

/// Replace `annotation`'s range in `buffer` with `replacement`.
///
/// The operation is atomic: it either splices and returns the applied change,
/// or rejects with [`ReconcileError::StaleAnnotation`] and leaves the buffer
/// untouched. `set` must be the set the annotation came from; its recorded
/// buffer version is the staleness check.
pub fn apply_suggestion(
    buffer: &mut TextBuffer,
    set: &AnnotationSet,
    annotation: &Annotation,
    replacement: &str,
) -> Result<AppliedSuggestion, ReconcileError> {
    let stale = ReconcileError::StaleAnnotation {
        annotation_version: set.buffer_version(),
        buffer_version: buffer.version(),
    };

    if !set.is_current(buffer) {
        return Err(stale);
    }
    if annotation.range.is_empty() || annotation.range.end > buffer.char_count() {
        return Err(stale);
    }

    let splice = buffer.splice(annotation.range.start, annotation.range.end, replacement);
    let caret_offset = splice.start + splice.inserted_len();

    Ok(AppliedSuggestion {
        new_version: splice.new_version,
        caret_offset,
        splice,
    })
}
