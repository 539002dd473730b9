//! Engine state interface.
//!
//! Provides the state management core for the annotation engine: the text
//! buffer, the current annotation set, overlay visibility, viewport mirroring,
//! and change notifications for frontend synchronization.
//!
//! # Overview
//!
//! The state manager adopts a "unidirectional data flow" pattern:
//!
//! 1. The host mutates text via [`splice`](EngineStateManager::splice) /
//!    [`insert`](EngineStateManager::insert) /
//!    [`delete`](EngineStateManager::delete) or
//!    [`apply_suggestion`](EngineStateManager::apply_suggestion).
//! 2. Every mutation discards the (now stale) annotation set wholesale and
//!    re-arms the analysis debounce timer; annotations are recomputed, never
//!    patched.
//! 3. The manager bumps its state version and notifies subscribers.
//! 4. The host re-renders from [`render_overlay`](EngineStateManager::render_overlay)
//!    and the `get_*_state()` snapshots.
//!
//! Analysis runs on a debounce timer rather than every keystroke: the host
//! calls [`poll_analysis`](EngineStateManager::poll_analysis) from its event
//! loop and the processor only runs when a quiet window has elapsed.
//!
//! # Example
//!
//! ```rust
//! use prose_core::{EngineStateManager, StateChangeType};
//!
//! let mut manager = EngineStateManager::new("Hello, World!", 80);
//!
//! manager.subscribe(|change| {
//!     println!("State changed: {:?}", change.change_type);
//! });
//!
//! let doc_state = manager.get_document_state();
//! println!("Words: {}, Characters: {}", doc_state.word_count, doc_state.char_count);
//! ```

use crate::annotations::{AnnotationId, AnnotationKind, AnnotationSet};
use crate::buffer::{SpliceRecord, TextBuffer};
use crate::debounce::DebounceTimer;
use crate::measure::TextMeasure;
use crate::overlay::{OverlayDocument, VisibilityFlags, render};
use crate::pointer::{PointerHit, PointerPoint, ResolveOptions, resolve};
use crate::processing::{DocumentProcessor, ProcessingEdit};
use crate::reconciler::{AppliedSuggestion, ReconcileError, apply_suggestion};
use crate::session_store::{SessionStore, VISIBILITY_KEY};
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default quiet window between an edit and re-analysis.
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(1000);

/// Document state snapshot.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Total document line count.
    pub line_count: usize,
    /// Total document character count.
    pub char_count: usize,
    /// Total document word count (UAX #29).
    pub word_count: usize,
    /// Buffer version (incremented by every text mutation).
    pub buffer_version: u64,
    /// State version (incremented by every state change, including non-text).
    pub version: u64,
}

/// Annotations state snapshot.
#[derive(Debug, Clone)]
pub struct AnnotationsState {
    /// Number of annotations in the current set (0 when none).
    pub annotation_count: usize,
    /// Whether the current set came from a capped (partial) analysis.
    pub degraded: bool,
    /// Whether a set is present and matches the current buffer version.
    pub current: bool,
}

/// Viewport state snapshot.
#[derive(Debug, Clone)]
pub struct ViewportState {
    /// Viewport width (in measure units).
    pub width: usize,
    /// Viewport height (line count, determined by the host).
    pub height: Option<usize>,
    /// Current scroll position (visual line number), mirrored from the host.
    pub scroll_top: usize,
    /// Visible line range.
    pub visible_lines: Range<usize>,
}

/// State change type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Document content modified.
    DocumentModified,
    /// Annotation set replaced or cleared.
    AnnotationsChanged,
    /// Overlay visibility flags changed.
    VisibilityChanged,
    /// Viewport size changed.
    ViewportChanged,
}

/// State change record.
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Change type.
    pub change_type: StateChangeType,
    /// Old version number.
    pub old_version: u64,
    /// New version number.
    pub new_version: u64,
    /// Affected region (character offset range), if known.
    pub affected_region: Option<Range<usize>>,
    /// Structured splice record for document changes (if available).
    pub splice: Option<Arc<SpliceRecord>>,
}

impl StateChange {
    /// Create a new state change record without an affected region.
    pub fn new(change_type: StateChangeType, old_version: u64, new_version: u64) -> Self {
        Self {
            change_type,
            old_version,
            new_version,
            affected_region: None,
            splice: None,
        }
    }

    /// Attach the affected character range to this change record.
    pub fn with_region(mut self, region: Range<usize>) -> Self {
        self.affected_region = Some(region);
        self
    }

    /// Attach a structured splice record to this change record.
    pub fn with_splice(mut self, splice: Arc<SpliceRecord>) -> Self {
        self.splice = Some(splice);
        self
    }
}

/// State change callback function type.
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Engine state manager.
///
/// Owns the [`TextBuffer`], the current [`AnnotationSet`] (derived state,
/// discarded wholesale on every text mutation), overlay visibility, viewport
/// mirroring, and the analysis debounce timer.
pub struct EngineStateManager {
    buffer: TextBuffer,
    annotations: Option<AnnotationSet>,
    visibility: VisibilityFlags,
    state_version: u64,
    callbacks: Vec<StateChangeCallback>,
    scroll_top: usize,
    viewport_width: usize,
    viewport_height: Option<usize>,
    analysis_timer: DebounceTimer,
    last_splice: Option<Arc<SpliceRecord>>,
}

impl EngineStateManager {
    /// Create a new state manager.
    pub fn new(text: &str, viewport_width: usize) -> Self {
        Self {
            buffer: TextBuffer::new(text),
            annotations: None,
            visibility: VisibilityFlags::all(),
            state_version: 0,
            callbacks: Vec::new(),
            scroll_top: 0,
            viewport_width,
            viewport_height: None,
            analysis_timer: DebounceTimer::new(DEFAULT_ANALYSIS_DELAY),
            last_splice: None,
        }
    }

    /// Create an empty state manager.
    pub fn empty(viewport_width: usize) -> Self {
        Self::new("", viewport_width)
    }

    /// Get a reference to the text buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Full document text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Current state version number.
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Current buffer version number.
    pub fn buffer_version(&self) -> u64 {
        self.buffer.version()
    }

    /// Check if state has changed since a version.
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Override the analysis debounce delay.
    pub fn set_analysis_delay(&mut self, delay: Duration) {
        self.analysis_timer = DebounceTimer::new(delay);
    }

    /// When the pending re-analysis window elapses, if armed.
    pub fn analysis_due(&self) -> Option<Instant> {
        self.analysis_timer.due()
    }

    /// Arm the analysis timer explicitly (e.g. to run an initial analysis).
    pub fn request_analysis(&mut self, now: Instant) {
        self.analysis_timer.arm(now);
    }

    /// Replace the half-open character range `[start, end)` with `replacement`.
    ///
    /// Atomically mutates the buffer, discards the annotation set, re-arms the
    /// analysis timer, and notifies subscribers with the structured record.
    pub fn splice(&mut self, start: usize, end: usize, replacement: &str) -> SpliceRecord {
        let record = self.buffer.splice(start, end, replacement);
        self.after_document_change(&record);
        record
    }

    /// Insert `text` at `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> SpliceRecord {
        self.splice(offset, offset, text)
    }

    /// Delete the half-open character range `[start, end)`.
    pub fn delete(&mut self, start: usize, end: usize) -> SpliceRecord {
        self.splice(start, end, "")
    }

    /// Apply a replacement suggestion for the annotation with `annotation_id`.
    ///
    /// Delegates staleness checking to the reconciler; on success the prior
    /// annotation set is discarded and re-analysis is scheduled.
    pub fn apply_suggestion(
        &mut self,
        annotation_id: AnnotationId,
        replacement: &str,
    ) -> Result<AppliedSuggestion, ReconcileError> {
        let set = self
            .annotations
            .as_ref()
            .ok_or(ReconcileError::UnknownAnnotation { id: annotation_id })?;
        let annotation = set
            .find(annotation_id)
            .ok_or(ReconcileError::UnknownAnnotation { id: annotation_id })?
            .clone();

        let applied = apply_suggestion(&mut self.buffer, set, &annotation, replacement)?;
        self.after_document_change(&applied.splice);
        Ok(applied)
    }

    fn after_document_change(&mut self, record: &SpliceRecord) {
        // The entire annotation set is stale now; discard, never patch.
        self.annotations = None;
        self.analysis_timer.arm(Instant::now());

        let splice = Arc::new(record.clone());
        self.last_splice = Some(Arc::clone(&splice));
        let region = record.start..record.start + record.inserted_len();
        self.mark_modified_internal(
            StateChangeType::DocumentModified,
            Some(region),
            Some(splice),
        );
    }

    /// The current annotation set, if one has been computed and not invalidated.
    pub fn annotations(&self) -> Option<&AnnotationSet> {
        self.annotations.as_ref()
    }

    /// Replace the annotation set wholesale.
    ///
    /// Returns `false` (and changes nothing) if `set` was computed against a
    /// buffer version other than the current one; stale analysis results must
    /// not land.
    pub fn replace_annotations(&mut self, set: AnnotationSet) -> bool {
        if set.buffer_version() != self.buffer.version() {
            return false;
        }
        self.annotations = Some(set);
        self.mark_modified(StateChangeType::AnnotationsChanged);
        true
    }

    /// Clear all annotations.
    pub fn clear_annotations(&mut self) {
        self.annotations = None;
        self.mark_modified(StateChangeType::AnnotationsChanged);
    }

    /// Current overlay visibility flags.
    pub fn visibility(&self) -> VisibilityFlags {
        self.visibility
    }

    /// Replace the overlay visibility flags.
    pub fn set_visibility(&mut self, visibility: VisibilityFlags) {
        if self.visibility != visibility {
            self.visibility = visibility;
            self.mark_modified(StateChangeType::VisibilityChanged);
        }
    }

    /// Toggle visibility for one annotation kind.
    pub fn set_kind_visible(&mut self, kind: AnnotationKind, visible: bool) {
        let mut flags = self.visibility;
        flags.set(kind, visible);
        self.set_visibility(flags);
    }

    /// Persist the visibility flags through the session store.
    pub fn persist_visibility(&self, store: &mut dyn SessionStore) {
        let v = self.visibility;
        let encoded = [v.spelling, v.grammar, v.punctuation, v.vocabulary, v.style]
            .map(|b| if b { "1" } else { "0" })
            .join(",");
        store.set(VISIBILITY_KEY, &encoded);
    }

    /// Restore visibility flags from the session store, if previously persisted.
    pub fn load_visibility(&mut self, store: &dyn SessionStore) {
        let Some(encoded) = store.get(VISIBILITY_KEY) else {
            return;
        };
        let bits: Vec<bool> = encoded.split(',').map(|p| p == "1").collect();
        if bits.len() != 5 {
            return;
        }
        self.set_visibility(VisibilityFlags {
            spelling: bits[0],
            grammar: bits[1],
            punctuation: bits[2],
            vocabulary: bits[3],
            style: bits[4],
        });
    }

    /// Set viewport height.
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = Some(height);
        self.mark_modified(StateChangeType::ViewportChanged);
    }

    /// Set viewport width.
    pub fn set_viewport_width(&mut self, width: usize) {
        if self.viewport_width != width {
            self.viewport_width = width;
            self.mark_modified(StateChangeType::ViewportChanged);
        }
    }

    /// Mirror the host surface's scroll position.
    ///
    /// The overlay must track the editable surface on every scroll event, so
    /// this notifies subscribers immediately (without a version bump).
    pub fn set_scroll_top(&mut self, scroll_top: usize) {
        let old_scroll = self.scroll_top;
        self.scroll_top = scroll_top;

        if old_scroll != scroll_top {
            self.notify_change(StateChangeType::ViewportChanged);
        }
    }

    /// Get document state.
    pub fn get_document_state(&self) -> DocumentState {
        DocumentState {
            line_count: self.buffer.line_count(),
            char_count: self.buffer.char_count(),
            word_count: self.buffer.word_count(),
            buffer_version: self.buffer.version(),
            version: self.state_version,
        }
    }

    /// Get annotations state.
    pub fn get_annotations_state(&self) -> AnnotationsState {
        match &self.annotations {
            Some(set) => AnnotationsState {
                annotation_count: set.len(),
                degraded: set.degraded(),
                current: set.is_current(&self.buffer),
            },
            None => AnnotationsState {
                annotation_count: 0,
                degraded: false,
                current: false,
            },
        }
    }

    /// Get viewport state.
    pub fn get_viewport_state(&self) -> ViewportState {
        let total_lines = self.buffer.line_count();
        let visible_end = if let Some(height) = self.viewport_height {
            self.scroll_top + height
        } else {
            total_lines
        };

        ViewportState {
            width: self.viewport_width,
            height: self.viewport_height,
            scroll_top: self.scroll_top,
            visible_lines: self.scroll_top..visible_end.min(total_lines),
        }
    }

    /// Render the highlight overlay for the current document and annotations.
    ///
    /// When no current set exists (none computed yet, or invalidated by an
    /// edit) the document renders as plain text; alignment is preserved
    /// regardless.
    pub fn render_overlay(&self) -> OverlayDocument {
        let text = self.buffer.text();
        match &self.annotations {
            Some(set) if set.is_current(&self.buffer) => render(&text, set, self.visibility),
            _ => render(
                &text,
                &AnnotationSet::empty(self.buffer.version()),
                self.visibility,
            ),
        }
    }

    /// Resolve a pointer position to the annotation under it, if any.
    pub fn resolve_pointer(
        &self,
        measure: &dyn TextMeasure,
        point: PointerPoint,
        options: ResolveOptions,
    ) -> Option<PointerHit> {
        let set = self.annotations.as_ref()?;
        if !set.is_current(&self.buffer) {
            return None;
        }
        resolve(
            &self.buffer.text(),
            set,
            self.visibility,
            measure,
            point,
            options,
        )
    }

    /// Apply derived-state edits produced by a document processor.
    pub fn apply_processing_edits<I>(&mut self, edits: I)
    where
        I: IntoIterator<Item = ProcessingEdit>,
    {
        for edit in edits {
            match edit {
                ProcessingEdit::ReplaceAnnotations { set } => {
                    self.replace_annotations(set);
                }
                ProcessingEdit::ClearAnnotations => {
                    self.clear_annotations();
                }
            }
        }
    }

    /// Run a [`DocumentProcessor`] against the current document and apply its edits.
    pub fn apply_processor<P>(&mut self, processor: &mut P) -> Result<(), P::Error>
    where
        P: DocumentProcessor,
    {
        let edits = processor.process(self)?;
        self.apply_processing_edits(edits);
        Ok(())
    }

    /// Run `processor` if the analysis debounce window has elapsed as of `now`.
    ///
    /// Returns `Ok(true)` when analysis ran. Re-analysis happens on the timer,
    /// never per keystroke, keeping per-edit CPU work bounded.
    pub fn poll_analysis<P>(&mut self, processor: &mut P, now: Instant) -> Result<bool, P::Error>
    where
        P: DocumentProcessor,
    {
        if !self.analysis_timer.fire(now) {
            return Ok(false);
        }
        self.apply_processor(processor)?;
        Ok(true)
    }

    /// Subscribe to state change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Get the structured splice record produced by the last document edit, if any.
    pub fn last_splice(&self) -> Option<&SpliceRecord> {
        self.last_splice.as_deref()
    }

    /// Increment the state version and notify subscribers.
    pub fn mark_modified(&mut self, change_type: StateChangeType) {
        self.mark_modified_internal(change_type, None, None);
    }

    fn mark_modified_internal(
        &mut self,
        change_type: StateChangeType,
        region: Option<Range<usize>>,
        splice: Option<Arc<SpliceRecord>>,
    ) {
        let old_version = self.state_version;
        self.state_version += 1;

        let mut change = StateChange::new(change_type, old_version, self.state_version);
        if let Some(region) = region {
            change = change.with_region(region);
        }
        if let Some(splice) = splice {
            change = change.with_splice(splice);
        }
        self.notify_callbacks(&change);
    }

    /// Notify state change (without modifying the version number).
    fn notify_change(&mut self, change_type: StateChangeType) {
        let change = StateChange::new(change_type, self.state_version, self.state_version);
        self.notify_callbacks(&change);
    }

    fn notify_callbacks(&mut self, change: &StateChange) {
        for callback in &mut self.callbacks {
            callback(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{Annotation, AnnotationRange};
    use std::sync::{Arc, Mutex};

    fn vocabulary_set(buffer_version: u64) -> AnnotationSet {
        AnnotationSet::new(
            buffer_version,
            vec![Annotation {
                id: 1,
                range: AnnotationRange::new(4, 7),
                kind: AnnotationKind::Vocabulary,
                message: "Try a stronger word".to_string(),
                suggestions: vec!["enormous".to_string()],
                rule_id: "vocabulary.big".to_string(),
            }],
        )
    }

    #[test]
    fn test_document_state() {
        let manager = EngineStateManager::new("Hello World\nLine 2", 80);
        let doc_state = manager.get_document_state();

        assert_eq!(doc_state.line_count, 2);
        assert_eq!(doc_state.char_count, 18);
        assert_eq!(doc_state.word_count, 4);
        assert_eq!(doc_state.version, 0);
        assert_eq!(doc_state.buffer_version, 0);
    }

    #[test]
    fn test_edit_discards_annotations_and_notifies() {
        let mut manager = EngineStateManager::new("The big dog", 80);
        assert!(manager.replace_annotations(vocabulary_set(0)));
        assert_eq!(manager.get_annotations_state().annotation_count, 1);

        let seen = Arc::new(Mutex::new(Vec::<StateChangeType>::new()));
        let seen_clone = Arc::clone(&seen);
        manager.subscribe(move |change| {
            seen_clone.lock().unwrap().push(change.change_type);
        });

        manager.insert(0, "!");

        assert!(manager.annotations().is_none());
        assert!(!manager.get_annotations_state().current);
        assert!(manager.analysis_due().is_some());
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[StateChangeType::DocumentModified]
        );
    }

    #[test]
    fn test_replace_annotations_rejects_stale_set() {
        let mut manager = EngineStateManager::new("The big dog", 80);
        let stale = vocabulary_set(99);
        assert!(!manager.replace_annotations(stale));
        assert!(manager.annotations().is_none());
    }

    #[test]
    fn test_apply_suggestion_through_manager() {
        let mut manager = EngineStateManager::new("The big dog", 80);
        manager.replace_annotations(vocabulary_set(0));

        let applied = manager.apply_suggestion(1, "enormous").unwrap();
        assert_eq!(manager.text(), "The enormous dog");
        assert_eq!(applied.caret_offset, 12);
        // The set was invalidated by the edit.
        assert!(manager.annotations().is_none());

        let err = manager.apply_suggestion(1, "massive").unwrap_err();
        assert_eq!(err, ReconcileError::UnknownAnnotation { id: 1 });
    }

    #[test]
    fn test_version_tracking() {
        let mut manager = EngineStateManager::new("Test", 80);

        assert_eq!(manager.version(), 0);
        assert!(!manager.has_changed_since(0));

        manager.insert(0, "x");
        assert_eq!(manager.version(), 1);
        assert_eq!(manager.buffer_version(), 1);
        assert!(manager.has_changed_since(0));
    }

    #[test]
    fn test_scroll_mirror_notifies_without_version_bump() {
        let mut manager = EngineStateManager::new("Line 1\nLine 2\nLine 3\nLine 4", 80);
        manager.set_viewport_height(2);
        let version = manager.version();

        let seen = Arc::new(Mutex::new(0usize));
        let seen_clone = Arc::clone(&seen);
        manager.subscribe(move |change| {
            if change.change_type == StateChangeType::ViewportChanged {
                *seen_clone.lock().unwrap() += 1;
            }
        });

        manager.set_scroll_top(2);
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(manager.version(), version);
        assert_eq!(manager.get_viewport_state().visible_lines, 2..4);
    }

    #[test]
    fn test_render_overlay_falls_back_to_plain_when_no_set() {
        let mut manager = EngineStateManager::new("The big dog", 80);
        manager.replace_annotations(vocabulary_set(0));
        assert!(
            manager
                .render_overlay()
                .spans
                .iter()
                .any(|s| s.highlight.is_some())
        );

        manager.insert(0, "!");
        let overlay = manager.render_overlay();
        assert_eq!(overlay.text(), "!The big dog");
        assert!(overlay.spans.iter().all(|s| s.highlight.is_none()));
    }

    #[test]
    fn test_poll_analysis_respects_debounce() {
        struct ClearingProcessor {
            runs: usize,
        }
        impl DocumentProcessor for ClearingProcessor {
            type Error = std::convert::Infallible;
            fn process(
                &mut self,
                _state: &EngineStateManager,
            ) -> Result<Vec<ProcessingEdit>, Self::Error> {
                self.runs += 1;
                Ok(vec![ProcessingEdit::ClearAnnotations])
            }
        }

        let mut manager = EngineStateManager::new("hello", 80);
        manager.set_analysis_delay(Duration::from_millis(100));
        let mut processor = ClearingProcessor { runs: 0 };

        manager.insert(0, "x");
        let armed_at = Instant::now();

        assert!(!manager.poll_analysis(&mut processor, armed_at).unwrap());
        assert!(
            manager
                .poll_analysis(&mut processor, armed_at + Duration::from_millis(1200))
                .unwrap()
        );
        assert_eq!(processor.runs, 1);
        // The timer disarmed after firing.
        assert!(
            !manager
                .poll_analysis(&mut processor, armed_at + Duration::from_millis(2400))
                .unwrap()
        );
    }

    #[test]
    fn test_visibility_persistence_roundtrip() {
        use crate::session_store::MemorySessionStore;

        let mut manager = EngineStateManager::new("text", 80);
        manager.set_kind_visible(AnnotationKind::Style, false);

        let mut store = MemorySessionStore::new();
        manager.persist_visibility(&mut store);

        let mut restored = EngineStateManager::new("text", 80);
        restored.load_visibility(&store);
        assert!(!restored.visibility().style);
        assert!(restored.visibility().spelling);
    }
}
