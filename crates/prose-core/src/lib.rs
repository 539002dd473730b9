#![warn(missing_docs)]
//! Prose Core - Headless Writing-Annotation Engine
//!
//! # Overview
//!
//! `prose-core` is a headless engine for annotating learner-authored text with
//! lint-like findings (spelling, grammar, vocabulary, style), rendering a
//! highlight overlay in exact alignment with an editable surface, resolving
//! pointer positions to the annotation under them, and applying replacement
//! suggestions by splicing the buffer. It does not render anything itself;
//! the host provides the editable surface and draws the overlay span stream.
//!
//! # Core Features
//!
//! - **Versioned Text Buffer**: rope-backed storage, one mutation primitive,
//!   version counter for staleness tracking
//! - **Span Annotations**: half-open char ranges with a deterministic
//!   cross-kind priority order
//! - **Wholesale Invalidation**: derived annotation state is discarded on
//!   every edit and recomputed on a debounce timer, never patched
//! - **Gapless Overlay**: span stream that reconstructs the document exactly,
//!   newlines preserved
//! - **Geometry Seam**: `TextMeasure` trait for toolkit-independent pointer
//!   math (monospace cell-grid implementation included)
//! - **State Tracking**: version number mechanism and change notifications
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  State Manager & Notifications              │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Overlay Renderer & Pointer Resolution      │  ← Host-Facing Output
//! ├─────────────────────────────────────────────┤
//! │  Annotation Set (queries + invariants)      │  ← Derived State
//! ├─────────────────────────────────────────────┤
//! │  Reconciler (suggestion splices)            │  ← Edits
//! ├─────────────────────────────────────────────┤
//! │  Text Buffer (Rope + version)               │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use prose_core::{
//!     Annotation, AnnotationKind, AnnotationRange, AnnotationSet, EngineStateManager,
//! };
//!
//! let mut manager = EngineStateManager::new("The big dog", 80);
//!
//! // An analyzer (see `prose-core-rules`) would normally produce the set.
//! let set = AnnotationSet::new(
//!     manager.buffer_version(),
//!     vec![Annotation {
//!         id: 1,
//!         range: AnnotationRange::new(4, 7),
//!         kind: AnnotationKind::Vocabulary,
//!         message: "Try a stronger word".to_string(),
//!         suggestions: vec!["enormous".to_string()],
//!         rule_id: "vocabulary.big".to_string(),
//!     }],
//! );
//! assert!(manager.replace_annotations(set));
//!
//! manager.apply_suggestion(1, "enormous").unwrap();
//! assert_eq!(manager.text(), "The enormous dog");
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - versioned rope-backed text buffer
//! - [`annotations`] - annotation model and versioned set
//! - [`reconciler`] - suggestion application with staleness rejection
//! - [`overlay`] - gapless highlight span stream
//! - [`measure`] / [`pointer`] - geometry seam and pointer resolution
//! - [`state`] - state management and query interface
//! - [`processing`] - generic analyzer plug-in interface
//! - [`debounce`] - explicit-clock debounce timer
//! - [`session_store`] - injected key-value persistence port
//!
//! # Unicode Support
//!
//! - All offsets are character offsets (Unicode scalar values)
//! - UAX #11 wide-character cell widths in the monospace measure
//! - UAX #29 word segmentation for word counts

pub mod annotations;
pub mod buffer;
pub mod debounce;
pub mod measure;
pub mod overlay;
pub mod pointer;
pub mod processing;
pub mod reconciler;
pub mod session_store;
pub mod state;
pub mod text;

pub use annotations::{Annotation, AnnotationId, AnnotationKind, AnnotationRange, AnnotationSet};
pub use buffer::{SpliceRecord, TextBuffer};
pub use debounce::DebounceTimer;
pub use measure::{DEFAULT_TAB_WIDTH, MonospaceMeasure, TextMeasure, cell_width_at, char_width};
pub use overlay::{
    OverlayDocument, OverlayHighlight, OverlayLine, OverlaySpan, VisibilityFlags, render,
};
pub use pointer::{PointerHit, PointerPoint, PopupAnchor, ResolveOptions, resolve};
pub use processing::{DocumentProcessor, ProcessingEdit};
pub use reconciler::{AppliedSuggestion, ReconcileError, apply_suggestion};
pub use session_store::{MemorySessionStore, SessionStore, VISIBILITY_KEY};
pub use state::{
    AnnotationsState, DEFAULT_ANALYSIS_DELAY, DocumentState, EngineStateManager, StateChange,
    StateChangeCallback, StateChangeType, ViewportState,
};
pub use text::word_count;
