//! Generic document processing interfaces.
//!
//! This module defines a shared "edit" format for derived annotation state.
//! External crates (analyzers) produce [`ProcessingEdit`] values and apply
//! them to an [`EngineStateManager`] via
//! [`EngineStateManager::apply_processing_edits`](crate::EngineStateManager::apply_processing_edits).

use crate::EngineStateManager;
use crate::annotations::AnnotationSet;

/// A change to derived annotation state.
#[derive(Debug, Clone)]
pub enum ProcessingEdit {
    /// Replace the current annotation set wholesale.
    ///
    /// The set must have been computed against the manager's current buffer
    /// version; stale sets are rejected on application.
    ReplaceAnnotations {
        /// The full replacement set.
        set: AnnotationSet,
    },
    /// Clear all annotations.
    ClearAnnotations,
}

/// A generic processor that produces [`ProcessingEdit`]s for a document.
pub trait DocumentProcessor {
    /// The error type returned by [`DocumentProcessor::process`].
    type Error;

    /// Compute derived state updates to apply to the engine.
    ///
    /// Implementations should avoid mutating `state`; instead, return edits
    /// that the caller can apply (e.g. via
    /// [`EngineStateManager::apply_processing_edits`](crate::EngineStateManager::apply_processing_edits)).
    fn process(&mut self, state: &EngineStateManager) -> Result<Vec<ProcessingEdit>, Self::Error>;
}
