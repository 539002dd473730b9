#![warn(missing_docs)]
//! `prose-core-feedback` - Debounced asynchronous feedback coordination for `prose-core`.
//!
//! This crate coordinates calls to an external feedback-generation service:
//! it debounces triggering on content changes, prevents overlapping requests
//! from corrupting the visible result (generation-counter supersession),
//! deduplicates returned items against the session history, and falls back
//! deterministically on failure. The writer can always keep typing regardless
//! of service health.
//!
//! The coordinator itself is sans-io ([`FeedbackCoordinator`]); the optional
//! [`FeedbackClient`] runs a [`FeedbackService`] on a worker thread and pumps
//! results back in.

pub mod client;
pub mod coordinator;
pub mod model;
pub mod service;

pub use client::{FeedbackClient, FeedbackJob, FeedbackOutcome};
pub use coordinator::{
    CoordinatorEffect, CoordinatorEvent, CoordinatorOptions, CoordinatorPhase,
    DEFAULT_FEEDBACK_DEBOUNCE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_WORD_THRESHOLD, FALLBACK_AREA,
    FALLBACK_TEXT, FeedbackCoordinator, fallback_item,
};
pub use model::{
    FeedbackEntry, FeedbackHistory, FeedbackItem, FeedbackKind, FeedbackModel, FeedbackOrigin,
};
pub use service::{
    ASSISTANCE_LEVEL_KEY, AssistanceLevel, FeedbackError, FeedbackRequest, FeedbackResponse,
    FeedbackService, feedback_response_from_value, load_assistance_level,
    persist_assistance_level, split_alternatives,
};
