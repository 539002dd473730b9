//! Debounced asynchronous feedback coordination.
//!
//! The coordinator is a sans-io state machine: events go in (content changes,
//! writer questions, service responses), effects come out (requests to send,
//! applied feedback, fallbacks). The current time is passed in explicitly, so
//! debounce and timeout behavior is fully deterministic under test.
//!
//! ```text
//! Idle -> Debouncing -> Requesting -> Success           -> Idle
//!                                  -> Error (fallback)  -> Idle
//!                                  -> Superseded (drop) -> Idle
//! ```
//!
//! Serialization of visible effects: every issued request captures the
//! coordinator's generation at send time, and issuing a new request increments
//! the generation. A response is applied only if its captured generation still
//! equals the current one, so at most one in-flight request's result ever
//! lands; older responses are discarded on arrival, never cancelled in
//! transit (cooperative supersession).

use crate::model::{FeedbackHistory, FeedbackItem, FeedbackKind, FeedbackModel, FeedbackOrigin};
use crate::service::{
    AssistanceLevel, FeedbackError, FeedbackRequest, feedback_response_from_value,
};
use prose_core::{DebounceTimer, word_count};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Default minimum word count before autonomous feedback triggers.
pub const DEFAULT_WORD_THRESHOLD: usize = 50;

/// Default quiet window between a content change and an autonomous request.
pub const DEFAULT_FEEDBACK_DEBOUNCE: Duration = Duration::from_millis(2000);

/// Default in-flight request timeout; expiry routes into the fallback path.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Area tag used for fallback items.
pub const FALLBACK_AREA: &str = "general";

/// Text of the deterministic fallback item.
pub const FALLBACK_TEXT: &str =
    "I couldn't fetch feedback just now. Keep writing; feedback will refresh when your draft changes.";

/// Coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Minimum word count before autonomous feedback triggers.
    pub word_threshold: usize,
    /// Quiet window after the last qualifying content change.
    pub debounce_delay: Duration,
    /// In-flight request timeout.
    pub request_timeout: Duration,
    /// Text type forwarded with every request (e.g. `"story"`).
    pub text_type: String,
    /// Coaching depth forwarded with every request.
    pub assistance_level: AssistanceLevel,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            word_threshold: DEFAULT_WORD_THRESHOLD,
            debounce_delay: DEFAULT_FEEDBACK_DEBOUNCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            text_type: "story".to_string(),
            assistance_level: AssistanceLevel::default(),
        }
    }
}

/// The coordinator's externally visible phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// Nothing pending.
    Idle,
    /// A qualifying content change is waiting out its quiet window.
    Debouncing,
    /// A request is in flight (and may be superseded by a newer one).
    Requesting,
}

/// Events fed into the coordinator.
#[derive(Debug, Clone)]
pub enum CoordinatorEvent {
    /// The writer's content changed.
    ContentChanged {
        /// The full current content.
        content: String,
    },
    /// The writer asked an explicit question (non-debounced path).
    QuestionAsked {
        /// The question text.
        question: String,
        /// The full current content.
        content: String,
    },
    /// A service response (or failure) arrived for a previously sent request.
    ResponseArrived {
        /// The generation captured when the request was sent.
        generation: u64,
        /// The raw payload, or the transport error.
        payload: Result<Value, FeedbackError>,
    },
}

/// Effects the coordinator asks the host to perform.
#[derive(Debug, Clone)]
pub enum CoordinatorEffect {
    /// Send `request` to the feedback service, tagging the reply with `generation`.
    SendRequest {
        /// Generation to echo back in [`CoordinatorEvent::ResponseArrived`].
        generation: u64,
        /// The request payload.
        request: FeedbackRequest,
    },
    /// A validated response was applied to the model.
    FeedbackApplied {
        /// Origin of the applied response.
        origin: FeedbackOrigin,
        /// Number of items that survived history deduplication.
        accepted: usize,
    },
    /// A failure was converted into the deterministic fallback item.
    FallbackApplied {
        /// The fallback item that was shown.
        item: FeedbackItem,
    },
}

#[derive(Debug, Clone)]
struct InFlight {
    generation: u64,
    origin: FeedbackOrigin,
    sent_at: Instant,
}

/// The debounced async feedback coordinator.
pub struct FeedbackCoordinator {
    options: CoordinatorOptions,
    generation: u64,
    in_flight: Option<InFlight>,
    debounce: DebounceTimer,
    pending_content: Option<String>,
    last_processed: Option<String>,
    last_applied_generation: Option<u64>,
    model: FeedbackModel,
    history: FeedbackHistory,
}

impl FeedbackCoordinator {
    /// Create a coordinator with the given options.
    pub fn new(options: CoordinatorOptions) -> Self {
        let debounce = DebounceTimer::new(options.debounce_delay);
        Self {
            options,
            generation: 0,
            in_flight: None,
            debounce,
            pending_content: None,
            last_processed: None,
            last_applied_generation: None,
            model: FeedbackModel::new(),
            history: FeedbackHistory::new(),
        }
    }

    /// The coordinator's options.
    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Change the coaching depth for future requests.
    pub fn set_assistance_level(&mut self, level: AssistanceLevel) {
        self.options.assistance_level = level;
    }

    /// The visible feedback model.
    pub fn model(&self) -> &FeedbackModel {
        &self.model
    }

    /// The append-only session history.
    pub fn history(&self) -> &FeedbackHistory {
        &self.history
    }

    /// Current generation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generation of the last response that was actually applied, if any.
    pub fn last_applied_generation(&self) -> Option<u64> {
        self.last_applied_generation
    }

    /// Current phase.
    pub fn phase(&self) -> CoordinatorPhase {
        if self.debounce.is_armed() {
            CoordinatorPhase::Debouncing
        } else if self.in_flight.is_some() {
            CoordinatorPhase::Requesting
        } else {
            CoordinatorPhase::Idle
        }
    }

    /// Reset everything for a new document/session.
    ///
    /// This is the only point at which the history is dropped.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
        self.debounce.cancel();
        self.pending_content = None;
        self.last_processed = None;
        self.last_applied_generation = None;
        self.model = FeedbackModel::new();
        self.history = FeedbackHistory::new();
    }

    /// Feed one event into the state machine.
    pub fn handle_event(&mut self, event: CoordinatorEvent, now: Instant) -> Vec<CoordinatorEffect> {
        match event {
            CoordinatorEvent::ContentChanged { content } => {
                self.on_content_changed(content, now);
                Vec::new()
            }
            CoordinatorEvent::QuestionAsked { question, content } => {
                vec![self.issue_request(content, Some(question), FeedbackOrigin::Asked, now)]
            }
            CoordinatorEvent::ResponseArrived {
                generation,
                payload,
            } => self.on_response(generation, payload),
        }
    }

    /// Advance timers: fire the debounce window and expire timed-out requests.
    ///
    /// Hosts call this from their event loop; it is cheap and idempotent.
    pub fn poll(&mut self, now: Instant) -> Vec<CoordinatorEffect> {
        let mut effects = Vec::new();

        if self.debounce.fire(now)
            && let Some(content) = self.pending_content.take()
        {
            self.last_processed = Some(content.clone());
            effects.push(self.issue_request(content, None, FeedbackOrigin::Autonomous, now));
        }

        if let Some(in_flight) = &self.in_flight
            && now.duration_since(in_flight.sent_at) >= self.options.request_timeout
        {
            let origin = in_flight.origin;
            log::warn!(
                "feedback request (generation {}) timed out",
                in_flight.generation
            );
            // Bump the generation so a late response cannot apply.
            self.generation += 1;
            self.in_flight = None;
            effects.push(self.apply_fallback(origin));
        }

        effects
    }

    fn on_content_changed(&mut self, content: String, now: Instant) {
        let qualifies = word_count(&content) >= self.options.word_threshold
            && self.last_processed.as_deref() != Some(content.as_str());

        if qualifies {
            // Every qualifying change restarts the quiet window; only a window
            // that survives uninterrupted issues a request.
            self.pending_content = Some(content);
            self.debounce.arm(now);
        } else {
            self.pending_content = None;
            self.debounce.cancel();
        }
    }

    fn issue_request(
        &mut self,
        content: String,
        question: Option<String>,
        origin: FeedbackOrigin,
        now: Instant,
    ) -> CoordinatorEffect {
        // A new request supersedes any older in-flight one.
        self.generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            origin,
            sent_at: now,
        });

        CoordinatorEffect::SendRequest {
            generation: self.generation,
            request: FeedbackRequest {
                content,
                text_type: self.options.text_type.clone(),
                assistance_level: self.options.assistance_level,
                history: self.history.items().to_vec(),
                question,
            },
        }
    }

    fn on_response(
        &mut self,
        generation: u64,
        payload: Result<Value, FeedbackError>,
    ) -> Vec<CoordinatorEffect> {
        let Some(in_flight) = &self.in_flight else {
            log::debug!("discarding response for generation {} (none in flight)", generation);
            return Vec::new();
        };
        if generation != self.generation || generation != in_flight.generation {
            log::debug!(
                "discarding superseded response (generation {}, current {})",
                generation,
                self.generation
            );
            return Vec::new();
        }

        let origin = in_flight.origin;
        self.in_flight = None;

        let response = match payload.and_then(|value| feedback_response_from_value(&value)) {
            Ok(response) => response,
            Err(err) => {
                log::warn!("feedback request failed: {}", err);
                return vec![self.apply_fallback(origin)];
            }
        };

        let accepted = self.history.merge_new(&response.feedback_items);
        let accepted_count = accepted.len();
        match origin {
            FeedbackOrigin::Autonomous => {
                self.model.overall_comment = Some(response.overall_comment);
                self.model.focus_for_next_time = response.focus_for_next_time;
                self.model.append_autonomous(accepted);
            }
            FeedbackOrigin::Asked => {
                self.model.prepend_asked(accepted);
            }
        }

        self.last_applied_generation = Some(generation);
        vec![CoordinatorEffect::FeedbackApplied {
            origin,
            accepted: accepted_count,
        }]
    }

    fn apply_fallback(&mut self, origin: FeedbackOrigin) -> CoordinatorEffect {
        let item = fallback_item();
        match origin {
            FeedbackOrigin::Autonomous => {
                self.model.append_autonomous(vec![item.clone()]);
            }
            FeedbackOrigin::Asked => {
                self.model.prepend_asked(vec![item.clone()]);
            }
        }
        CoordinatorEffect::FallbackApplied { item }
    }
}

/// The deterministic, template-based fallback item shown when the service
/// fails or times out. Fallbacks are displayed but never enter the history.
pub fn fallback_item() -> FeedbackItem {
    FeedbackItem {
        kind: FeedbackKind::Suggestion,
        area: FALLBACK_AREA.to_string(),
        text: FALLBACK_TEXT.to_string(),
        example_from_text: None,
        suggestion_for_improvement: Some(
            "Keep going; new writing or a direct question will try again.".to_string(),
        ),
    }
}
