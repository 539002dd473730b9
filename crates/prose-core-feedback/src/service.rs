//! Feedback service boundary.
//!
//! The feedback generator is an opaque external collaborator; this module
//! defines the request payload the engine sends and validates the response it
//! gets back. Responses are duck-typed JSON, so validation is explicit and
//! fails closed: any malformed or missing expected field becomes
//! [`FeedbackError::InvalidResponse`] at the boundary instead of surfacing
//! deep inside rendering logic.

use crate::model::{FeedbackItem, FeedbackKind};
use prose_core::session_store::SessionStore;
use serde_json::{Value, json};
use thiserror::Error;

/// Storage key for the persisted assistance level.
pub const ASSISTANCE_LEVEL_KEY: &str = "prose.feedback.assistance-level";

/// Errors produced at the feedback service boundary.
///
/// Both variants degrade to the same visible fallback path; the distinction
/// exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// Transport or service failure (including timeouts).
    #[error("Feedback request failed: {0}")]
    RequestFailed(String),
    /// The service returned a malformed or incomplete payload.
    #[error("Invalid service response: {0}")]
    InvalidResponse(String),
}

/// How much coaching the writer asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistanceLevel {
    /// Brief, high-level feedback.
    Minimal,
    /// Balanced feedback.
    #[default]
    Moderate,
    /// Thorough feedback with examples.
    Detailed,
}

impl AssistanceLevel {
    /// Wire name of this level.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Moderate => "moderate",
            Self::Detailed => "detailed",
        }
    }

    /// Parse a wire name; unknown names are rejected.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "minimal" => Some(Self::Minimal),
            "moderate" => Some(Self::Moderate),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }
}

/// Read the persisted assistance level, if one was stored.
pub fn load_assistance_level(store: &dyn SessionStore) -> Option<AssistanceLevel> {
    store
        .get(ASSISTANCE_LEVEL_KEY)
        .and_then(|v| AssistanceLevel::from_str(&v))
}

/// Persist the assistance level for future sessions.
pub fn persist_assistance_level(store: &mut dyn SessionStore, level: AssistanceLevel) {
    store.set(ASSISTANCE_LEVEL_KEY, level.as_str());
}

/// A feedback generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    /// The writer's current content.
    pub content: String,
    /// What kind of text this is (e.g. `"story"`, `"essay"`).
    pub text_type: String,
    /// Coaching depth.
    pub assistance_level: AssistanceLevel,
    /// Prior feedback, so the service can avoid repeating itself.
    pub history: Vec<FeedbackItem>,
    /// An explicit writer question, for the manual-question path.
    pub question: Option<String>,
}

impl FeedbackRequest {
    /// Shape the request as the JSON payload the service consumes.
    pub fn to_json(&self) -> Value {
        let history: Vec<Value> = self.history.iter().map(feedback_item_to_value).collect();
        let mut payload = json!({
            "content": self.content,
            "textType": self.text_type,
            "assistanceLevel": self.assistance_level.as_str(),
            "history": history,
        });
        if let Some(question) = &self.question {
            payload["question"] = Value::String(question.clone());
        }
        payload
    }
}

/// A validated feedback generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackResponse {
    /// Overall comment on the draft.
    pub overall_comment: String,
    /// The returned feedback items.
    pub feedback_items: Vec<FeedbackItem>,
    /// Focus points for the next draft.
    pub focus_for_next_time: Vec<String>,
}

/// The opaque feedback-generation collaborator.
///
/// Implementations return the raw JSON payload; validation happens in
/// [`feedback_response_from_value`] so every transport shares the same
/// fail-closed boundary.
pub trait FeedbackService {
    /// Generate feedback for `request`.
    fn generate_feedback(&mut self, request: &FeedbackRequest) -> Result<Value, FeedbackError>;
}

fn feedback_item_to_value(item: &FeedbackItem) -> Value {
    let mut value = json!({
        "type": item.kind.as_str(),
        "area": item.area,
        "text": item.text,
    });
    if let Some(example) = &item.example_from_text {
        value["exampleFromText"] = Value::String(example.clone());
    }
    if let Some(suggestion) = &item.suggestion_for_improvement {
        value["suggestionForImprovement"] = Value::String(suggestion.clone());
    }
    value
}

fn feedback_item_from_value(value: &Value) -> Option<FeedbackItem> {
    let kind = FeedbackKind::from_str(value.get("type")?.as_str()?)?;
    let area = value.get("area")?.as_str()?.to_string();
    let text = value.get("text")?.as_str()?.to_string();
    let example_from_text = value
        .get("exampleFromText")
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let suggestion_for_improvement = value
        .get("suggestionForImprovement")
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    Some(FeedbackItem {
        kind,
        area,
        text,
        example_from_text,
        suggestion_for_improvement,
    })
}

/// Validate a raw service payload into a [`FeedbackResponse`].
///
/// Every expected field is checked; the first malformed or missing one fails
/// the whole response.
pub fn feedback_response_from_value(value: &Value) -> Result<FeedbackResponse, FeedbackError> {
    let overall_comment = value
        .get("overallComment")
        .and_then(Value::as_str)
        .ok_or_else(|| FeedbackError::InvalidResponse("missing overallComment".to_string()))?
        .to_string();

    let raw_items = value
        .get("feedbackItems")
        .and_then(Value::as_array)
        .ok_or_else(|| FeedbackError::InvalidResponse("missing feedbackItems".to_string()))?;

    let mut feedback_items = Vec::with_capacity(raw_items.len());
    for (idx, raw) in raw_items.iter().enumerate() {
        let item = feedback_item_from_value(raw).ok_or_else(|| {
            FeedbackError::InvalidResponse(format!("malformed feedbackItems[{}]", idx))
        })?;
        feedback_items.push(item);
    }

    let raw_focus = value
        .get("focusForNextTime")
        .and_then(Value::as_array)
        .ok_or_else(|| FeedbackError::InvalidResponse("missing focusForNextTime".to_string()))?;

    let mut focus_for_next_time = Vec::with_capacity(raw_focus.len());
    for (idx, raw) in raw_focus.iter().enumerate() {
        let focus = raw.as_str().ok_or_else(|| {
            FeedbackError::InvalidResponse(format!("malformed focusForNextTime[{}]", idx))
        })?;
        focus_for_next_time.push(focus.to_string());
    }

    Ok(FeedbackResponse {
        overall_comment,
        feedback_items,
        focus_for_next_time,
    })
}

/// Split a comma-separated alternatives payload (thesaurus/paraphrase service)
/// into trimmed, non-empty strings.
pub fn split_alternatives(text: &str) -> Vec<String> {
    text.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
