//! Feedback data model.
//!
//! Feedback items are the unit of writer-facing coaching returned by the
//! external feedback service. Identity for deduplication is the exact
//! `(area, text)` pair, no fuzzy matching. [`FeedbackHistory`] grows
//! append-only for the session and is used solely to filter newly returned
//! items; [`FeedbackModel`] is what the host displays.

/// The tone/intent of a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    /// Something the writer did well.
    Praise,
    /// A concrete improvement suggestion.
    Suggestion,
    /// A question prompting the writer to think.
    Question,
    /// A stretch goal for stronger writers.
    Challenge,
}

impl FeedbackKind {
    /// Wire name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Praise => "praise",
            Self::Suggestion => "suggestion",
            Self::Question => "question",
            Self::Challenge => "challenge",
        }
    }

    /// Parse a wire name; unknown names are rejected.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "praise" => Some(Self::Praise),
            "suggestion" => Some(Self::Suggestion),
            "question" => Some(Self::Question),
            "challenge" => Some(Self::Challenge),
            _ => None,
        }
    }
}

/// A single feedback item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackItem {
    /// The tone/intent of the item.
    pub kind: FeedbackKind,
    /// The writing area the item addresses (e.g. `"word choice"`).
    pub area: String,
    /// The feedback text itself.
    pub text: String,
    /// An excerpt from the writer's text the item refers to, if any.
    pub example_from_text: Option<String>,
    /// A concrete improvement suggestion, if any.
    pub suggestion_for_improvement: Option<String>,
}

impl FeedbackItem {
    /// The exact-equality identity used for deduplication.
    pub fn dedup_key(&self) -> (&str, &str) {
        (self.area.as_str(), self.text.as_str())
    }
}

/// Where a displayed feedback entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOrigin {
    /// Produced by the autonomous (debounced) feedback cycle.
    Autonomous,
    /// Produced in response to an explicit writer question.
    Asked,
}

/// Append-only session history of feedback items.
///
/// The history is never mutated or pruned within a session; it exists only to
/// filter newly returned items so the writer is not told the same thing twice.
#[derive(Debug, Clone, Default)]
pub struct FeedbackHistory {
    items: Vec<FeedbackItem>,
}

impl FeedbackHistory {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// All items, in arrival order.
    pub fn items(&self) -> &[FeedbackItem] {
        &self.items
    }

    /// Number of items in the history.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if an item with the exact `(area, text)` pair exists.
    pub fn contains_pair(&self, area: &str, text: &str) -> bool {
        self.items.iter().any(|i| i.dedup_key() == (area, text))
    }

    /// Append each incoming item whose `(area, text)` pair is not already
    /// present (checking against the history *and* earlier items of the same
    /// batch), and return the accepted items in order.
    pub fn merge_new(&mut self, incoming: &[FeedbackItem]) -> Vec<FeedbackItem> {
        let mut accepted = Vec::new();
        for item in incoming {
            if self.contains_pair(&item.area, &item.text) {
                continue;
            }
            self.items.push(item.clone());
            accepted.push(item.clone());
        }
        accepted
    }
}

/// A displayed feedback entry: an item plus its origin tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    /// Origin tag, so displays can separate "asked" from "autonomous".
    pub origin: FeedbackOrigin,
    /// The item itself.
    pub item: FeedbackItem,
}

/// The visible feedback model the host renders.
#[derive(Debug, Clone, Default)]
pub struct FeedbackModel {
    /// The service's latest overall comment, if any.
    pub overall_comment: Option<String>,
    /// Displayed entries: asked entries are prepended, autonomous appended.
    pub entries: Vec<FeedbackEntry>,
    /// The service's latest focus points for the next draft.
    pub focus_for_next_time: Vec<String>,
}

impl FeedbackModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append autonomous entries in order.
    pub fn append_autonomous(&mut self, items: impl IntoIterator<Item = FeedbackItem>) {
        self.entries.extend(items.into_iter().map(|item| FeedbackEntry {
            origin: FeedbackOrigin::Autonomous,
            item,
        }));
    }

    /// Prepend asked entries, preserving their relative order.
    pub fn prepend_asked(&mut self, items: impl IntoIterator<Item = FeedbackItem>) {
        let mut prefix: Vec<FeedbackEntry> = items
            .into_iter()
            .map(|item| FeedbackEntry {
                origin: FeedbackOrigin::Asked,
                item,
            })
            .collect();
        prefix.append(&mut self.entries);
        self.entries = prefix;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(area: &str, text: &str) -> FeedbackItem {
        FeedbackItem {
            kind: FeedbackKind::Suggestion,
            area: area.to_string(),
            text: text.to_string(),
            example_from_text: None,
            suggestion_for_improvement: None,
        }
    }

    #[test]
    fn test_merge_new_filters_exact_pairs() {
        let mut history = FeedbackHistory::new();
        let accepted = history.merge_new(&[item("vocab", "vary your verbs"), item("flow", "good pacing")]);
        assert_eq!(accepted.len(), 2);
        assert_eq!(history.len(), 2);

        // The same (area, text) pair is filtered; a new pair is not.
        let accepted = history.merge_new(&[
            item("vocab", "vary your verbs"),
            item("vocab", "try stronger adjectives"),
        ]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(history.len(), 3);
        assert_eq!(accepted[0].text, "try stronger adjectives");
    }

    #[test]
    fn test_merge_new_dedups_within_batch() {
        let mut history = FeedbackHistory::new();
        let accepted = history.merge_new(&[item("a", "x"), item("a", "x")]);
        assert_eq!(accepted.len(), 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_history_has_no_duplicate_pairs() {
        let mut history = FeedbackHistory::new();
        history.merge_new(&[item("a", "x"), item("b", "x"), item("a", "y")]);
        history.merge_new(&[item("a", "x"), item("b", "y")]);

        for (i, lhs) in history.items().iter().enumerate() {
            for rhs in &history.items()[i + 1..] {
                assert_ne!(lhs.dedup_key(), rhs.dedup_key());
            }
        }
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn test_model_prepends_asked_entries() {
        let mut model = FeedbackModel::new();
        model.append_autonomous(vec![item("flow", "auto 1")]);
        model.prepend_asked(vec![item("question", "asked 1"), item("question", "asked 2")]);

        let origins: Vec<FeedbackOrigin> = model.entries.iter().map(|e| e.origin).collect();
        assert_eq!(
            origins,
            vec![
                FeedbackOrigin::Asked,
                FeedbackOrigin::Asked,
                FeedbackOrigin::Autonomous
            ]
        );
        assert_eq!(model.entries[0].item.text, "asked 1");
    }
}
