//! `prose-core-rules` - Pattern-based lint rules for `prose-core`.
//!
//! This crate implements the analyzer: a pure, deterministic function from
//! document text to an [`AnnotationSet`]. Rules are a pluggable heuristic
//! layer (dictionary substitutions, fixed-phrase capitalization, punctuation
//! spacing, repeated-word detection, vocabulary upgrades); it is *not* a
//! grammar engine.
//!
//! Analysis is a latency-bound policy, not a completeness guarantee: each rule
//! caps its match count ([`MAX_MATCHES_PER_RULE`]) and input is capped at
//! [`MAX_ANALYSIS_CHARS`] characters, degrading gracefully on long documents
//! instead of blocking.

use prose_core::processing::{DocumentProcessor, ProcessingEdit};
use prose_core::{Annotation, AnnotationKind, AnnotationRange, AnnotationSet, EngineStateManager};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::convert::Infallible;
use unicode_segmentation::UnicodeSegmentation;

pub mod dictionaries;

use dictionaries::{CAPITALIZED_PHRASES, MISSPELLINGS, VOCABULARY_UPGRADES, is_stopword};

/// Maximum matches reported per rule pattern.
pub const MAX_MATCHES_PER_RULE: usize = 10;

/// Maximum number of characters analyzed; longer documents are truncated and
/// the result is flagged degraded.
pub const MAX_ANALYSIS_CHARS: usize = 5000;

/// Default sliding window (in words) for the repetition heuristic.
pub const DEFAULT_REPETITION_WINDOW: usize = 20;

/// Minimum word length (in chars) for the repetition heuristic.
const MIN_REPETITION_WORD_LEN: usize = 3;

/// A whole-word substitution rule (misspelling, capitalization, vocabulary).
#[derive(Debug, Clone)]
struct SubstitutionRule {
    rule_id: String,
    kind: AnnotationKind,
    message: String,
    regex: Regex,
    suggestions: Vec<String>,
    /// Mirror the matched text's leading capitalization onto the suggestions.
    preserve_case: bool,
}

impl SubstitutionRule {
    fn new(
        rule_id: String,
        kind: AnnotationKind,
        word: &str,
        suggestions: Vec<String>,
        message: String,
        case_insensitive: bool,
        preserve_case: bool,
    ) -> Result<Self, regex::Error> {
        let pattern = format!(r"\b{}\b", regex::escape(word));
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self {
            rule_id,
            kind,
            message,
            regex,
            suggestions,
            preserve_case,
        })
    }

    fn suggestions_for(&self, matched: &str) -> Vec<String> {
        if self.preserve_case && matched.chars().next().is_some_and(|c| c.is_uppercase()) {
            self.suggestions.iter().map(|s| capitalize(s)).collect()
        } else {
            self.suggestions.clone()
        }
    }
}

/// How a punctuation rule derives its suggestion from the matched text.
#[derive(Debug, Clone, Copy)]
enum PunctuationFix {
    /// Drop leading whitespace from the match (e.g. `" ,"` -> `","`).
    StripWhitespace,
    /// Collapse the match to its first character (e.g. `"!!"` -> `"!"`).
    CollapseToFirst,
}

#[derive(Debug, Clone)]
struct PunctuationRule {
    rule_id: String,
    message: String,
    regex: Regex,
    fix: PunctuationFix,
}

impl PunctuationRule {
    fn suggestion_for(&self, matched: &str) -> String {
        match self.fix {
            PunctuationFix::StripWhitespace => matched.trim_start().to_string(),
            PunctuationFix::CollapseToFirst => {
                matched.chars().next().map(String::from).unwrap_or_default()
            }
        }
    }
}

/// The active rule set: compiled patterns plus the repetition window.
///
/// Rule sets are built once (compiling every regex up front) and then reused
/// for each analysis pass.
#[derive(Debug, Clone)]
pub struct RuleSet {
    substitutions: Vec<SubstitutionRule>,
    punctuation: Vec<PunctuationRule>,
    /// Vocabulary upgrades, kept for repetition-suggestion lookup.
    upgrades: HashMap<String, Vec<String>>,
    repetition_window: usize,
}

impl RuleSet {
    /// An empty rule set (no rules; repetition still runs with the default window).
    pub fn empty() -> Self {
        Self {
            substitutions: Vec::new(),
            punctuation: Vec::new(),
            upgrades: HashMap::new(),
            repetition_window: DEFAULT_REPETITION_WINDOW,
        }
    }

    /// The built-in rule set: default dictionaries plus punctuation patterns.
    pub fn default_rules() -> Result<Self, regex::Error> {
        let mut rules = Self::empty();

        for (word, corrections) in MISSPELLINGS {
            rules.add_misspelling(word, corrections)?;
        }
        for phrase in CAPITALIZED_PHRASES {
            rules.add_capitalization(phrase)?;
        }
        for (word, alternatives) in VOCABULARY_UPGRADES {
            rules.add_vocabulary_upgrade(word, alternatives)?;
        }

        rules.punctuation.push(PunctuationRule {
            rule_id: "punctuation.space-before".to_string(),
            message: "Remove the space before this punctuation mark.".to_string(),
            regex: Regex::new(r"[ \t]+[,.;:!?]")?,
            fix: PunctuationFix::StripWhitespace,
        });
        rules.punctuation.push(PunctuationRule {
            rule_id: "punctuation.repeated".to_string(),
            message: "One exclamation or question mark is enough.".to_string(),
            regex: Regex::new(r"[!?]{2,}")?,
            fix: PunctuationFix::CollapseToFirst,
        });

        Ok(rules)
    }

    /// Add a misspelling -> corrections rule (whole-word, case-insensitive).
    pub fn add_misspelling(
        &mut self,
        word: &str,
        corrections: &[&str],
    ) -> Result<(), regex::Error> {
        self.substitutions.push(SubstitutionRule::new(
            format!("spelling.{}", word),
            AnnotationKind::Spelling,
            word,
            corrections.iter().map(|s| s.to_string()).collect(),
            format!("\"{}\" may be misspelled.", word),
            true,
            true,
        )?);
        Ok(())
    }

    /// Add a fixed phrase that must be capitalized (matches the lowercase form only).
    pub fn add_capitalization(&mut self, phrase: &str) -> Result<(), regex::Error> {
        self.substitutions.push(SubstitutionRule::new(
            format!("grammar.capitalize.{}", phrase),
            AnnotationKind::Grammar,
            phrase,
            vec![capitalize(phrase)],
            format!("\"{}\" should be capitalized.", phrase),
            false,
            false,
        )?);
        Ok(())
    }

    /// Add a basic word -> ranked stronger alternatives rule.
    pub fn add_vocabulary_upgrade(
        &mut self,
        word: &str,
        alternatives: &[&str],
    ) -> Result<(), regex::Error> {
        let alternatives: Vec<String> = alternatives.iter().map(|s| s.to_string()).collect();
        self.upgrades
            .insert(word.to_lowercase(), alternatives.clone());
        self.substitutions.push(SubstitutionRule::new(
            format!("vocabulary.{}", word),
            AnnotationKind::Vocabulary,
            word,
            alternatives,
            format!(
                "\"{}\" is a basic word; consider a stronger alternative.",
                word
            ),
            true,
            true,
        )?);
        Ok(())
    }

    /// Override the repetition window (in words; clamped to at least 1).
    pub fn set_repetition_window(&mut self, words: usize) {
        self.repetition_window = words.max(1);
    }

    /// The repetition window in words.
    pub fn repetition_window(&self) -> usize {
        self.repetition_window
    }
}

/// The result of one analysis pass.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// The computed annotation set (also carries the degraded flag).
    pub set: AnnotationSet,
    /// `true` if the input exceeded [`MAX_ANALYSIS_CHARS`] and was truncated.
    pub degraded: bool,
}

/// The pattern-based analyzer: pure and deterministic given its rule set.
#[derive(Debug, Clone)]
pub struct Analyzer {
    rules: RuleSet,
}

impl Analyzer {
    /// Create an analyzer over an explicit rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Create an analyzer with the built-in rule set.
    pub fn with_default_rules() -> Result<Self, regex::Error> {
        Ok(Self::new(RuleSet::default_rules()?))
    }

    /// The active rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Analyze `text` and produce the annotation set for `buffer_version`.
    ///
    /// Repeated calls on unchanged input produce identical results. All
    /// returned ranges satisfy `0 <= start < end <= char_count(text)` and the
    /// set is sorted by start (ties by kind priority).
    pub fn analyze(&self, text: &str, buffer_version: u64) -> AnalysisOutcome {
        let (scan, degraded) = cap_input(text);
        let mut annotations: Vec<Annotation> = Vec::new();
        let mut next_id: u64 = 1;

        for rule in &self.rules.substitutions {
            for m in rule.regex.find_iter(scan).take(MAX_MATCHES_PER_RULE) {
                let Some(range) = char_range(scan, m.start(), m.end()) else {
                    continue;
                };
                annotations.push(Annotation {
                    id: next_id,
                    range,
                    kind: rule.kind,
                    message: rule.message.clone(),
                    suggestions: rule.suggestions_for(m.as_str()),
                    rule_id: rule.rule_id.clone(),
                });
                next_id += 1;
            }
        }

        for rule in &self.rules.punctuation {
            for m in rule.regex.find_iter(scan).take(MAX_MATCHES_PER_RULE) {
                let Some(range) = char_range(scan, m.start(), m.end()) else {
                    continue;
                };
                annotations.push(Annotation {
                    id: next_id,
                    range,
                    kind: AnnotationKind::Punctuation,
                    message: rule.message.clone(),
                    suggestions: vec![rule.suggestion_for(m.as_str())],
                    rule_id: rule.rule_id.clone(),
                });
                next_id += 1;
            }
        }

        for (start_byte, end_byte, word) in
            repeated_words(scan, self.rules.repetition_window)
                .into_iter()
                .take(MAX_MATCHES_PER_RULE)
        {
            let Some(range) = char_range(scan, start_byte, end_byte) else {
                continue;
            };
            annotations.push(Annotation {
                id: next_id,
                range,
                kind: AnnotationKind::Style,
                message: format!(
                    "\"{}\" was already used within the last {} words; consider varying your word choice.",
                    word, self.rules.repetition_window
                ),
                suggestions: self.rules.upgrades.get(&word).cloned().unwrap_or_default(),
                rule_id: "style.repetition".to_string(),
            });
            next_id += 1;
        }

        AnalysisOutcome {
            set: AnnotationSet::new(buffer_version, annotations).with_degraded(degraded),
            degraded,
        }
    }
}

/// A processor that runs an [`Analyzer`] through `prose-core`'s generic
/// processing interface, replacing the annotation set wholesale.
#[derive(Debug, Clone)]
pub struct AnalysisProcessor {
    analyzer: Analyzer,
}

impl AnalysisProcessor {
    /// Wrap an analyzer.
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// A processor with the built-in rule set.
    pub fn with_default_rules() -> Result<Self, regex::Error> {
        Ok(Self::new(Analyzer::with_default_rules()?))
    }

    /// The wrapped analyzer.
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }
}

impl DocumentProcessor for AnalysisProcessor {
    type Error = Infallible;

    fn process(&mut self, state: &EngineStateManager) -> Result<Vec<ProcessingEdit>, Self::Error> {
        let outcome = self.analyzer.analyze(&state.text(), state.buffer_version());
        Ok(vec![ProcessingEdit::ReplaceAnnotations { set: outcome.set }])
    }
}

/// Truncate `text` to [`MAX_ANALYSIS_CHARS`] characters (at a char boundary).
fn cap_input(text: &str) -> (&str, bool) {
    match text.char_indices().nth(MAX_ANALYSIS_CHARS) {
        Some((byte, _)) => (&text[..byte], true),
        None => (text, false),
    }
}

fn char_range(text: &str, start_byte: usize, end_byte: usize) -> Option<AnnotationRange> {
    if start_byte >= end_byte || end_byte > text.len() {
        return None;
    }
    let start = text[..start_byte].chars().count();
    let end = start + text[start_byte..end_byte].chars().count();
    Some(AnnotationRange::new(start, end))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Find content words that recur within `window` words of a prior occurrence.
///
/// The window is counted over *all* words (stopwords included); only content
/// words (>= 3 chars, not a stopword) are tracked and flagged. The later
/// occurrence is reported, in byte offsets.
fn repeated_words(text: &str, window: usize) -> Vec<(usize, usize, String)> {
    let mut last_seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for (word_idx, (byte_off, word)) in text.unicode_word_indices().enumerate() {
        let lower = word.to_lowercase();
        if lower.chars().count() < MIN_REPETITION_WORD_LEN || is_stopword(&lower) {
            continue;
        }

        if let Some(&prev_idx) = last_seen.get(&lower)
            && word_idx - prev_idx <= window
        {
            out.push((byte_off, byte_off + word.len(), lower.clone()));
        }
        last_seen.insert(lower, word_idx);
    }

    out
}
