//! Default dictionaries for the built-in rule set.
//!
//! These lists are small: the rule layer is a pluggable heuristic,
//! not a grammar engine. Hosts extend or replace them via
//! [`RuleSet`](crate::RuleSet).

/// Common misspellings and their corrections, best first.
pub const MISSPELLINGS: &[(&str, &[&str])] = &[
    ("teh", &["the"]),
    ("recieve", &["receive"]),
    ("seperate", &["separate"]),
    ("definately", &["definitely"]),
    ("becuase", &["because"]),
    ("freind", &["friend"]),
    ("wich", &["which"]),
    ("alot", &["a lot"]),
    ("untill", &["until"]),
    ("wierd", &["weird"]),
    ("occured", &["occurred"]),
    ("tommorow", &["tomorrow"]),
    ("beleive", &["believe"]),
    ("diffrent", &["different"]),
    ("probly", &["probably"]),
];

/// Basic words with ranked stronger alternatives, best first.
pub const VOCABULARY_UPGRADES: &[(&str, &[&str])] = &[
    ("big", &["enormous", "massive", "substantial"]),
    ("small", &["tiny", "minute", "compact"]),
    ("good", &["excellent", "superb", "admirable"]),
    ("bad", &["dreadful", "unpleasant", "inferior"]),
    ("nice", &["delightful", "pleasant", "charming"]),
    ("happy", &["delighted", "joyful", "elated"]),
    ("sad", &["miserable", "downcast", "sorrowful"]),
    ("said", &["remarked", "stated", "exclaimed"]),
    ("fun", &["enjoyable", "entertaining", "amusing"]),
    ("scared", &["terrified", "frightened", "alarmed"]),
    ("walked", &["strolled", "wandered", "marched"]),
    ("fast", &["rapid", "swift", "speedy"]),
];

/// Fixed phrases that must be capitalized: weekday and month names, plus the
/// pronoun `i`.
pub const CAPITALIZED_PHRASES: &[&str] = &[
    "i", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "january",
    "february", "march", "april", "june", "july", "august", "september", "october", "november",
    "december",
];

/// Function words excluded from the repetition heuristic.
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "than", "that", "this", "these", "those",
    "is", "are", "was", "were", "be", "been", "being", "to", "of", "in", "on", "at", "by", "for",
    "with", "from", "as", "it", "its", "he", "she", "they", "them", "we", "you", "i", "his", "her",
    "their", "our", "your", "my", "me", "him", "us", "not", "no", "so", "do", "does", "did",
    "have", "has", "had", "will", "would", "can", "could", "should", "there", "here", "what",
    "when", "where", "who", "how", "also", "into", "about", "over", "after", "before", "again",
    "too", "very", "just", "only", "some", "any", "all",
];

/// Returns `true` if `word` (lowercased) is a function word the repetition
/// heuristic ignores.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}
