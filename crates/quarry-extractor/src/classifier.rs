//! Failure classification
//!
//! The backend exposes no structured error taxonomy, so transient failures
//! are recognized by phrases observed in its error text.

/// Whether a failed attempt is worth retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Transient backend condition (quota, overload, rate limit)
    Retryable,
    /// Anything not recognized as transient
    Fatal,
}

/// Maps a failure message to a [`Classification`]
///
/// Implementations must be pure: the same message always yields the same
/// classification.
pub trait ErrorClassifier {
    /// Classify a failure by its message
    fn classify(&self, message: &str) -> Classification;
}

/// Phrases the extraction backend is known to emit for transient conditions
pub const DEFAULT_RETRYABLE_TERMS: &[&str] = &[
    "quota exceeded",
    "rate limit",
    "too many requests",
    // Overloaded models sometimes answer without a content field
    "content field missing",
    "resource exhausted",
    "resource_exhausted",
    "usage_metadata",
    "token limit",
    "429",
    "503",
    "overloaded",
    "unavailable",
    "temporarily unavailable",
    "server overloaded",
    "internal error",
    "service temporarily unavailable",
];

/// Case-insensitive substring classifier
///
/// # Examples
///
/// ```
/// use quarry_extractor::{Classification, ErrorClassifier, LexicalClassifier};
///
/// let classifier = LexicalClassifier::default();
/// assert_eq!(classifier.classify("HTTP 429: Quota exceeded"), Classification::Retryable);
/// assert_eq!(classifier.classify("API key not valid"), Classification::Fatal);
/// ```
#[derive(Debug, Clone)]
pub struct LexicalClassifier {
    terms: Vec<String>,
}

impl LexicalClassifier {
    /// Build a classifier from an explicit vocabulary
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classifier = Self { terms: Vec::new() };
        classifier.extend(terms);
        classifier
    }

    /// Default vocabulary plus `extra` phrases
    pub fn with_extra_terms<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classifier = Self::default();
        classifier.extend(extra);
        classifier
    }

    /// Current vocabulary, lowercased
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !self.terms.contains(&term) {
                self.terms.push(term);
            }
        }
    }
}

impl Default for LexicalClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_RETRYABLE_TERMS)
    }
}

impl ErrorClassifier for LexicalClassifier {
    fn classify(&self, message: &str) -> Classification {
        let message = message.to_lowercase();
        if self.terms.iter().any(|term| message.contains(term.as_str())) {
            Classification::Retryable
        } else {
            Classification::Fatal
        }
    }
}
