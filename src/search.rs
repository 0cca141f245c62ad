//! Live substring search shared by every projection.
//!
//! The predicate looks at the first content part of a message only, and is
//! case-insensitive. An empty term matches everything. All projectors take
//! the same [`SearchFilter`], which keeps their memberships identical.

use crate::model::Message;
use crate::reconstruction::OrderedMessage;

/// Case-insensitive substring filter over message text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    term: String,
    needle: String,
}

impl SearchFilter {
    /// Create a filter for `term`.
    #[must_use]
    pub fn new(term: impl Into<String>) -> Self {
        let term = term.into();
        let needle = term.to_lowercase();
        Self { term, needle }
    }

    /// A filter that matches every message.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// The term as entered.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whether the filter is a no-op.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// Test raw text against the filter.
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        self.is_empty() || text.to_lowercase().contains(&self.needle)
    }

    /// Test a message. Only the first content part is searched; a message
    /// without parts matches only the empty filter.
    #[must_use]
    pub fn matches(&self, message: &Message) -> bool {
        if self.is_empty() {
            return true;
        }
        message
            .first_part()
            .is_some_and(|part| self.matches_text(part))
    }

    /// Narrow an ordered sequence, preserving its order.
    #[must_use]
    pub fn apply<'a>(&self, messages: &[OrderedMessage<'a>]) -> Vec<OrderedMessage<'a>> {
        messages
            .iter()
            .filter(|m| self.matches(m.message))
            .cloned()
            .collect()
    }
}

impl From<&str> for SearchFilter {
    fn from(term: &str) -> Self {
        Self::new(term)
    }
}

impl From<Option<&str>> for SearchFilter {
    fn from(term: Option<&str>) -> Self {
        term.map(Self::new).unwrap_or_default()
    }
}
