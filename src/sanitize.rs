//! Stripping of embedded reasoning markup from message text.
//!
//! Assistant messages exported from reasoning models often wrap the chain of
//! thought in `<thinking>` tags and the final reply in `<answer>` tags.
//! Projections show only the reply: thinking spans are dropped, answer
//! markers are unwrapped, and the result is trimmed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static THINKING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<thinking>(.*?)</thinking>").expect("thinking pattern"));

static ANSWER_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<answer>(.*?)</answer>").expect("answer pattern"));

/// Remove reasoning markup from `raw`.
///
/// Unbalanced markers are left untouched. The rules are applied until the
/// text stops changing, so the result is a fixed point:
/// `sanitize(&sanitize(x)) == sanitize(x)`.
///
/// ```rust
/// use chain_viewer::sanitize::sanitize;
///
/// assert_eq!(sanitize("<thinking>x</thinking>keep"), "keep");
/// assert_eq!(sanitize("<answer>hi</answer>"), "hi");
/// ```
#[must_use]
pub fn sanitize(raw: &str) -> String {
    let mut current = sanitize_once(raw);
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// One pass of the rules. Every pass that changes the text shortens it.
fn sanitize_once(text: &str) -> String {
    let without_thinking = THINKING_BLOCK.replace_all(text, "");
    let unwrapped = ANSWER_BLOCK.replace_all(&without_thinking, "$1");
    unwrapped.trim().to_string()
}

/// Whether `raw` contains a complete thinking block.
#[must_use]
pub fn has_reasoning(raw: &str) -> bool {
    THINKING_BLOCK.is_match(raw)
}

/// A message split into its reasoning and its reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReasoningSplit {
    /// Trimmed body of the first thinking block, if any.
    pub thinking: Option<String>,
    /// Sanitized reply text.
    pub answer: String,
}

/// Separate the first thinking block from the sanitized reply, for views
/// that show the reasoning in a collapsed section.
#[must_use]
pub fn split_reasoning(raw: &str) -> ReasoningSplit {
    let thinking = THINKING_BLOCK
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty());

    ReasoningSplit {
        thinking,
        answer: sanitize(raw),
    }
}
