//! Aggregate statistics for a conversation.
//!
//! Counts are read from the raw mapping and the unfiltered ordered
//! sequence, so they do not change with the search term. The favorite
//! count comes from the overlay.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Mapping, Role};
use crate::overlay::Overlay;
use crate::reconstruction::{max_depth, ordered_messages, OrderedMessage, TraversalMode};
use crate::sanitize::has_reasoning;
use crate::util::truncate_chars;

/// Default length of [`conversation_preview`].
pub const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Statistics about one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationStats {
    /// Messages in the ordered sequence.
    pub message_count: usize,
    /// Extra branches: Σ max(0, children − 1) over all nodes.
    pub branch_count: usize,
    /// Favorited nodes.
    pub favorite_count: usize,
    /// Nodes in the mapping, structural ones included.
    pub node_count: usize,
    /// Messages by role.
    pub roles: RoleCounts,
    /// Messages containing a thinking block.
    pub reasoning_messages: usize,
    /// Deepest node below the root (root = 0).
    pub max_depth: usize,
    /// Whether the mapping has no root and was read in flat mode.
    pub degenerate: bool,
    /// Earliest message timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Latest message timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ConversationStats {
    /// Time between the first and last timestamped message.
    #[must_use]
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.end_time? - self.start_time?)
    }
}

/// Message counts by author role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    /// User messages.
    pub user: usize,
    /// Assistant messages.
    pub assistant: usize,
    /// System messages.
    pub system: usize,
    /// Tool messages.
    pub tool: usize,
    /// Messages with any other role.
    pub other: usize,
}

impl RoleCounts {
    fn record(&mut self, role: Role) {
        match role {
            Role::User => self.user += 1,
            Role::Assistant => self.assistant += 1,
            Role::System => self.system += 1,
            Role::Tool => self.tool += 1,
            Role::Other => self.other += 1,
        }
    }

    /// Total across roles.
    #[must_use]
    pub fn total(&self) -> usize {
        self.user + self.assistant + self.system + self.tool + self.other
    }
}

/// Sum of `max(0, children − 1)` over every node of the mapping.
///
/// A node with n children opens n − 1 branches beyond the single
/// continuation path. Dangling child references still count.
#[must_use]
pub fn branch_count(mapping: &Mapping) -> usize {
    mapping.iter().map(|(_, node)| node.extra_branches()).sum()
}

/// Compute statistics for a mapping.
#[must_use]
pub fn compute_stats(mapping: &Mapping, overlay: &Overlay) -> ConversationStats {
    let ordered = ordered_messages(mapping);
    stats_from_ordered(mapping, &ordered, overlay)
}

/// Compute statistics reusing an already computed ordered sequence.
#[must_use]
pub fn stats_from_ordered(
    mapping: &Mapping,
    ordered: &[OrderedMessage<'_>],
    overlay: &Overlay,
) -> ConversationStats {
    let mut roles = RoleCounts::default();
    let mut reasoning_messages = 0;
    for m in ordered {
        roles.record(m.message.role_kind());
        if m.message.first_part().is_some_and(has_reasoning) {
            reasoning_messages += 1;
        }
    }

    let timestamps = ordered.iter().filter_map(|m| m.message.timestamp());
    let (start_time, end_time) = timestamps.fold((None, None), |(lo, hi), ts| {
        (
            Some(lo.map_or(ts, |l: DateTime<Utc>| l.min(ts))),
            Some(hi.map_or(ts, |h: DateTime<Utc>| h.max(ts))),
        )
    });

    ConversationStats {
        message_count: ordered.len(),
        branch_count: branch_count(mapping),
        favorite_count: overlay.favorite_count(),
        node_count: mapping.len(),
        roles,
        reasoning_messages,
        max_depth: max_depth(mapping),
        degenerate: TraversalMode::detect(mapping).is_degenerate(),
        start_time,
        end_time,
    }
}

/// Short preview of a conversation for listings.
///
/// Takes the first content part of the first message node in key order,
/// unsanitized, cut to `max_chars` characters with `...` appended when cut.
/// `None` when the conversation has no messages.
#[must_use]
pub fn conversation_preview(mapping: &Mapping, max_chars: usize) -> Option<String> {
    let (_, message) = mapping.message_nodes().next()?;
    let text = message.first_part().unwrap_or_default();
    Some(truncate_chars(text, max_chars, "..."))
}
