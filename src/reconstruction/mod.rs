//! Conversation traversal.
//!
//! This module handles:
//! - Locating the conversation root
//! - Walking the tree into the canonical chronological message sequence
//! - Falling back to a flat scan when the export has no root
//! - Building the structural outline (see [`tree_outline`])
//!
//! Nothing here fails. Missing or inconsistent structure degrades to a
//! smaller result, never to an error.

mod tree;

pub use tree::*;

use serde::Serialize;
use tracing::debug;

use crate::model::{Mapping, Message};

/// A message together with the id of the node carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrderedMessage<'a> {
    /// Node id.
    pub node_id: &'a str,
    /// The message payload.
    pub message: &'a Message,
}

/// How the ordered sequence was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode<'a> {
    /// Pre-order walk from this root.
    Rooted(&'a str),
    /// No root: every message node in key order. Best-effort.
    Degenerate,
}

impl TraversalMode<'_> {
    /// Detect the mode for a mapping.
    #[must_use]
    pub fn detect(mapping: &Mapping) -> TraversalMode<'_> {
        mapping
            .root_id()
            .map_or(TraversalMode::Degenerate, TraversalMode::Rooted)
    }

    /// Whether this is the flat fallback.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate)
    }
}

/// Compute the canonical ordered message sequence of a mapping.
///
/// 1. With a root, walk it in pre-order following stored `children` order,
///    collecting nodes that carry a message.
/// 2. Without a root, collect every message node in key order.
/// 3. Stable-sort by `create_time` ascending; missing timestamps count as 0,
///    ties keep discovery order.
#[must_use]
pub fn ordered_messages(mapping: &Mapping) -> Vec<OrderedMessage<'_>> {
    let mut messages = discovery_order(mapping);
    messages.sort_by(|a, b| a.message.sort_key().total_cmp(&b.message.sort_key()));
    messages
}

/// Message nodes in discovery order, before the chronological sort.
#[must_use]
pub fn discovery_order(mapping: &Mapping) -> Vec<OrderedMessage<'_>> {
    match TraversalMode::detect(mapping) {
        TraversalMode::Rooted(root) => DepthFirstIter::new(mapping, root)
            .filter_map(|(node_id, node, _)| {
                node.message
                    .as_ref()
                    .map(|message| OrderedMessage { node_id, message })
            })
            .collect(),
        TraversalMode::Degenerate => {
            debug!(
                nodes = mapping.len(),
                "no root node found, falling back to flat key-order scan"
            );
            mapping
                .message_nodes()
                .map(|(node_id, message)| OrderedMessage { node_id, message })
                .collect()
        }
    }
}

/// Depth of the deepest node reachable from the root (root = 0).
#[must_use]
pub fn max_depth(mapping: &Mapping) -> usize {
    match mapping.root_id() {
        Some(root) => DepthFirstIter::new(mapping, root)
            .map(|(_, _, depth)| depth)
            .max()
            .unwrap_or(0),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn ids<'a>(messages: &[OrderedMessage<'a>]) -> Vec<&'a str> {
        messages.iter().map(|m| m.node_id).collect()
    }

    #[test]
    fn test_scenario_sorted_by_create_time() {
        let mapping = Mapping::new()
            .with_node("A", Node::root().with_children(["B", "C"]))
            .with_node(
                "B",
                Node::child_of("A").with_message(Message::new("user", "hi").at(10.0)),
            )
            .with_node(
                "C",
                Node::child_of("A").with_message(Message::new("assistant", "yo").at(5.0)),
            );

        let ordered = ordered_messages(&mapping);
        assert_eq!(ids(&ordered), vec!["C", "B"]);
    }

    #[test]
    fn test_missing_timestamp_sorts_as_zero_and_is_stable() {
        let mapping = Mapping::new()
            .with_node("r", Node::root().with_children(["x", "y", "z"]))
            .with_node("x", Node::child_of("r").with_message(Message::new("user", "x").at(3.0)))
            .with_node("y", Node::child_of("r").with_message(Message::new("user", "y")))
            .with_node("z", Node::child_of("r").with_message(Message::new("user", "z").at(0.0)));

        assert_eq!(ids(&ordered_messages(&mapping)), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_unreachable_nodes_are_not_collected() {
        let mapping = Mapping::new()
            .with_node("r", Node::root().with_children(["a", "dangling"]))
            .with_node("a", Node::child_of("r").with_message(Message::new("user", "a")))
            .with_node("island", Node::child_of("nowhere").with_message(Message::new("user", "i")));

        assert_eq!(ids(&ordered_messages(&mapping)), vec!["a"]);
    }

    #[test]
    fn test_degenerate_mode_collects_everything() {
        let mapping = Mapping::new()
            .with_node("b", Node::child_of("a").with_message(Message::new("assistant", "2").at(2.0)))
            .with_node("a", Node::child_of("b").with_message(Message::new("user", "1").at(1.0)))
            .with_node("s", Node::child_of("a"));

        assert!(TraversalMode::detect(&mapping).is_degenerate());
        assert_eq!(ids(&discovery_order(&mapping)), vec!["b", "a"]);
        assert_eq!(ids(&ordered_messages(&mapping)), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_mapping() {
        assert!(ordered_messages(&Mapping::new()).is_empty());
        assert_eq!(max_depth(&Mapping::new()), 0);
    }

    #[test]
    fn test_max_depth() {
        let mapping = Mapping::new()
            .with_node("r", Node::root().with_children(["a"]))
            .with_node("a", Node::child_of("r").with_children(["b"]))
            .with_node("b", Node::child_of("a"));
        assert_eq!(max_depth(&mapping), 2);
    }
}
