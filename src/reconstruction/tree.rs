//! Structural walks over a mapping.
//!
//! Walks follow each node's stored `children` order, skip dangling
//! references, and visit every node at most once so that a malformed export
//! with a cycle cannot loop forever.

use std::collections::HashSet;

use crate::model::{Mapping, Message, Node};
use crate::search::SearchFilter;

/// Iterator over mapping nodes in depth-first pre-order.
///
/// Yields `(id, node, depth)` with the start node at depth 0.
pub struct DepthFirstIter<'a> {
    mapping: &'a Mapping,
    stack: Vec<(&'a str, usize)>,
    visited: HashSet<&'a str>,
}

impl<'a> DepthFirstIter<'a> {
    /// Walk the subtree rooted at `start`.
    pub fn new(mapping: &'a Mapping, start: &'a str) -> Self {
        Self {
            mapping,
            stack: vec![(start, 0)],
            visited: HashSet::new(),
        }
    }
}

impl<'a> Iterator for DepthFirstIter<'a> {
    type Item = (&'a str, &'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = self.mapping.get(id) else {
                continue;
            };
            // Push children in reverse so they come off the stack in order
            let children: Vec<_> = self.mapping.children_of(id).map(|(c, _)| c).collect();
            for child_id in children.into_iter().rev() {
                if !self.visited.contains(child_id) {
                    self.stack.push((child_id, depth + 1));
                }
            }
            return Some((id, node, depth));
        }
        None
    }
}

/// One visible node of the structural outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry<'a> {
    /// Node id.
    pub node_id: &'a str,
    /// The node's message.
    pub message: &'a Message,
    /// Structural depth below the root's children (0 = top level).
    pub depth: usize,
    /// Nearest visible ancestor; `None` at the top level.
    pub parent: Option<&'a str>,
}

/// Result of the structural outline walk.
///
/// Entries are flat, in pre-order. The hierarchy is carried by each entry's
/// `parent`, so arbitrarily deep conversations never need deep recursion to
/// build, render or drop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline<'a> {
    /// Root the outline hangs from; `None` in degenerate mode.
    pub root_id: Option<&'a str>,
    /// Visible entries in pre-order.
    pub entries: Vec<OutlineEntry<'a>>,
}

impl<'a> Outline<'a> {
    /// Whether the mapping had no root and the outline is flat.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.root_id.is_none()
    }

    /// Total number of visible entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visible node ids in pre-order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&'a str> {
        self.entries.iter().map(|e| e.node_id).collect()
    }

    /// Entries without a visible ancestor.
    pub fn top_level(&self) -> impl Iterator<Item = &OutlineEntry<'a>> + '_ {
        self.entries.iter().filter(|e| e.parent.is_none())
    }

    /// Entries whose nearest visible ancestor is `id`, in order.
    pub fn children_of<'s>(&'s self, id: &'s str) -> impl Iterator<Item = &'s OutlineEntry<'a>> + 's {
        self.entries.iter().filter(move |e| e.parent == Some(id))
    }
}

/// Build the structural outline of a mapping.
///
/// The walk starts at the root's children; the root itself is not part of
/// the outline. Stored `children` order is kept. A node is visible when it
/// has a message matching `filter`. Invisible nodes do not hide their
/// descendants: visible descendants are lifted into the nearest visible
/// ancestor (or the top level) and keep their structural depth.
///
/// Without a root the outline is flat: every matching message node in key
/// order at depth 0.
#[must_use]
pub fn tree_outline<'a>(mapping: &'a Mapping, filter: &SearchFilter) -> Outline<'a> {
    let Some(root_id) = mapping.root_id() else {
        let entries = mapping
            .message_nodes()
            .filter(|(_, message)| filter.matches(message))
            .map(|(node_id, message)| OutlineEntry {
                node_id,
                message,
                depth: 0,
                parent: None,
            })
            .collect();
        return Outline {
            root_id: None,
            entries,
        };
    };

    let mut entries = Vec::new();
    // Visible ancestors of the walk position, innermost last
    let mut ancestors: Vec<(&str, usize)> = Vec::new();

    for (node_id, node, walk_depth) in DepthFirstIter::new(mapping, root_id).skip(1) {
        let depth = walk_depth.saturating_sub(1);
        while ancestors.last().is_some_and(|&(_, d)| d >= depth) {
            ancestors.pop();
        }
        let Some(message) = node.message.as_ref().filter(|m| filter.matches(m)) else {
            continue;
        };
        entries.push(OutlineEntry {
            node_id,
            message,
            depth,
            parent: ancestors.last().map(|&(id, _)| id),
        });
        ancestors.push((node_id, depth));
    }

    Outline {
        root_id: Some(root_id),
        entries,
    }
}
