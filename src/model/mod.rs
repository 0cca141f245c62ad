//! Data model for exported conversation trees.
//!
//! An export is a flat [`Mapping`] of node id to [`Node`]. Nodes point at
//! their parent and list their children; together the links form a
//! branching conversation tree. The mapping keeps the key order of the
//! source document so that every walk over it is deterministic.

mod node;

pub use node::*;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keyed collection of conversation nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    nodes: IndexMap<String, Node>,
}

impl Mapping {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: insert a node under `id`.
    #[must_use]
    pub fn with_node(mut self, id: impl Into<String>, node: Node) -> Self {
        self.insert(id, node);
        self
    }

    /// Insert a node, replacing any node with the same id.
    pub fn insert(&mut self, id: impl Into<String>, node: Node) {
        self.nodes.insert(id.into(), node);
    }

    /// Get a node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Whether `id` is a key of the mapping.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Message carried by `id`, if the node exists and has one.
    #[must_use]
    pub fn message(&self, id: &str) -> Option<&Message> {
        self.nodes.get(id).and_then(|n| n.message.as_ref())
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in document key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, node)| (id.as_str(), node))
    }

    /// Iterate message-bearing nodes in document key order.
    pub fn message_nodes(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.iter()
            .filter_map(|(id, node)| node.message.as_ref().map(|m| (id, m)))
    }

    /// Id of the conversation root: the first node, in key order, whose
    /// parent is an explicit `null`.
    #[must_use]
    pub fn root_id(&self) -> Option<&str> {
        self.iter()
            .find(|(_, node)| node.parent.is_root())
            .map(|(id, _)| id)
    }

    /// Children of `id` that exist in the mapping, in stored order.
    ///
    /// Dangling child references are skipped.
    pub fn children_of<'a>(&'a self, id: &str) -> impl Iterator<Item = (&'a str, &'a Node)> + 'a {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.nodes.get_key_value(child.as_str()))
            .map(|(id, node)| (id.as_str(), node))
    }

    /// Parent node of `id`, if linked and present.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<(&str, &Node)> {
        let parent = self.nodes.get(id)?.parent_id()?;
        self.nodes
            .get_key_value(parent)
            .map(|(id, node)| (id.as_str(), node))
    }

    /// Child references that point outside the mapping, as `(parent, child)`.
    #[must_use]
    pub fn dangling_children(&self) -> Vec<(&str, &str)> {
        self.iter()
            .flat_map(|(id, node)| {
                node.children
                    .iter()
                    .filter(|child| !self.nodes.contains_key(child.as_str()))
                    .map(move |child| (id, child.as_str()))
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (K, Node)>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A loaded conversation: the mapping plus document-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationDocument {
    /// Conversation title, when the export carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Export date of a backend export envelope.
    #[serde(rename = "exportDate", skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
    /// The node mapping.
    pub mapping: Mapping,
}

impl ConversationDocument {
    /// Wrap a bare mapping.
    #[must_use]
    pub fn from_mapping(mapping: Mapping) -> Self {
        Self {
            title: None,
            export_date: None,
            mapping,
        }
    }

    /// Title for display, falling back to a generic label.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("Conversation Details")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mapping {
        Mapping::new()
            .with_node("root", Node::root().with_children(["a", "ghost", "b"]))
            .with_node(
                "a",
                Node::child_of("root").with_message(Message::new("user", "hi")),
            )
            .with_node(
                "b",
                Node::child_of("root").with_message(Message::new("assistant", "yo")),
            )
    }

    #[test]
    fn test_root_id() {
        assert_eq!(sample().root_id(), Some("root"));
        assert_eq!(Mapping::new().root_id(), None);
    }

    #[test]
    fn test_children_skip_dangling() {
        let mapping = sample();
        let children: Vec<_> = mapping.children_of("root").map(|(id, _)| id).collect();
        assert_eq!(children, vec!["a", "b"]);
        assert_eq!(mapping.children_of("missing").count(), 0);
        assert_eq!(mapping.dangling_children(), vec![("root", "ghost")]);
    }

    #[test]
    fn test_parent_of() {
        let mapping = sample();
        assert_eq!(mapping.parent_of("a").map(|(id, _)| id), Some("root"));
        assert!(mapping.parent_of("root").is_none());
    }

    #[test]
    fn test_key_order_preserved() {
        let json = r#"{"z": {"parent": null}, "a": {"parent": "z"}, "m": {"parent": "z"}}"#;
        let mapping: Mapping = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = mapping.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_display_title_fallback() {
        let mut doc = ConversationDocument::from_mapping(Mapping::new());
        assert_eq!(doc.display_title(), "Conversation Details");
        doc.title = Some("Agentic RAG".to_string());
        assert_eq!(doc.display_title(), "Agentic RAG");
    }
}
