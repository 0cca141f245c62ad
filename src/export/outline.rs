//! Tree view: the structural outline with overlay flags.

use serde::Serialize;

use crate::model::Mapping;
use crate::overlay::Overlay;
use crate::reconstruction::{tree_outline, OutlineEntry};
use crate::sanitize::split_reasoning;
use crate::search::SearchFilter;

/// One item of the tree view.
///
/// Items are listed in pre-order; `parent` names the nearest visible
/// ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    /// Node id.
    pub node_id: String,
    /// Nearest visible ancestor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Raw author role.
    pub author: String,
    /// Sanitized first content part.
    pub content: String,
    /// Body of the first thinking block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Structural depth (0 = child of the root).
    pub depth: usize,
    /// Node is a favorite.
    pub favorite: bool,
    /// Node is marked deleted.
    pub deleted: bool,
}

impl OutlineItem {
    fn from_entry(entry: &OutlineEntry<'_>, overlay: &Overlay) -> Self {
        let flags = overlay.flags(entry.node_id);
        let split = split_reasoning(entry.message.first_part().unwrap_or_default());
        Self {
            node_id: entry.node_id.to_string(),
            parent: entry.parent.map(str::to_string),
            author: entry.message.role().to_string(),
            content: split.answer,
            thinking: split.thinking,
            depth: entry.depth,
            favorite: flags.favorite,
            deleted: flags.deleted,
        }
    }
}

/// Project the tree view.
#[must_use]
pub fn project_outline(
    mapping: &Mapping,
    filter: &SearchFilter,
    overlay: &Overlay,
) -> Vec<OutlineItem> {
    tree_outline(mapping, filter)
        .entries
        .iter()
        .map(|entry| OutlineItem::from_entry(entry, overlay))
        .collect()
}
