//! Graph view: nodes and parent/child edges for an external renderer.
//!
//! Nodes follow the filtered ordered sequence. An edge is emitted for a
//! node only when its parent is also in the node set, so nodes whose
//! parent is structural, filtered out or missing have no inbound edge.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::ProjectionOptions;
use crate::model::{Mapping, Message, Role};
use crate::overlay::Overlay;
use crate::reconstruction::OrderedMessage;
use crate::sanitize::sanitize;
use crate::util::truncate_chars;

/// Default tooltip length, in characters.
pub const DEFAULT_TOOLTIP_CHARS: usize = 100;

/// Default vertical distance between hierarchy levels.
pub const DEFAULT_LEVEL_SEPARATION: u32 = 150;

/// Node colors by role, as CSS-style color strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleColors {
    /// User messages.
    pub user: String,
    /// Assistant messages.
    pub assistant: String,
    /// System messages.
    pub system: String,
    /// Tool messages.
    pub tool: String,
    /// Any other role.
    pub other: String,
}

impl Default for RoleColors {
    fn default() -> Self {
        Self {
            user: "#e0e7ff".to_string(),
            assistant: "#f0fdf4".to_string(),
            system: "#f5f5f5".to_string(),
            tool: "#f5f5f5".to_string(),
            other: "#f0fdf4".to_string(),
        }
    }
}

impl RoleColors {
    /// Color for a role.
    #[must_use]
    pub fn for_role(&self, role: Role) -> &str {
        match role {
            Role::User => &self.user,
            Role::Assistant => &self.assistant,
            Role::System => &self.system,
            Role::Tool => &self.tool,
            Role::Other => &self.other,
        }
    }
}

/// Direction of the hierarchical layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDirection {
    /// Top to bottom.
    #[default]
    #[serde(rename = "UD")]
    UpDown,
    /// Bottom to top.
    #[serde(rename = "DU")]
    DownUp,
    /// Left to right.
    #[serde(rename = "LR")]
    LeftRight,
    /// Right to left.
    #[serde(rename = "RL")]
    RightLeft,
}

impl LayoutDirection {
    /// Graphviz `rankdir` value.
    #[must_use]
    pub const fn rankdir(&self) -> &'static str {
        match self {
            Self::UpDown => "TB",
            Self::DownUp => "BT",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        }
    }
}

/// Layout hints for a hierarchical renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLayout {
    /// Direction of the hierarchy.
    pub direction: LayoutDirection,
    /// Level assignment method.
    pub sort_method: String,
    /// Distance between levels.
    pub level_separation: u32,
    /// Whether the renderer should run a physics simulation.
    pub physics: bool,
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::UpDown,
            sort_method: "directed".to_string(),
            level_separation: DEFAULT_LEVEL_SEPARATION,
            physics: false,
        }
    }
}

/// A graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    /// Node id.
    pub id: String,
    /// Short label derived from the role.
    pub label: String,
    /// Tooltip: sanitized preview of the content.
    pub title: String,
    /// Fill color.
    pub color: String,
    /// Node is a favorite.
    pub favorite: bool,
    /// Node is marked deleted.
    pub deleted: bool,
}

/// A directed parent → child edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    /// Parent node id.
    pub from: String,
    /// Child node id.
    pub to: String,
}

/// Graph view data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphData {
    /// Nodes in chronological order.
    pub nodes: Vec<GraphNode>,
    /// Edges, grouped by child in node order.
    pub edges: Vec<GraphEdge>,
    /// Layout hints.
    pub layout: GraphLayout,
}

impl GraphData {
    /// Render as a Graphviz DOT digraph.
    #[must_use]
    pub fn to_dot(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph \"{}\" {{", dot_escape(name));
        let _ = writeln!(out, "  rankdir={};", self.layout.direction.rankdir());
        let _ = writeln!(
            out,
            "  ranksep={:.2};",
            f64::from(self.layout.level_separation) / 72.0
        );
        let _ = writeln!(out, "  node [shape=circle, style=filled];");

        for node in &self.nodes {
            let mut style = String::from("filled");
            if node.deleted {
                style.push_str(",dashed");
            }
            let _ = write!(
                out,
                "  \"{}\" [label=\"{}\", tooltip=\"{}\", fillcolor=\"{}\", style=\"{}\"",
                dot_escape(&node.id),
                dot_escape(&node.label),
                dot_escape(&node.title),
                dot_escape(&node.color),
                style,
            );
            if node.favorite {
                out.push_str(", peripheries=2");
            }
            out.push_str("];\n");
        }

        for edge in &self.edges {
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\";",
                dot_escape(&edge.from),
                dot_escape(&edge.to)
            );
        }

        out.push_str("}\n");
        out
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Short node label: `U`, `A`, `S`, `T`, else the uppercased first letter.
#[must_use]
pub fn node_label(message: &Message) -> String {
    match message.role_kind() {
        Role::User => "U".to_string(),
        Role::Assistant => "A".to_string(),
        Role::System => "S".to_string(),
        Role::Tool => "T".to_string(),
        Role::Other => message
            .role()
            .chars()
            .next()
            .map_or_else(|| "?".to_string(), |c| c.to_uppercase().collect()),
    }
}

/// Project the graph view from an already filtered ordered sequence.
#[must_use]
pub fn project_graph(
    mapping: &Mapping,
    messages: &[OrderedMessage<'_>],
    overlay: &Overlay,
    options: &ProjectionOptions,
) -> GraphData {
    let members: HashSet<&str> = messages.iter().map(|m| m.node_id).collect();

    let nodes = messages
        .iter()
        .map(|m| {
            let flags = overlay.flags(m.node_id);
            let preview = sanitize(m.message.first_part().unwrap_or_default());
            GraphNode {
                id: m.node_id.to_string(),
                label: node_label(m.message),
                title: truncate_chars(&preview, options.tooltip_chars, "..."),
                color: options.colors.for_role(m.message.role_kind()).to_string(),
                favorite: flags.favorite,
                deleted: flags.deleted,
            }
        })
        .collect();

    let edges = messages
        .iter()
        .filter_map(|m| {
            let parent = mapping.get(m.node_id)?.parent_id()?;
            members.contains(parent).then(|| GraphEdge {
                from: parent.to_string(),
                to: m.node_id.to_string(),
            })
        })
        .collect();

    GraphData {
        nodes,
        edges,
        layout: options.layout.clone(),
    }
}
