//! Projections of a conversation and their output encodings.
//!
//! The same logical tree is projected four ways:
//! - Tree: the structural outline, following stored `children` order
//! - List: a chronological chat log
//! - Table: the chat log as cells, with truncated display text
//! - Graph: nodes and parent/child edges for an external renderer
//!
//! Projectors are pure functions of the mapping, the search filter, the
//! overlay and [`ProjectionOptions`]. List, table and graph all consume the
//! same filtered ordered sequence, so their membership is identical for a
//! given search term.
//!
//! Encoders ([`Exporter`] implementations) turn a [`Projection`] into text,
//! JSON, CSV or Graphviz DOT.

mod csv;
mod dot;
mod graph;
mod json;
mod list;
mod outline;
mod table;
mod text;

pub use csv::*;
pub use dot::*;
pub use graph::*;
pub use json::*;
pub use list::*;
pub use outline::*;
pub use table::*;
pub use text::*;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::model::{Mapping, Message};
use crate::overlay::Overlay;
use crate::reconstruction::{ordered_messages, OrderedMessage};
use crate::search::SearchFilter;

/// Text shown in place of a missing timestamp.
pub const NO_TIMESTAMP: &str = "No timestamp";

/// The four views of a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Structural outline.
    #[default]
    Tree,
    /// Chronological chat log.
    List,
    /// Tabular chat log.
    Table,
    /// Node/edge graph.
    Graph,
}

impl ViewKind {
    /// All views, in display order.
    pub const ALL: [Self; 4] = [Self::Tree, Self::List, Self::Table, Self::Graph];

    /// Lowercase name of the view.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::List => "list",
            Self::Table => "table",
            Self::Graph => "graph",
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "tree" | "outline" => Ok(Self::Tree),
            "list" | "chat" => Ok(Self::List),
            "table" => Ok(Self::Table),
            "graph" => Ok(Self::Graph),
            other => Err(ViewerError::InvalidConfig {
                message: format!("unknown view '{other}' (expected tree, list, table or graph)"),
            }),
        }
    }
}

/// How timestamps are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampStyle {
    /// `YYYY-MM-DD HH:MM:SS UTC`.
    #[default]
    Utc,
    /// Local time zone, `YYYY-MM-DD HH:MM:SS`.
    Local,
}

/// Format a timestamp.
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>, style: TimestampStyle) -> String {
    match style {
        TimestampStyle::Utc => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        TimestampStyle::Local => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    }
}

/// Human-readable creation time of a message, or [`NO_TIMESTAMP`].
#[must_use]
pub fn message_timestamp(message: &Message, style: TimestampStyle) -> String {
    message
        .timestamp()
        .map_or_else(|| NO_TIMESTAMP.to_string(), |ts| format_timestamp(&ts, style))
}

/// Options shared by the projectors.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionOptions {
    /// Maximum characters of table display text before the ellipsis.
    pub table_width: usize,
    /// Maximum characters of a graph tooltip before `...`.
    pub tooltip_chars: usize,
    /// Timestamp rendering.
    pub timestamps: TimestampStyle,
    /// Graph node colors by role.
    pub colors: RoleColors,
    /// Graph layout hints.
    pub layout: GraphLayout,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            table_width: DEFAULT_TABLE_WIDTH,
            tooltip_chars: DEFAULT_TOOLTIP_CHARS,
            timestamps: TimestampStyle::Utc,
            colors: RoleColors::default(),
            layout: GraphLayout::default(),
        }
    }
}

impl ProjectionOptions {
    /// Builder: set the table width.
    #[must_use]
    pub fn with_table_width(mut self, width: usize) -> Self {
        self.table_width = width;
        self
    }
}

/// One projected view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Projection {
    /// Outline items.
    Tree {
        /// Items in pre-order.
        items: Vec<OutlineItem>,
    },
    /// Chat log rows.
    List {
        /// Rows in chronological order.
        rows: Vec<ListRow>,
    },
    /// Table rows.
    Table {
        /// Rows in chronological order.
        rows: Vec<TableRow>,
    },
    /// Graph data.
    Graph(GraphData),
}

impl Projection {
    /// Which view this is.
    #[must_use]
    pub const fn kind(&self) -> ViewKind {
        match self {
            Self::Tree { .. } => ViewKind::Tree,
            Self::List { .. } => ViewKind::List,
            Self::Table { .. } => ViewKind::Table,
            Self::Graph(_) => ViewKind::Graph,
        }
    }

    /// Node ids present in the projection.
    #[must_use]
    pub fn node_ids(&self) -> Vec<&str> {
        match self {
            Self::Tree { items } => items.iter().map(|i| i.node_id.as_str()).collect(),
            Self::List { rows } => rows.iter().map(|r| r.node_id.as_str()).collect(),
            Self::Table { rows } => rows.iter().map(|r| r.node_id.as_str()).collect(),
            Self::Graph(graph) => graph.nodes.iter().map(|n| n.id.as_str()).collect(),
        }
    }

    /// Check if the projection has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Tree { items } => items.is_empty(),
            Self::List { rows } => rows.is_empty(),
            Self::Table { rows } => rows.is_empty(),
            Self::Graph(graph) => graph.nodes.is_empty(),
        }
    }
}

/// Project the ordered sequence through a filter.
///
/// This is the shared input of the list, table and graph projectors.
#[must_use]
pub fn filtered_messages<'a>(
    mapping: &'a Mapping,
    filter: &SearchFilter,
) -> Vec<OrderedMessage<'a>> {
    filter.apply(&ordered_messages(mapping))
}

/// Project a mapping into one view.
#[must_use]
pub fn project(
    view: ViewKind,
    mapping: &Mapping,
    filter: &SearchFilter,
    overlay: &Overlay,
    options: &ProjectionOptions,
) -> Projection {
    match view {
        ViewKind::Tree => Projection::Tree {
            items: project_outline(mapping, filter, overlay),
        },
        ViewKind::List => {
            let messages = filtered_messages(mapping, filter);
            Projection::List {
                rows: project_list(&messages, overlay, options),
            }
        }
        ViewKind::Table => {
            let messages = filtered_messages(mapping, filter);
            Projection::Table {
                rows: project_table(&messages, overlay, options),
            }
        }
        ViewKind::Graph => {
            let messages = filtered_messages(mapping, filter);
            Projection::Graph(project_graph(mapping, &messages, overlay, options))
        }
    }
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Human-readable text.
    Text,
    /// Compact JSON.
    Json,
    /// Pretty-printed JSON.
    JsonPretty,
    /// CSV (table view only).
    Csv,
    /// Graphviz DOT (graph view only).
    Dot,
}

impl ExportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json | Self::JsonPretty => "json",
            Self::Csv => "csv",
            Self::Dot => "dot",
        }
    }

    /// Parse format from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "json-pretty" | "jsonpretty" => Some(Self::JsonPretty),
            "csv" => Some(Self::Csv),
            "dot" | "graphviz" | "gv" => Some(Self::Dot),
            _ => None,
        }
    }
}

/// Trait for projection encoders.
pub trait Exporter {
    /// Write a projection to the writer.
    fn export<W: Write>(&self, projection: &Projection, writer: &mut W) -> Result<()>;
}

/// Encode a projection into the writer.
pub fn export_to_writer<W: Write>(
    projection: &Projection,
    format: ExportFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        ExportFormat::Text => TextExporter::new().export(projection, writer),
        ExportFormat::Json => JsonExporter::new().export(projection, writer),
        ExportFormat::JsonPretty => JsonExporter::new().pretty(true).export(projection, writer),
        ExportFormat::Csv => CsvExporter::new().export(projection, writer),
        ExportFormat::Dot => DotExporter::new().export(projection, writer),
    }
}

/// Encode a projection to a string.
pub fn export_to_string(projection: &Projection, format: ExportFormat) -> Result<String> {
    let mut buffer = Vec::new();
    export_to_writer(projection, format, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| ViewerError::surface(format!("non UTF-8 output: {e}")))
}
