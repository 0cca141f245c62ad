//! Table view: the chat log as cells.

use serde::Serialize;

use super::{message_timestamp, ProjectionOptions};
use crate::overlay::Overlay;
use crate::reconstruction::OrderedMessage;
use crate::sanitize::sanitize;
use crate::util::{single_line, truncate_chars};

/// Default display width of the content cell, in characters.
pub const DEFAULT_TABLE_WIDTH: usize = 60;

/// One row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Node id.
    pub node_id: String,
    /// Raw author role.
    pub author: String,
    /// Sanitized content on one line, cut to the table width with `…`.
    pub display: String,
    /// Full sanitized content.
    pub content: String,
    /// Raw first content part, for the copy action.
    pub copy_text: String,
    /// Rendered creation time, or "No timestamp".
    pub timestamp: String,
    /// Node is a favorite.
    pub favorite: bool,
    /// Node is marked deleted.
    pub deleted: bool,
}

/// Project the table view from an already filtered ordered sequence.
#[must_use]
pub fn project_table(
    messages: &[OrderedMessage<'_>],
    overlay: &Overlay,
    options: &ProjectionOptions,
) -> Vec<TableRow> {
    messages
        .iter()
        .map(|m| {
            let raw = m.message.first_part().unwrap_or_default();
            let content = sanitize(raw);
            let flags = overlay.flags(m.node_id);
            TableRow {
                node_id: m.node_id.to_string(),
                author: m.message.role().to_string(),
                display: truncate_chars(&single_line(&content), options.table_width, "…"),
                content,
                copy_text: raw.to_string(),
                timestamp: message_timestamp(m.message, options.timestamps),
                favorite: flags.favorite,
                deleted: flags.deleted,
            }
        })
        .collect()
}
