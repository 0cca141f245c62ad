//! List view: a chronological chat log.

use serde::Serialize;

use super::{message_timestamp, ProjectionOptions};
use crate::model::Role;
use crate::overlay::Overlay;
use crate::reconstruction::OrderedMessage;
use crate::sanitize::split_reasoning;

/// One row of the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    /// Node id.
    pub node_id: String,
    /// Raw author role.
    pub author: String,
    /// Avatar letter: `U` for user, `A` otherwise.
    pub avatar: char,
    /// Sanitized first content part.
    pub content: String,
    /// Body of the first thinking block, for a collapsed reasoning section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Rendered creation time, or "No timestamp".
    pub timestamp: String,
    /// Node is a favorite.
    pub favorite: bool,
    /// Node is marked deleted.
    pub deleted: bool,
}

/// Avatar letter for a role.
#[must_use]
pub const fn avatar(role: Role) -> char {
    match role {
        Role::User => 'U',
        _ => 'A',
    }
}

/// Project the list view from an already filtered ordered sequence.
#[must_use]
pub fn project_list(
    messages: &[OrderedMessage<'_>],
    overlay: &Overlay,
    options: &ProjectionOptions,
) -> Vec<ListRow> {
    messages
        .iter()
        .map(|m| {
            let flags = overlay.flags(m.node_id);
            let split = split_reasoning(m.message.first_part().unwrap_or_default());
            ListRow {
                node_id: m.node_id.to_string(),
                author: m.message.role().to_string(),
                avatar: avatar(m.message.role_kind()),
                content: split.answer,
                thinking: split.thinking,
                timestamp: message_timestamp(m.message, options.timestamps),
                favorite: flags.favorite,
                deleted: flags.deleted,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::NO_TIMESTAMP;
    use crate::model::Message;

    #[test]
    fn test_list_rows() {
        let user = Message::new("user", "  hi  ").at(0.0);
        let tool = Message::new("tool", "<thinking> add it up </thinking><answer>42</answer>");
        let messages = [
            OrderedMessage {
                node_id: "u",
                message: &user,
            },
            OrderedMessage {
                node_id: "t",
                message: &tool,
            },
        ];
        let overlay = Overlay::new().with_favorites(["t"]);

        let rows = project_list(&messages, &overlay, &ProjectionOptions::default());
        assert_eq!(rows[0].avatar, 'U');
        assert_eq!(rows[0].content, "hi");
        assert_eq!(rows[0].timestamp, "1970-01-01 00:00:00 UTC");
        assert_eq!(rows[1].avatar, 'A');
        assert_eq!(rows[0].thinking, None);
        assert_eq!(rows[1].content, "42");
        assert_eq!(rows[1].thinking.as_deref(), Some("add it up"));
        assert_eq!(rows[1].timestamp, NO_TIMESTAMP);
        assert!(rows[1].favorite);
    }
}
