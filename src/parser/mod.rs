//! Parsing of exported conversation documents.
//!
//! Two document shapes are accepted:
//!
//! - a bare export: `{ "title": "...", "mapping": { ... } }`
//! - a backend export envelope:
//!   `{ "title": "...", "exportDate": "...", "conversation": { "mapping": { ... } } }`
//!
//! Validation is all-or-nothing. Invalid JSON or a missing `mapping` is
//! reported once and nothing downstream runs on the input. Everything inside
//! a well-formed mapping is decoded permissively (see [`crate::model`]).
//!
//! # Example
//!
//! ```rust
//! use chain_viewer::parser::DocumentParser;
//!
//! let json = r#"{"mapping": {"root": {"parent": null, "children": []}}}"#;
//! let mut parser = DocumentParser::new();
//! let doc = parser.parse_str(json)?;
//! assert_eq!(doc.mapping.len(), 1);
//! # Ok::<(), chain_viewer::ViewerError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::error::{Result, ViewerError};
use crate::model::{ConversationDocument, Mapping, Node};

/// Default maximum file size (unlimited).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 0;

/// Statistics gathered while parsing a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Bytes read.
    pub bytes_read: usize,
    /// Nodes in the mapping.
    pub nodes: usize,
    /// Nodes carrying a message.
    pub message_nodes: usize,
    /// Child references that point outside the mapping.
    pub dangling_children: usize,
    /// Mapping entries that were not objects and became empty nodes.
    pub malformed_nodes: usize,
    /// Whether the document used the backend export envelope.
    pub envelope: bool,
}

/// Parser for conversation export documents.
#[derive(Debug)]
pub struct DocumentParser {
    /// Maximum file size in bytes (0 = unlimited).
    max_file_size: u64,
    /// Statistics about the last parse.
    stats: ParseStats,
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentParser {
    /// Create a new parser with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            stats: ParseStats::default(),
        }
    }

    /// Set the maximum accepted file size in bytes (0 = unlimited).
    #[must_use]
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// Statistics about the last parse.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Parse a document from a file path.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<ConversationDocument> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ViewerError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        if self.max_file_size > 0 {
            let size = std::fs::metadata(path)
                .map_err(|e| ViewerError::io(format!("Failed to stat {}", path.display()), e))?
                .len();
            if size > self.max_file_size {
                return Err(ViewerError::invalid_document(format!(
                    "{} is {} bytes, above the {} byte limit",
                    path.display(),
                    size,
                    self.max_file_size
                )));
            }
        }

        let file = File::open(path)
            .map_err(|e| ViewerError::io(format!("Failed to open {}", path.display()), e))?;
        self.parse_reader(BufReader::new(file))
    }

    /// Parse a document from any reader.
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> Result<ConversationDocument> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|e| ViewerError::io("Failed to read conversation document", e))?;
        self.parse_str(&content)
    }

    /// Parse a document from a string.
    pub fn parse_str(&mut self, content: &str) -> Result<ConversationDocument> {
        self.stats = ParseStats {
            bytes_read: content.len(),
            ..ParseStats::default()
        };

        let value: Value = serde_json::from_str(content)
            .map_err(|e| ViewerError::parse_with_source("Invalid JSON format", e))?;
        self.parse_value(value)
    }

    /// Validate and decode an already-parsed JSON value.
    pub fn parse_value(&mut self, value: Value) -> Result<ConversationDocument> {
        let Value::Object(mut root) = value else {
            return Err(ViewerError::invalid_document(
                "document root is not a JSON object",
            ));
        };

        let title = take_string(&mut root, "title");
        let export_date = take_string(&mut root, "exportDate");

        let mapping_value = match root.remove("mapping") {
            Some(mapping) => mapping,
            None => match root.remove("conversation") {
                Some(Value::Object(mut conversation)) => {
                    self.stats.envelope = true;
                    conversation.remove("mapping").unwrap_or(Value::Null)
                }
                _ => Value::Null,
            },
        };

        let entries = match mapping_value {
            Value::Null => return Err(ViewerError::invalid_document("missing 'mapping' field")),
            Value::Object(entries) => entries,
            _ => return Err(ViewerError::invalid_document("'mapping' is not an object")),
        };

        let mut mapping = Mapping::new();
        for (id, node) in entries {
            let node = match node {
                node @ Value::Object(_) => Node::deserialize(node).map_err(|e| {
                    ViewerError::parse_with_source(format!("Malformed node '{id}' in 'mapping'"), e)
                })?,
                _ => {
                    self.stats.malformed_nodes += 1;
                    Node::default()
                }
            };
            mapping.insert(id, node);
        }
        if self.stats.malformed_nodes > 0 {
            warn!(
                count = self.stats.malformed_nodes,
                "mapping entries are not objects; they are kept as empty nodes"
            );
        }

        self.stats.nodes = mapping.len();
        self.stats.message_nodes = mapping.message_nodes().count();
        self.stats.dangling_children = mapping.dangling_children().len();

        if self.stats.dangling_children > 0 {
            warn!(
                count = self.stats.dangling_children,
                "mapping references children that do not exist; they will be skipped"
            );
        }
        debug!(
            nodes = self.stats.nodes,
            messages = self.stats.message_nodes,
            envelope = self.stats.envelope,
            "parsed conversation document"
        );

        Ok(ConversationDocument {
            title,
            export_date,
            mapping,
        })
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Parse a document from a string with default settings.
pub fn parse_document(content: &str) -> Result<ConversationDocument> {
    DocumentParser::new().parse_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_bare_document() {
        let json = r#"{
            "title": "Demo",
            "mapping": {
                "root": {"id": "root", "parent": null, "children": ["a"]},
                "a": {"id": "a", "parent": "root", "children": [],
                      "message": {"author": {"role": "user"}, "content": {"parts": ["hi"]}, "create_time": 10}}
            }
        }"#;

        let mut parser = DocumentParser::new();
        let doc = parser.parse_str(json).unwrap();

        assert_eq!(doc.title.as_deref(), Some("Demo"));
        assert_eq!(doc.mapping.len(), 2);
        assert_eq!(parser.stats().message_nodes, 1);
        assert!(!parser.stats().envelope);
    }

    #[test]
    fn test_parse_export_envelope() {
        let json = r#"{
            "title": "Exported",
            "exportDate": "2025-01-01T00:00:00",
            "conversation": {"mapping": {"root": {"parent": null}}}
        }"#;

        let mut parser = DocumentParser::new();
        let doc = parser.parse_str(json).unwrap();

        assert_eq!(doc.title.as_deref(), Some("Exported"));
        assert_eq!(doc.export_date.as_deref(), Some("2025-01-01T00:00:00"));
        assert_eq!(doc.mapping.root_id(), Some("root"));
        assert!(parser.stats().envelope);
    }

    #[test]
    fn test_missing_mapping_rejected() {
        let err = parse_document(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidDocument { .. }));

        let err = parse_document(r#"{"mapping": null}"#).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidDocument { .. }));

        let err = parse_document(r#"{"mapping": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidDocument { .. }));
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = parse_document("{not json").unwrap_err();
        assert!(matches!(err, ViewerError::ParseError { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_parse_reader_counts_dangling() {
        let json = r#"{"mapping": {"root": {"parent": null, "children": ["gone"]}}}"#;
        let mut parser = DocumentParser::new();
        parser.parse_reader(Cursor::new(json)).unwrap();
        assert_eq!(parser.stats().dangling_children, 1);
    }

    #[test]
    fn test_non_object_entries_become_empty_nodes() {
        let json = r#"{"mapping": {
            "root": {"parent": null, "children": ["a", 2]},
            "a": "not a node",
            "2": {"parent": "root", "message": {"content": "flat"}},
            "b": null
        }}"#;
        let mut parser = DocumentParser::new();
        let doc = parser.parse_str(json).unwrap();

        assert_eq!(doc.mapping.len(), 4);
        assert_eq!(parser.stats().malformed_nodes, 2);
        assert_eq!(doc.mapping.get("root").unwrap().children, vec!["a", "2"]);
        assert!(!doc.mapping.get("a").unwrap().has_message());
        assert_eq!(doc.mapping.message("2").unwrap().first_part(), None);
    }

    #[test]
    fn test_parse_file_not_found() {
        let mut parser = DocumentParser::new();
        let err = parser.parse_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ViewerError::FileNotFound { .. }));
    }

    #[test]
    fn test_max_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        std::fs::write(&path, r#"{"mapping": {}}"#).unwrap();

        let mut parser = DocumentParser::new().with_max_file_size(4);
        assert!(parser.parse_file(&path).is_err());

        let mut parser = DocumentParser::new();
        assert!(parser.parse_file(&path).unwrap().mapping.is_empty());
    }
}
