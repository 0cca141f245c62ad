//! Conversation nodes and message payloads.
//!
//! Every field is decoded permissively: exports produced by different tools
//! omit fields, write explicit `null`s, or put non-text items into
//! `content.parts`. None of that is an error at this layer.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Back-reference from a node to its parent.
///
/// Exports distinguish an explicit `"parent": null` (the conversation root)
/// from a node that carries no `parent` field at all. Only the former is
/// ever treated as the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The field was absent from the node.
    #[default]
    Missing,
    /// Explicit `null`: this node is the conversation root.
    Root,
    /// Id of the parent node.
    Id(String),
}

impl Parent {
    /// Parent node id, if one is set.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Root | Self::Missing => None,
        }
    }

    /// Whether this is an explicit root marker.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// Whether the field was absent.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl<'de> Deserialize<'de> for Parent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // An absent field never reaches here; `#[serde(default)]` yields `Missing`.
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => Self::Root,
            Some(Value::String(id)) => Self::Id(id),
            Some(other) => Self::Id(other.to_string()),
        })
    }
}

impl Serialize for Parent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Id(id) => serializer.serialize_str(id),
            Self::Root | Self::Missing => serializer.serialize_none(),
        }
    }
}

/// A single node of the conversation mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Id as written inside the node. The mapping key is authoritative.
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Link to the parent node.
    #[serde(default, skip_serializing_if = "Parent::is_missing")]
    pub parent: Parent,

    /// Child ids in creation order.
    #[serde(default, deserialize_with = "lenient_children")]
    pub children: Vec<String>,

    /// Message payload; `None` for structural placeholder nodes.
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: Option<Message>,
}

impl Node {
    /// Create a root node (explicit `null` parent).
    #[must_use]
    pub fn root() -> Self {
        Self {
            parent: Parent::Root,
            ..Self::default()
        }
    }

    /// Create a node linked to `parent`.
    #[must_use]
    pub fn child_of(parent: impl Into<String>) -> Self {
        Self {
            parent: Parent::Id(parent.into()),
            ..Self::default()
        }
    }

    /// Builder: set the child ids.
    #[must_use]
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: attach a message payload.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// Parent id, if linked.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.id()
    }

    /// Whether this node carries a message.
    #[must_use]
    pub const fn has_message(&self) -> bool {
        self.message.is_some()
    }

    /// Number of extra branches started at this node.
    #[must_use]
    pub fn extra_branches(&self) -> usize {
        self.children.len().saturating_sub(1)
    }
}

/// Coarse classification of `author.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human turn.
    User,
    /// Model turn.
    Assistant,
    /// System prompt or instructions.
    System,
    /// Tool output.
    Tool,
    /// Anything else.
    Other,
}

impl Role {
    /// Classify a raw role string (case-insensitive).
    #[must_use]
    pub fn from_role(role: &str) -> Self {
        match role.to_ascii_lowercase().as_str() {
            "user" | "human" => Self::User,
            "assistant" | "model" => Self::Assistant,
            "system" => Self::System,
            "tool" => Self::Tool,
            _ => Self::Other,
        }
    }
}

/// Author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Raw role string (`user`, `assistant`, `system`, ...).
    #[serde(default = "unknown_role", deserialize_with = "role_or_unknown")]
    pub role: String,
}

impl Default for Author {
    fn default() -> Self {
        Self {
            role: unknown_role(),
        }
    }
}

/// Message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Text parts in order.
    #[serde(default, deserialize_with = "lenient_parts")]
    pub parts: Vec<String>,
}

/// Message payload carried by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message author.
    #[serde(default, deserialize_with = "object_or_default")]
    pub author: Author,
    /// Message body.
    #[serde(default, deserialize_with = "object_or_default")]
    pub content: Content,
    /// Creation time in unix seconds (fractional allowed).
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub create_time: Option<f64>,
}

impl Message {
    /// Create a message with one text part.
    #[must_use]
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: Author { role: role.into() },
            content: Content {
                parts: vec![text.into()],
            },
            create_time: None,
        }
    }

    /// Builder: set the creation time.
    #[must_use]
    pub fn at(mut self, create_time: f64) -> Self {
        self.create_time = Some(create_time);
        self
    }

    /// Builder: append a content part.
    #[must_use]
    pub fn with_part(mut self, part: impl Into<String>) -> Self {
        self.content.parts.push(part.into());
        self
    }

    /// Raw role string.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.author.role
    }

    /// Classified role.
    #[must_use]
    pub fn role_kind(&self) -> Role {
        Role::from_role(&self.author.role)
    }

    /// First content part, the one search and projections operate on.
    #[must_use]
    pub fn first_part(&self) -> Option<&str> {
        self.content.parts.first().map(String::as_str)
    }

    /// Sort key for chronological ordering; missing or non-finite
    /// timestamps sort as zero.
    #[must_use]
    pub fn sort_key(&self) -> f64 {
        self.create_time.filter(|t| t.is_finite()).unwrap_or(0.0)
    }

    /// Creation time as a UTC timestamp (seconds × 1000 as epoch millis).
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let secs = self.create_time?;
        if !secs.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis((secs * 1000.0) as i64)
    }
}

fn unknown_role() -> String {
    "unknown".to_string()
}

/// Decode a nested object, falling back to the default for `null` or any
/// value of the wrong shape.
fn object_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => T::deserialize(value).unwrap_or_default(),
        _ => T::default(),
    })
}

fn lenient_message<'de, D>(deserializer: D) -> Result<Option<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Message::deserialize(value).ok(),
        _ => None,
    })
}

/// Strings and numbers name nodes; anything else is dropped.
fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(id_from_value(Value::deserialize(deserializer)?))
}

fn lenient_children<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(id_from_value).collect(),
        _ => Vec::new(),
    })
}

fn role_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(role) if !role.is_empty() => role,
        _ => unknown_role(),
    })
}

fn lenient_parts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let parts = match Value::deserialize(deserializer)? {
        Value::Array(parts) => parts,
        Value::String(text) => vec![Value::String(text)],
        _ => Vec::new(),
    };
    Ok(parts
        .into_iter()
        .filter_map(|part| match part {
            Value::Null => None,
            Value::String(text) => Some(text),
            other => Some(other.to_string()),
        })
        .collect())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}
