//! chain-viewer: explore exported AI conversation trees.
//!
//! An exported conversation is a flat mapping of node id to node, linked by
//! parent references into a branching tree. This crate re-derives readable
//! projections of that tree on demand: a structural outline, a linear chat
//! log, a table and a graph of nodes and edges, plus aggregate statistics
//! and a search filter that narrows every projection consistently.
//!
//! # Quick Start (High-Level API)
//!
//! ```rust,no_run
//! use chain_viewer::api::ViewerSession;
//! use chain_viewer::export::ViewKind;
//!
//! fn main() -> chain_viewer::Result<()> {
//!     let mut session = ViewerSession::open("conversation.json")?;
//!     session.select_view(ViewKind::Graph);
//!     let graph = session.render();
//!     println!("{}", serde_json::to_string_pretty(&graph)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`model`]: Mapping, nodes and messages
//! - [`parser`]: Tolerant decoding of export documents
//! - [`sanitize`]: Stripping of reasoning markup from message text
//! - [`reconstruction`]: Root discovery, ordered walk and outline
//! - [`analytics`]: Message, branch and favorite counts
//! - [`search`]: The shared case-insensitive search predicate
//! - [`export`]: The four projectors and their encoders
//! - [`overlay`]: Favorite and delete markers, hooks and their store
//! - [`surface`]: External graph rendering surfaces
//! - [`api`]: The viewer session tying it together
//! - [`cli`]: Command-line interface
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//!
//! # Low-Level Example
//!
//! ```rust
//! use chain_viewer::{analytics::compute_stats, overlay::Overlay, parser::parse_document};
//! use chain_viewer::reconstruction::ordered_messages;
//!
//! let doc = parse_document(r#"{"mapping": {
//!     "a": {"parent": null, "children": ["b", "c"]},
//!     "b": {"parent": "a", "message": {"author": {"role": "user"},
//!           "content": {"parts": ["hi"]}, "create_time": 10}},
//!     "c": {"parent": "a", "message": {"author": {"role": "assistant"},
//!           "content": {"parts": ["yo"]}, "create_time": 5}}
//! }}"#).unwrap();
//!
//! let ids: Vec<_> = ordered_messages(&doc.mapping).iter().map(|m| m.node_id).collect();
//! assert_eq!(ids, ["c", "b"]);
//! assert_eq!(compute_stats(&doc.mapping, &Overlay::new()).branch_count, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod overlay;
pub mod parser;
pub mod reconstruction;
pub mod sanitize;
pub mod search;
pub mod surface;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{Result, ViewerError};
pub use model::{ConversationDocument, Mapping, Message, Node};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analytics::{compute_stats, ConversationStats};
    pub use crate::api::ViewerSession;
    pub use crate::error::{Result, ViewerError};
    pub use crate::export::{project, Projection, ProjectionOptions, ViewKind};
    pub use crate::model::{ConversationDocument, Mapping, Message, Node, Role};
    pub use crate::overlay::{Overlay, OverlayHooks};
    pub use crate::parser::{parse_document, DocumentParser};
    pub use crate::reconstruction::{ordered_messages, tree_outline, OrderedMessage};
    pub use crate::sanitize::sanitize;
    pub use crate::search::SearchFilter;
}
