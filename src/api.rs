//! High-level programmatic API for chain-viewer.
//!
//! [`ViewerSession`] holds one loaded conversation together with the
//! search term, the selected view, the overlay and the callback hooks,
//! and recomputes projections from scratch whenever it is asked to render.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use chain_viewer::api::ViewerSession;
//! use chain_viewer::export::ViewKind;
//!
//! fn main() -> chain_viewer::Result<()> {
//!     let mut session = ViewerSession::open("conversation.json")?;
//!
//!     let stats = session.stats();
//!     println!("{} messages, {} branches", stats.message_count, stats.branch_count);
//!
//!     session.set_search("rust");
//!     session.select_view(ViewKind::List);
//!     let projection = session.render();
//!     println!("{} matching messages", projection.node_ids().len());
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;

use tracing::{debug, instrument};

use crate::analytics::{compute_stats, ConversationStats};
use crate::error::{Result, ViewerError};
use crate::export::{project, Projection, ProjectionOptions, ViewKind};
use crate::model::ConversationDocument;
use crate::overlay::{NoopHooks, Overlay, OverlayHooks};
use crate::parser::DocumentParser;
use crate::reconstruction::{ordered_messages, OrderedMessage};
use crate::search::SearchFilter;
use crate::surface::{GraphMount, RenderSurface};

/// One interactive viewing session over a loaded conversation.
pub struct ViewerSession {
    document: ConversationDocument,
    filter: SearchFilter,
    view: ViewKind,
    overlay: Overlay,
    options: ProjectionOptions,
    hooks: Box<dyn OverlayHooks>,
    graph: Option<GraphMount>,
}

impl fmt::Debug for ViewerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerSession")
            .field("title", &self.document.display_title())
            .field("nodes", &self.document.mapping.len())
            .field("search", &self.filter.term())
            .field("view", &self.view)
            .field("overlay", &self.overlay)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}

impl ViewerSession {
    /// Start a session over an already parsed document.
    #[must_use]
    pub fn new(document: ConversationDocument) -> Self {
        Self {
            document,
            filter: SearchFilter::all(),
            view: ViewKind::default(),
            overlay: Overlay::new(),
            options: ProjectionOptions::default(),
            hooks: Box::new(NoopHooks),
            graph: None,
        }
    }

    /// Parse a JSON document and start a session over it.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(Self::new(DocumentParser::new().parse_str(content)?))
    }

    /// Read and parse an export file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(DocumentParser::new().parse_file(path)?))
    }

    /// Builder: start with this overlay.
    #[must_use]
    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlay = overlay;
        self
    }

    /// Builder: report favorite/delete intent to these hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl OverlayHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Builder: projector options.
    #[must_use]
    pub fn with_options(mut self, options: ProjectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Builder: initially selected view.
    #[must_use]
    pub fn with_view(mut self, view: ViewKind) -> Self {
        self.view = view;
        self
    }

    /// Builder: mount graph renders on this surface.
    #[must_use]
    pub fn with_surface(mut self, surface: Box<dyn RenderSurface>) -> Self {
        self.graph = Some(GraphMount::new(surface));
        self
    }

    /// Replace the loaded conversation wholesale.
    ///
    /// The overlay is replaced too, since it is keyed by the old
    /// conversation's node ids. Search term and view are kept.
    pub fn load(&mut self, document: ConversationDocument, overlay: Overlay) {
        debug!(
            nodes = document.mapping.len(),
            title = document.display_title(),
            "conversation loaded"
        );
        if let Some(graph) = self.graph.as_mut() {
            graph.unmount();
        }
        self.document = document;
        self.overlay = overlay;
    }

    /// The loaded document.
    #[must_use]
    pub const fn document(&self) -> &ConversationDocument {
        &self.document
    }

    /// Current overlay.
    #[must_use]
    pub const fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Set the search term; an empty term matches everything.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter = SearchFilter::new(term);
    }

    /// Current search term.
    #[must_use]
    pub fn search(&self) -> &str {
        self.filter.term()
    }

    /// Select the view [`ViewerSession::render`] produces.
    ///
    /// Leaving the graph view disposes any mounted graph surface.
    pub fn select_view(&mut self, view: ViewKind) {
        if self.view == ViewKind::Graph && view != ViewKind::Graph {
            if let Some(graph) = self.graph.as_mut() {
                graph.unmount();
            }
        }
        self.view = view;
    }

    /// Selected view.
    #[must_use]
    pub const fn view(&self) -> ViewKind {
        self.view
    }

    /// The unfiltered ordered message sequence.
    #[must_use]
    pub fn ordered(&self) -> Vec<OrderedMessage<'_>> {
        ordered_messages(&self.document.mapping)
    }

    /// Statistics for the loaded conversation. Independent of the search.
    #[must_use]
    pub fn stats(&self) -> ConversationStats {
        compute_stats(&self.document.mapping, &self.overlay)
    }

    /// Project any view with the current search, overlay and options.
    #[must_use]
    pub fn project(&self, view: ViewKind) -> Projection {
        project(
            view,
            &self.document.mapping,
            &self.filter,
            &self.overlay,
            &self.options,
        )
    }

    /// Project the selected view.
    ///
    /// For the graph view the result is also mounted on the configured
    /// surface, replacing the previous mount. A surface failure does not
    /// fail the render; it is available from
    /// [`ViewerSession::surface_error`].
    pub fn render(&mut self) -> Projection {
        let projection = self.project(self.view);
        debug!(
            view = %self.view,
            search = self.filter.term(),
            entries = projection.node_ids().len(),
            "projection recomputed"
        );

        if let (Projection::Graph(graph), Some(mount)) = (&projection, self.graph.as_mut()) {
            // Failure is recorded on the mount and logged there
            let _ = mount.remount(graph);
        }

        projection
    }

    /// Last graph surface failure, if the latest mount failed.
    #[must_use]
    pub fn surface_error(&self) -> Option<&str> {
        self.graph.as_ref().and_then(GraphMount::last_error)
    }

    /// Flip the favorite marker of a node and notify the hooks.
    ///
    /// Returns the new favorite state.
    pub fn toggle_favorite(&mut self, node_id: &str) -> Result<bool> {
        self.ensure_node(node_id)?;
        let favorite = self.overlay.toggle_favorite(node_id);
        debug!(node_id, favorite, "favorite toggled");
        self.hooks.on_toggle_favorite(node_id, favorite);
        Ok(favorite)
    }

    /// Record delete intent for a node and notify the hooks.
    ///
    /// The node stays in every projection, flagged as deleted.
    pub fn delete(&mut self, node_id: &str) -> Result<()> {
        self.ensure_node(node_id)?;
        self.overlay.mark_deleted(node_id);
        debug!(node_id, "delete requested");
        self.hooks.on_delete(node_id);
        Ok(())
    }

    fn ensure_node(&self, node_id: &str) -> Result<()> {
        if self.document.mapping.contains(node_id) {
            Ok(())
        } else {
            Err(ViewerError::NodeNotFound {
                node_id: node_id.to_string(),
            })
        }
    }
}
