//! A surface that renders the graph to a Graphviz DOT file.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{RenderSurface, SurfaceId};
use crate::error::Result;
use crate::export::GraphData;
use crate::util::atomic_write;

/// Writes each mounted graph to a DOT file, replacing the previous one.
///
/// Disposal only forgets the instance; the file is left in place for
/// external tools to pick up.
#[derive(Debug, Clone)]
pub struct DotFileSurface {
    path: PathBuf,
    graph_name: String,
    next_id: u64,
    mounted: Option<SurfaceId>,
}

impl DotFileSurface {
    /// Render into `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            graph_name: "conversation".to_string(),
            next_id: 0,
            mounted: None,
        }
    }

    /// Set the digraph name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.graph_name = name.into();
        self
    }

    /// Output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSurface for DotFileSurface {
    fn mount(&mut self, graph: &GraphData) -> Result<SurfaceId> {
        atomic_write(&self.path, graph.to_dot(&self.graph_name).as_bytes())?;
        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        self.mounted = Some(id);
        info!(path = %self.path.display(), "graph written");
        Ok(id)
    }

    fn dispose(&mut self, id: SurfaceId) {
        if self.mounted == Some(id) {
            self.mounted = None;
        }
    }
}
