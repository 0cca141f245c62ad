//! External graph rendering surfaces.
//!
//! A surface draws [`GraphData`] somewhere outside the engine: a window, a
//! browser canvas, a file. The engine never depends on a concrete drawing
//! technology; it only mounts and disposes surfaces through
//! [`RenderSurface`].
//!
//! [`GraphMount`] owns at most one mounted surface. Mounting again
//! disposes the previous surface first, and dropping the mount disposes
//! whatever is still active.

mod dot;

pub use dot::*;

use std::fmt;

use tracing::{debug, warn};

use crate::error::Result;
use crate::export::GraphData;

/// Handle of a mounted surface instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// A rendering surface for graph data.
pub trait RenderSurface {
    /// Draw `graph`, returning a handle for later disposal.
    fn mount(&mut self, graph: &GraphData) -> Result<SurfaceId>;

    /// Release a mounted instance. Unknown ids are ignored.
    fn dispose(&mut self, id: SurfaceId);
}

/// Scoped owner of a single mounted surface.
pub struct GraphMount {
    surface: Box<dyn RenderSurface>,
    active: Option<SurfaceId>,
    last_error: Option<String>,
}

impl fmt::Debug for GraphMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphMount")
            .field("active", &self.active)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl GraphMount {
    /// Wrap a surface. Nothing is mounted yet.
    #[must_use]
    pub fn new(surface: Box<dyn RenderSurface>) -> Self {
        Self {
            surface,
            active: None,
            last_error: None,
        }
    }

    /// Dispose the active instance, if any, then mount `graph`.
    ///
    /// A mount failure is recorded in [`GraphMount::last_error`] and
    /// returned; the mount is left with nothing active.
    pub fn remount(&mut self, graph: &GraphData) -> Result<SurfaceId> {
        self.unmount();
        match self.surface.mount(graph) {
            Ok(id) => {
                debug!(%id, nodes = graph.nodes.len(), edges = graph.edges.len(), "graph mounted");
                self.active = Some(id);
                self.last_error = None;
                Ok(id)
            }
            Err(e) => {
                warn!(error = %e, "graph surface failed to mount");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Dispose the active instance.
    pub fn unmount(&mut self) {
        if let Some(id) = self.active.take() {
            debug!(%id, "disposing graph surface");
            self.surface.dispose(id);
        }
    }

    /// Currently mounted instance.
    #[must_use]
    pub const fn active(&self) -> Option<SurfaceId> {
        self.active
    }

    /// Message of the last mount failure, cleared by a successful mount.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Drop for GraphMount {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::ViewerError;

    /// Surface that records mount/dispose events.
    #[derive(Debug, Default, Clone)]
    pub struct RecordingSurface {
        pub events: Rc<RefCell<Vec<String>>>,
        pub fail: bool,
        pub next: u64,
    }

    impl RenderSurface for RecordingSurface {
        fn mount(&mut self, graph: &GraphData) -> Result<SurfaceId> {
            if self.fail {
                return Err(ViewerError::surface("canvas unavailable"));
            }
            self.next += 1;
            self.events
                .borrow_mut()
                .push(format!("mount:{}:{}", self.next, graph.nodes.len()));
            Ok(SurfaceId(self.next))
        }

        fn dispose(&mut self, id: SurfaceId) {
            self.events.borrow_mut().push(format!("dispose:{}", id.0));
        }
    }
}
