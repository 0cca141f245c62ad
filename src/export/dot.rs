//! Graphviz DOT encoding of the graph view.

use std::io::Write;

use crate::error::{Result, ViewerError};

use super::{Exporter, Projection};

/// DOT exporter for graph projections.
#[derive(Debug, Clone)]
pub struct DotExporter {
    graph_name: String,
}

impl Default for DotExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DotExporter {
    /// Create a new DOT exporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph_name: "conversation".to_string(),
        }
    }

    /// Set the digraph name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.graph_name = name.into();
        self
    }
}

impl Exporter for DotExporter {
    fn export<W: Write>(&self, projection: &Projection, writer: &mut W) -> Result<()> {
        let Projection::Graph(graph) = projection else {
            return Err(ViewerError::Unsupported {
                feature: format!("DOT output for the {} view", projection.kind()),
            });
        };
        writer.write_all(graph.to_dot(&self.graph_name).as_bytes())?;
        Ok(())
    }
}
