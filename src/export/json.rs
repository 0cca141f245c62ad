//! JSON encoding of projections.
//!
//! The output is the serde form of [`Projection`], tagged with the view
//! name: `{"view": "list", "rows": [...]}`. Graph projections serialize as
//! `{"view": "graph", "nodes": [...], "edges": [...], "layout": {...}}`.

use std::io::Write;

use serde::Serialize;

use crate::error::{Result, ViewerError};

use super::{Exporter, Projection};

/// JSON exporter for projections.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    /// Pretty-print the JSON output.
    pretty: bool,
}

impl JsonExporter {
    /// Create a new JSON exporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Write any serializable value followed by a newline.
    pub fn write_value<W: Write, T: Serialize + ?Sized>(
        &self,
        writer: &mut W,
        value: &T,
    ) -> Result<()> {
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)
        } else {
            serde_json::to_writer(&mut *writer, value)
        };
        result.map_err(|e| ViewerError::SerializationError {
            context: "Failed to write JSON".to_string(),
            source: e,
        })?;
        writeln!(writer)?;
        Ok(())
    }
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, projection: &Projection, writer: &mut W) -> Result<()> {
        self.write_value(writer, projection)
    }
}
