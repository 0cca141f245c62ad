//! Plain text rendering of projections for the terminal.

use std::io::Write;

use crate::error::Result;
use crate::util::{single_line, truncate_chars};

use super::{Exporter, GraphData, ListRow, OutlineItem, Projection, TableRow};

/// Maximum characters of content per outline or graph line.
const LINE_WIDTH: usize = 80;

/// Indent per outline level.
const INDENT: usize = 2;

/// Outline levels past this one are drawn at the same indent.
const MAX_INDENT_DEPTH: usize = 40;

/// Plain text exporter for projections.
#[derive(Debug, Clone, Default)]
pub struct TextExporter {
    /// Print reasoning blocks under their message instead of hiding them.
    show_thinking: bool,
}

impl TextExporter {
    /// Create a new text exporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Show or hide reasoning blocks.
    #[must_use]
    pub fn with_thinking(mut self, show: bool) -> Self {
        self.show_thinking = show;
        self
    }

    fn clip(&self, text: &str) -> String {
        truncate_chars(&single_line(text), LINE_WIDTH, "…")
    }

    fn write_thinking<W: Write>(
        &self,
        writer: &mut W,
        pad: &str,
        thinking: Option<&str>,
    ) -> Result<()> {
        if let Some(thinking) = thinking.filter(|_| self.show_thinking) {
            writeln!(writer, "{pad}thinking:")?;
            for line in thinking.lines() {
                writeln!(writer, "{pad}  {line}")?;
            }
        }
        Ok(())
    }

    fn write_outline<W: Write>(&self, writer: &mut W, items: &[OutlineItem]) -> Result<()> {
        for item in items {
            let pad = " ".repeat(item.depth.min(MAX_INDENT_DEPTH) * INDENT);
            writeln!(
                writer,
                "{pad}- [{}] {}{}",
                item.author,
                self.clip(&item.content),
                flag_suffix(item.favorite, item.deleted)
            )?;
            self.write_thinking(writer, &format!("{pad}    "), item.thinking.as_deref())?;
        }
        Ok(())
    }

    fn write_list<W: Write>(&self, writer: &mut W, rows: &[ListRow]) -> Result<()> {
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            writeln!(
                writer,
                "({}) {} · {}{}",
                row.avatar,
                row.author,
                row.timestamp,
                flag_suffix(row.favorite, row.deleted)
            )?;
            self.write_thinking(writer, "    ", row.thinking.as_deref())?;
            for line in row.content.lines() {
                writeln!(writer, "    {line}")?;
            }
        }
        Ok(())
    }

    fn write_table<W: Write>(&self, writer: &mut W, rows: &[TableRow]) -> Result<()> {
        const HEADERS: [&str; 5] = ["NODE", "AUTHOR", "TIMESTAMP", "FLAGS", "CONTENT"];

        let cells: Vec<[String; 5]> = rows
            .iter()
            .map(|row| {
                [
                    row.node_id.clone(),
                    row.author.clone(),
                    row.timestamp.clone(),
                    flags(row.favorite, row.deleted),
                    row.display.clone(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let render = |fields: [&str; 5]| -> String {
            let mut line = String::new();
            for (i, (field, width)) in fields.iter().zip(widths).enumerate() {
                if i + 1 == fields.len() {
                    line.push_str(field);
                } else {
                    let pad = width.saturating_sub(field.chars().count());
                    line.push_str(field);
                    line.push_str(&" ".repeat(pad + 2));
                }
            }
            line
        };

        writeln!(writer, "{}", render(HEADERS))?;
        for row in &cells {
            writeln!(writer, "{}", render(row.each_ref().map(String::as_str)))?;
        }
        Ok(())
    }

    fn write_graph<W: Write>(&self, writer: &mut W, graph: &GraphData) -> Result<()> {
        writeln!(
            writer,
            "{} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        )?;
        for node in &graph.nodes {
            writeln!(
                writer,
                "  {} [{}] {}{}",
                node.id,
                node.label,
                self.clip(&node.title),
                flag_suffix(node.favorite, node.deleted)
            )?;
        }
        for edge in &graph.edges {
            writeln!(writer, "  {} -> {}", edge.from, edge.to)?;
        }
        Ok(())
    }
}

fn flags(favorite: bool, deleted: bool) -> String {
    match (favorite, deleted) {
        (true, true) => "★ ✗".to_string(),
        (true, false) => "★".to_string(),
        (false, true) => "✗".to_string(),
        (false, false) => String::new(),
    }
}

fn flag_suffix(favorite: bool, deleted: bool) -> String {
    let f = flags(favorite, deleted);
    if f.is_empty() {
        f
    } else {
        format!(" {f}")
    }
}

impl Exporter for TextExporter {
    fn export<W: Write>(&self, projection: &Projection, writer: &mut W) -> Result<()> {
        if projection.is_empty() {
            writeln!(writer, "No messages.")?;
            return Ok(());
        }
        match projection {
            Projection::Tree { items } => self.write_outline(writer, items),
            Projection::List { rows } => self.write_list(writer, rows),
            Projection::Table { rows } => self.write_table(writer, rows),
            Projection::Graph(graph) => self.write_graph(writer, graph),
        }
    }
}
