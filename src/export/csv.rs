//! CSV encoding of the table view.
//!
//! Fields are quoted when they contain the delimiter, the quote character
//! or a line break; embedded quotes are doubled. The `content` column holds
//! the full sanitized text, so rows may span several physical lines.

use std::io::Write;

use crate::error::{Result, ViewerError};

use super::{Exporter, Projection, TableRow};

/// Field delimiter.
const DELIMITER: char = ',';

/// Quote character.
const QUOTE: char = '"';

/// CSV exporter for table rows.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new CSV exporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Escape a field value for CSV.
    fn escape_field(&self, value: &str) -> String {
        let needs_quoting = value.contains(DELIMITER)
            || value.contains(QUOTE)
            || value.contains('\n')
            || value.contains('\r');

        if needs_quoting {
            let escaped = value.replace(QUOTE, &format!("{QUOTE}{QUOTE}"));
            format!("{QUOTE}{escaped}{QUOTE}")
        } else {
            value.to_string()
        }
    }

    /// Write a CSV row.
    fn write_row<W: Write>(&self, writer: &mut W, fields: &[&str]) -> Result<()> {
        let line: Vec<String> = fields.iter().map(|f| self.escape_field(f)).collect();
        writeln!(writer, "{}", line.join(&DELIMITER.to_string()))?;
        Ok(())
    }

    /// Write table rows.
    pub fn export_rows<W: Write>(&self, rows: &[TableRow], writer: &mut W) -> Result<()> {
        self.write_row(
            writer,
            &["node_id", "author", "timestamp", "content", "favorite", "deleted"],
        )?;

        for row in rows {
            self.write_row(
                writer,
                &[
                    &row.node_id,
                    &row.author,
                    &row.timestamp,
                    &row.content,
                    bool_field(row.favorite),
                    bool_field(row.deleted),
                ],
            )?;
        }

        Ok(())
    }
}

const fn bool_field(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, projection: &Projection, writer: &mut W) -> Result<()> {
        match projection {
            Projection::Table { rows } => self.export_rows(rows, writer),
            other => Err(ViewerError::Unsupported {
                feature: format!("CSV output for the {} view", other.kind()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(content: &str) -> TableRow {
        TableRow {
            node_id: "n1".to_string(),
            author: "user".to_string(),
            display: content.to_string(),
            content: content.to_string(),
            copy_text: content.to_string(),
            timestamp: "No timestamp".to_string(),
            favorite: true,
            deleted: false,
        }
    }

    #[test]
    fn test_escape_field() {
        let exporter = CsvExporter::new();
        assert_eq!(exporter.escape_field("plain"), "plain");
        assert_eq!(exporter.escape_field("a,b"), "\"a,b\"");
        assert_eq!(exporter.escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(exporter.escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_export_table() {
        let projection = Projection::Table {
            rows: vec![row("hello, world")],
        };
        let mut out = Vec::new();
        CsvExporter::new().export(&projection, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "node_id,author,timestamp,content,favorite,deleted");
        assert_eq!(lines[1], "n1,user,No timestamp,\"hello, world\",true,false");
    }

    #[test]
    fn test_other_views_unsupported() {
        let projection = Projection::List { rows: Vec::new() };
        let err = CsvExporter::new()
            .export(&projection, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, ViewerError::Unsupported { .. }));
    }
}
