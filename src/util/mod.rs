//! Utility functions shared across the crate.
//!
//! - Atomic file writes for the config and overlay stores
//! - Character-safe truncation for previews and table cells

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, ViewerError};

/// Atomically write content to a file.
///
/// Content goes to a temporary file in the target directory first and is
/// then renamed over the target, so readers never observe a partial file.
/// Missing parent directories are created.
///
/// ```rust,no_run
/// use chain_viewer::util::atomic_write;
///
/// atomic_write("config.toml", b"[display]\n").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ViewerError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    // Same directory keeps the rename on one filesystem
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        ViewerError::io(
            format!("Failed to create temporary file in: {}", parent.display()),
            e,
        )
    })?;

    temp_file.write_all(content).map_err(|e| {
        ViewerError::io(
            format!("Failed to write to temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.flush().map_err(|e| {
        ViewerError::io(
            format!("Failed to flush temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        ViewerError::io(
            format!("Failed to atomically write file: {}", path.display()),
            e.error,
        )
    })?;

    Ok(())
}

/// Cut `text` to at most `max_chars` characters.
///
/// Returns the text unchanged when it fits; otherwise the first `max_chars`
/// characters followed by `suffix`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize, suffix: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], suffix),
        None => text.to_string(),
    }
}

/// Collapse all runs of whitespace (including newlines) into single spaces.
#[must_use]
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
