//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic. Shared loading of the conversation,
//! configuration and overlay lives here.

pub mod config;
pub mod delete;
pub mod favorite;
pub mod graph;
pub mod stats;
pub mod table;
pub mod views;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::ViewerSession;
use crate::cli::{Cli, InputArgs, OutputFormat};
use crate::config::Config;
use crate::error::{Result, ViewerError};
use crate::export::{Exporter, JsonExporter, Projection, TextExporter};
use crate::model::ConversationDocument;
use crate::overlay::{default_overlay_path, OverlayStore, PersistStatus, StoreHooks};
use crate::parser::DocumentParser;

/// Whether the input argument means stdin.
#[must_use]
pub fn is_stdin(input: &Path) -> bool {
    input.as_os_str() == "-"
}

/// Load the configuration for an input.
///
/// `--config` wins; otherwise the global config merged with a
/// `.chainview.toml` next to the input file.
pub fn load_config(cli: &Cli, input: Option<&Path>) -> Result<Config> {
    if let Some(path) = &cli.config {
        return Config::load_from(path);
    }
    let dir = input
        .filter(|p| !is_stdin(p))
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Config::load_for_dir(dir)
}

/// Read and parse a conversation from a file or stdin.
pub fn read_document(input: &Path) -> Result<ConversationDocument> {
    let mut parser = DocumentParser::new();
    if is_stdin(input) {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| ViewerError::io("Failed to read stdin", e))?;
        parser.parse_str(&content)
    } else {
        parser.parse_file(input)
    }
}

/// Key under which an input's overlay is stored: its canonical path.
pub fn overlay_key(input: &Path) -> Result<String> {
    let path = input.canonicalize().map_err(|e| {
        ViewerError::io(format!("Failed to resolve path: {}", input.display()), e)
    })?;
    Ok(path.display().to_string())
}

/// Resolve the overlay store path from CLI and config.
pub fn overlay_store_path(cli: &Cli, config: &Config) -> Result<PathBuf> {
    match cli.overlay_file.as_ref().or(config.overlay.path.as_ref()) {
        Some(path) => Ok(path.clone()),
        None => default_overlay_path(),
    }
}

/// A session prepared for a command, with the configuration it used.
pub struct CommandContext {
    /// The session over the input conversation.
    pub session: ViewerSession,
    /// Effective configuration.
    pub config: Config,
    /// Outcome of the overlay writes, when the session persists them.
    pub persist: Option<PersistStatus>,
}

impl CommandContext {
    /// Fail if any overlay change did not reach the store.
    pub fn check_persisted(&self) -> Result<()> {
        self.persist.as_ref().map_or(Ok(()), PersistStatus::check)
    }
}

/// Load input, configuration and stored overlay into a session.
///
/// The overlay is read for file inputs unless disabled; stdin inputs have
/// no stable key and start with an empty overlay. The session's hooks
/// write through to the store.
pub fn open_session(cli: &Cli, args: &InputArgs) -> Result<CommandContext> {
    let config = load_config(cli, Some(&args.input))?;
    let document = read_document(&args.input)?;
    let mut session = ViewerSession::new(document)
        .with_options(config.projection_options())
        .with_view(config.view.default);
    session.set_search(cli.search_term());

    let mut persist = None;
    if config.overlay.enabled && !args.no_overlay && !is_stdin(&args.input) {
        let store_path = overlay_store_path(cli, &config)?;
        let key = overlay_key(&args.input)?;
        let overlay = OverlayStore::load_from(&store_path)?.overlay(&key);
        debug!(store = %store_path.display(), favorites = overlay.favorite_count(), "overlay loaded");
        let hooks = StoreHooks::new(store_path, key);
        persist = Some(hooks.status());
        session = session.with_overlay(overlay).with_hooks(hooks);
    }

    Ok(CommandContext {
        session,
        config,
        persist,
    })
}

/// Print a projection in the CLI output format.
pub fn print_projection(cli: &Cli, projection: &Projection) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.effective_output() {
        OutputFormat::Json => JsonExporter::new().pretty(true).export(projection, &mut out)?,
        OutputFormat::Text => TextExporter::new()
            .with_thinking(cli.thinking)
            .export(projection, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
