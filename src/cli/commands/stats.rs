//! Stats command implementation.
//!
//! Displays message, branch and favorite counts for one conversation.

use serde::Serialize;

use crate::analytics::{conversation_preview, ConversationStats};
use crate::cli::{Cli, InputArgs, OutputFormat};
use crate::error::Result;
use crate::export::{format_timestamp, ViewKind};

use super::open_session;

/// JSON output of the stats command.
#[derive(Debug, Serialize)]
struct StatsOutput<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matching_messages: Option<usize>,
    #[serde(flatten)]
    stats: &'a ConversationStats,
}

/// Run the stats command.
pub fn run(cli: &Cli, args: &InputArgs) -> Result<()> {
    let ctx = open_session(cli, args)?;
    let session = &ctx.session;
    let document = session.document();
    let stats = session.stats();
    let preview = conversation_preview(&document.mapping, ctx.config.display.preview_chars);
    let matching = (!cli.search_term().is_empty())
        .then(|| session.project(ViewKind::List).node_ids().len());

    match cli.effective_output() {
        OutputFormat::Json => {
            let output = StatsOutput {
                title: document.display_title(),
                export_date: document.export_date.as_deref(),
                preview,
                matching_messages: matching,
                stats: &stats,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("{}", document.display_title());
            println!("{}", "=".repeat(document.display_title().chars().count()));
            if let Some(preview) = &preview {
                println!("{preview}");
            }
            println!();

            println!("Messages:  {:>8}", stats.message_count);
            if let Some(matching) = matching {
                println!("  Matching \"{}\": {matching}", cli.search_term());
            }
            println!("  User:      {:>6}", stats.roles.user);
            println!("  Assistant: {:>6}", stats.roles.assistant);
            let others = stats.roles.system + stats.roles.tool + stats.roles.other;
            if others > 0 {
                println!("  Other:     {others:>6}");
            }
            if stats.reasoning_messages > 0 {
                println!("  With reasoning: {}", stats.reasoning_messages);
            }
            println!("Branches:  {:>8}", stats.branch_count);
            println!("Favorites: {:>8}", stats.favorite_count);
            println!("Nodes:     {:>8}", stats.node_count);
            println!("Max depth: {:>8}", stats.max_depth);

            let style = ctx.config.display.timestamps;
            if let (Some(start), Some(end)) = (stats.start_time, stats.end_time) {
                println!();
                println!("Started: {}", format_timestamp(&start, style));
                println!("Ended:   {}", format_timestamp(&end, style));
            }
            if stats.degenerate {
                println!();
                println!("Note: no root node found; messages were read in document order.");
            }
        }
    }

    Ok(())
}
