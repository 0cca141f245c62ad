//! Favorite command implementation.

use serde_json::json;

use crate::cli::{Cli, InputArgs, MarkArgs, OutputFormat};
use crate::error::{Result, ViewerError};

use super::{is_stdin, open_session, CommandContext};

/// Open a session whose hooks persist to the overlay store.
pub(super) fn open_marking_session(cli: &Cli, args: &MarkArgs) -> Result<CommandContext> {
    if is_stdin(&args.input) {
        return Err(ViewerError::Unsupported {
            feature: "overlay markers for stdin input".to_string(),
        });
    }
    let input = InputArgs {
        input: args.input.clone(),
        no_overlay: false,
    };
    let ctx = open_session(cli, &input)?;
    if !ctx.config.overlay.enabled {
        return Err(ViewerError::InvalidConfig {
            message: "overlay persistence is disabled (overlay.enabled = false)".to_string(),
        });
    }
    Ok(ctx)
}

/// Run the favorite command.
pub fn run(cli: &Cli, args: &MarkArgs) -> Result<()> {
    let mut ctx = open_marking_session(cli, args)?;

    let mut results = Vec::with_capacity(args.node_ids.len());
    for node_id in &args.node_ids {
        let favorite = ctx.session.toggle_favorite(node_id)?;
        results.push((node_id.as_str(), favorite));
    }
    ctx.check_persisted()?;

    match cli.effective_output() {
        OutputFormat::Json => {
            let value: Vec<_> = results
                .iter()
                .map(|(id, favorite)| json!({ "node_id": id, "favorite": favorite }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            for (id, favorite) in &results {
                if *favorite {
                    println!("★ {id} added to favorites");
                } else {
                    println!("  {id} removed from favorites");
                }
            }
            println!("Favorites: {}", ctx.session.overlay().favorite_count());
        }
    }

    Ok(())
}
