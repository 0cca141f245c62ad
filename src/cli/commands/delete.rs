//! Delete command implementation.
//!
//! Deletion is advisory: the marker is stored in the overlay and the node
//! keeps appearing in every view, flagged as deleted.

use serde_json::json;

use crate::cli::{Cli, DeleteArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::overlay::OverlayStore;

use super::favorite::open_marking_session;
use super::{overlay_key, overlay_store_path};

/// Run the delete command.
pub fn run(cli: &Cli, args: &DeleteArgs) -> Result<()> {
    let mut ctx = open_marking_session(cli, &args.mark)?;

    if args.restore {
        restore(cli, args, &ctx.config)?;
    } else {
        for node_id in &args.mark.node_ids {
            ctx.session.delete(node_id)?;
        }
        ctx.check_persisted()?;
    }

    match cli.effective_output() {
        OutputFormat::Json => {
            let value = json!({
                "node_ids": args.mark.node_ids,
                "deleted": !args.restore,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let verb = if args.restore { "Restored" } else { "Marked deleted" };
            for id in &args.mark.node_ids {
                println!("{verb}: {id}");
            }
        }
    }

    Ok(())
}

/// Withdraw delete markers directly in the store; there is no hook for it.
///
/// Nodes without a marker are left alone.
fn restore(cli: &Cli, args: &DeleteArgs, config: &Config) -> Result<()> {
    let path = overlay_store_path(cli, config)?;
    let key = overlay_key(&args.mark.input)?;
    let mut store = OverlayStore::load_from(&path)?;
    let overlay = store.overlay_mut(&key);
    for node_id in &args.mark.node_ids {
        overlay.restore(node_id);
    }
    store.cleanup();
    store.save_to(&path)
}
