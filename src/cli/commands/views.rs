//! Tree, list and show command implementations.

use crate::cli::{Cli, InputArgs, ShowArgs};
use crate::error::Result;
use crate::export::ViewKind;

use super::{open_session, print_projection};

/// Print one view of the input.
pub fn run(cli: &Cli, args: &InputArgs, view: ViewKind) -> Result<()> {
    let mut ctx = open_session(cli, args)?;
    ctx.session.select_view(view);
    let projection = ctx.session.render();
    print_projection(cli, &projection)
}

/// Print the requested view, or the configured default.
pub fn run_show(cli: &Cli, args: &ShowArgs) -> Result<()> {
    let mut ctx = open_session(cli, &args.input)?;
    let view = args.view.map_or(ctx.config.view.default, ViewKind::from);
    ctx.session.select_view(view);
    let projection = ctx.session.render();
    print_projection(cli, &projection)
}
