//! Graph command implementation.

use std::io::{self, Write};

use crate::cli::{Cli, GraphArgs};
use crate::error::{Result, ViewerError};
use crate::export::{DotExporter, Exporter, ViewKind};
use crate::surface::DotFileSurface;

use super::{open_session, print_projection};

/// Run the graph command.
pub fn run(cli: &Cli, args: &GraphArgs) -> Result<()> {
    let mut ctx = open_session(cli, &args.input)?;
    let name = ctx.session.document().display_title().to_string();

    if let Some(path) = &args.out {
        let surface = DotFileSurface::new(path).with_name(name.clone());
        ctx.session = ctx.session.with_surface(Box::new(surface));
    }

    ctx.session.select_view(ViewKind::Graph);
    let projection = ctx.session.render();

    if let Some(error) = ctx.session.surface_error() {
        return Err(ViewerError::surface(error.to_string()));
    }

    if args.dot {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        DotExporter::new().with_name(name).export(&projection, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    if let Some(path) = &args.out {
        eprintln!("Graph written to {}", path.display());
    }
    print_projection(cli, &projection)
}
