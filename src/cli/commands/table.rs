//! Table command implementation.

use std::io::{self, Write};

use crate::cli::{Cli, TableArgs};
use crate::error::{Result, ViewerError};
use crate::export::{CsvExporter, Exporter, ViewKind};

use super::{open_session, print_projection};

/// Run the table command.
pub fn run(cli: &Cli, args: &TableArgs) -> Result<()> {
    let mut ctx = open_session(cli, &args.input)?;
    if let Some(width) = args.width {
        if width == 0 {
            return Err(ViewerError::InvalidConfig {
                message: "--width must be greater than 0".to_string(),
            });
        }
        let options = ctx.config.projection_options().with_table_width(width);
        ctx.session = ctx.session.with_options(options);
    }

    ctx.session.select_view(ViewKind::Table);
    let projection = ctx.session.render();

    if args.csv {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        CsvExporter::new().export(&projection, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    print_projection(cli, &projection)
}
