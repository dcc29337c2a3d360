// Definition rows as text: table and whether a CREATE statement was captured

use std::io::{self, Write};

use super::{RenderOptions, fit, name_width};
use crate::models::{Measurement, TrackedRow};

const STATUS_COLUMN: usize = 24;

pub fn render_text(out: &mut dyn Write, row: &TrackedRow, opts: &RenderOptions) -> io::Result<()> {
    let w = name_width(opts.display_width, STATUS_COLUMN + 1);
    if opts.header {
        return writeln!(out, "{:<w$} {:>s$}", "table", "status", w = w, s = STATUS_COLUMN);
    }
    let Measurement::Definition(def) = &row.measurement else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a definition row", row.ident),
        ));
    };
    let status = match &def.create_syntax {
        Some(sql) => format!("defined ({} bytes)", sql.len()),
        None => "unreachable".to_string(),
    };
    writeln!(
        out,
        "{:<w$} {:>s$}",
        fit(&row.ident.key(), w),
        status,
        w = w,
        s = STATUS_COLUMN
    )
}
