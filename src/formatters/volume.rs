// Volume rows as text columns: table, data, index, free, total

use std::io::{self, Write};

use super::{RenderOptions, fit, name_width};
use crate::models::TrackedRow;

const SIZE_COLUMN: usize = 9;
const SIZE_COLUMNS: usize = 4;

pub fn render_text(out: &mut dyn Write, row: &TrackedRow, opts: &RenderOptions) -> io::Result<()> {
    let w = name_width(opts.display_width, SIZE_COLUMNS * (SIZE_COLUMN + 1));
    if opts.header {
        return writeln!(
            out,
            "{:<w$} {:>s$} {:>s$} {:>s$} {:>s$}",
            "table",
            "data",
            "index",
            "free",
            "total",
            w = w,
            s = SIZE_COLUMN
        );
    }
    let Some(v) = row.volume_stats() else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a volume row", row.ident),
        ));
    };
    let name = fit(&row.ident.key(), w);
    if v.is_unreachable() {
        return writeln!(out, "{:<w$} {:>s$}", name, "unreachable", w = w, s = SIZE_COLUMN);
    }
    writeln!(
        out,
        "{:<w$} {:>s$} {:>s$} {:>s$} {:>s$}",
        name,
        human_bytes(v.data_length),
        human_bytes(v.index_length),
        human_bytes(v.data_free),
        human_bytes(v.total()),
        w = w,
        s = SIZE_COLUMN
    )
}

/// 1023 -> "1023B", 1536 -> "1.5K"; unknown -> "-".
pub fn human_bytes(bytes: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["K", "M", "G", "T", "P"];
    let Some(bytes) = bytes else {
        return "-".to_string();
    };
    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}
