// Text runner: rows grouped by run_time, each group under a divider and column headings.
// Rows are expected filtered and ordered; output already written is not rolled back on error.

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::formatters::{self, DEFAULT_DISPLAY_WIDTH, RenderOptions};
use crate::models::{Medium, TrackedRow};

const RUN_TIME_FIELD: usize = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub display_width: usize,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_WIDTH,
        }
    }
}

pub fn render(out: &mut dyn Write, rows: &[TrackedRow], options: &TextOptions) -> Result<()> {
    let detail = RenderOptions {
        display_width: options.display_width,
        header: false,
    };
    let header = RenderOptions {
        header: true,
        ..detail
    };

    let mut run_time: Option<DateTime<Utc>> = None;
    for row in rows {
        let render_row = formatters::renderer_for(row.collector_kind(), Medium::Text)?;
        if run_time != Some(row.run_time) {
            if run_time.is_some() {
                writeln!(out)?;
            }
            run_time = Some(row.run_time);
            writeln!(out, "{}", divider(&row.run_time, options.display_width))?;
            render_row(out, row, &header)?;
        }
        render_row(out, row, &detail)?;
    }
    Ok(())
}

/// `-- <run_time padded to 27>-----...` spanning `width` columns.
pub fn divider(run_time: &DateTime<Utc>, width: usize) -> String {
    let stamp = run_time.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let dashes = width.saturating_sub(3 + RUN_TIME_FIELD);
    format!("-- {:<f$}{}", stamp, "-".repeat(dashes), f = RUN_TIME_FIELD)
}
