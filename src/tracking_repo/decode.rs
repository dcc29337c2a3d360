// SqliteRow -> TrackedRow

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::error::{Error, Result};
use crate::models::{CollectorKind, SeriesIdent, TrackedRow, VolumeStats};

pub(super) fn parse_row(kind: CollectorKind, row: &SqliteRow) -> Result<TrackedRow> {
    let ident = SeriesIdent {
        server: row.try_get("server")?,
        database_name: row.try_get("database_name")?,
        table_name: row.try_get("table_name")?,
    };
    let run_time = run_time_from_secs(row.try_get("run_time")?)?;
    match kind {
        CollectorKind::Volume => {
            let stats = VolumeStats {
                data_length: non_negative(row.try_get("data_length")?),
                index_length: non_negative(row.try_get("index_length")?),
                data_free: non_negative(row.try_get("data_free")?),
            };
            Ok(TrackedRow::volume(ident, run_time, stats))
        }
        CollectorKind::Definition => {
            let create_syntax: Option<String> = row.try_get("create_syntax")?;
            Ok(TrackedRow::definition(ident, run_time, create_syntax))
        }
    }
}

fn run_time_from_secs(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        Error::Storage(sqlx::Error::Decode(
            format!("run_time {} out of range", secs).into(),
        ))
    })
}

/// Negative byte counts are treated as unknown.
fn non_negative(v: Option<i64>) -> Option<u64> {
    v.and_then(|n| u64::try_from(n).ok())
}
