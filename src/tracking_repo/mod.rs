// SQLite table-tracking history. One table per collector kind; rows are append-only.
// Collectors write with save_rows; reports read most-recent versions or full history.

mod decode;

use crate::error::{Error, Result};
use crate::models::{CollectorKind, Measurement, SeriesIdent, TrackedRow};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

const VOLUME_COLUMNS: &str =
    "id, server, database_name, table_name, run_time, data_length, index_length, data_free";
const DEFINITION_COLUMNS: &str = "id, server, database_name, table_name, run_time, create_syntax";

fn table_for(kind: CollectorKind) -> (&'static str, &'static str) {
    match kind {
        CollectorKind::Volume => ("table_volumes", VOLUME_COLUMNS),
        CollectorKind::Definition => ("table_definitions", DEFINITION_COLUMNS),
    }
}

/// SQLite INTEGER is signed; larger byte counts are refused rather than wrapped.
fn to_column(field: &str, value: Option<u64>) -> Result<Option<i64>> {
    value
        .map(|n| {
            i64::try_from(n).map_err(|_| {
                Error::InvalidArgument(format!("{} {} does not fit in a stored integer", field, n))
            })
        })
        .transpose()
}

pub struct TrackingRepo {
    pool: SqlitePool,
}

impl TrackingRepo {
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS table_volumes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                server TEXT NOT NULL,
                database_name TEXT NOT NULL,
                table_name TEXT NOT NULL,
                run_time INTEGER NOT NULL,
                data_length INTEGER,
                index_length INTEGER,
                data_free INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS table_definitions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                server TEXT NOT NULL,
                database_name TEXT NOT NULL,
                table_name TEXT NOT NULL,
                run_time INTEGER NOT NULL,
                create_syntax TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_volumes_ident_run_time ON table_volumes(server, database_name, table_name, run_time)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_definitions_ident_run_time ON table_definitions(server, database_name, table_name, run_time)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self, rows), fields(repo = "tracking", operation = "save_rows", rows_count = rows.len()))]
    pub async fn save_rows(&self, rows: &[TrackedRow]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for r in rows {
            match &r.measurement {
                Measurement::Volume(v) => {
                    sqlx::query(
                        "INSERT INTO table_volumes (server, database_name, table_name, run_time, data_length, index_length, data_free) VALUES ($1, $2, $3, $4, $5, $6, $7)",
                    )
                    .bind(&r.ident.server)
                    .bind(&r.ident.database_name)
                    .bind(&r.ident.table_name)
                    .bind(r.run_time.timestamp())
                    .bind(to_column("data_length", v.data_length)?)
                    .bind(to_column("index_length", v.index_length)?)
                    .bind(to_column("data_free", v.data_free)?)
                    .execute(&mut *tx)
                    .await?;
                }
                Measurement::Definition(d) => {
                    sqlx::query(
                        "INSERT INTO table_definitions (server, database_name, table_name, run_time, create_syntax) VALUES ($1, $2, $3, $4, $5)",
                    )
                    .bind(&r.ident.server)
                    .bind(&r.ident.database_name)
                    .bind(&r.ident.table_name)
                    .bind(r.run_time.timestamp())
                    .bind(d.create_syntax.as_deref())
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }

    /// Latest row per (server, database, table). Order: run_time, then insertion.
    #[instrument(skip(self), fields(repo = "tracking", operation = "most_recent_versions"))]
    pub async fn most_recent_versions(&self, kind: CollectorKind) -> Result<Vec<TrackedRow>> {
        let (table, columns) = table_for(kind);
        let sql = format!(
            "SELECT {columns} FROM (
                 SELECT *, ROW_NUMBER() OVER (
                     PARTITION BY server, database_name, table_name
                     ORDER BY run_time DESC, id DESC
                 ) AS rn
                 FROM {table}
             ) WHERE rn = 1
             ORDER BY run_time ASC, id ASC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|r| decode::parse_row(kind, r)).collect()
    }

    /// Every recorded row. Order: run_time, then insertion.
    #[instrument(skip(self), fields(repo = "tracking", operation = "history"))]
    pub async fn history(&self, kind: CollectorKind) -> Result<Vec<TrackedRow>> {
        let (table, columns) = table_for(kind);
        let sql = format!("SELECT {columns} FROM {table} ORDER BY run_time ASC, id ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|r| decode::parse_row(kind, r)).collect()
    }

    /// All volume rows for one table, ascending by run_time.
    pub async fn volume_history(&self, ident: &SeriesIdent) -> Result<Vec<TrackedRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {VOLUME_COLUMNS} FROM table_volumes
             WHERE server = $1 AND database_name = $2 AND table_name = $3
             ORDER BY run_time ASC, id ASC"
        ))
        .bind(&ident.server)
        .bind(&ident.database_name)
        .bind(&ident.table_name)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| decode::parse_row(CollectorKind::Volume, r))
            .collect()
    }

    /// Volume rows for one table with run_time strictly after `after` (unix seconds), ascending.
    pub async fn volume_history_after(
        &self,
        ident: &SeriesIdent,
        after: i64,
    ) -> Result<Vec<TrackedRow>> {
        let rows = sqlx::query(&format!(
            "SELECT {VOLUME_COLUMNS} FROM table_volumes
             WHERE run_time > $1 AND server = $2 AND database_name = $3 AND table_name = $4
             ORDER BY run_time ASC, id ASC"
        ))
        .bind(after)
        .bind(&ident.server)
        .bind(&ident.database_name)
        .bind(&ident.table_name)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|r| decode::parse_row(CollectorKind::Volume, r))
            .collect()
    }

    /// Earliest volume row for one table.
    pub async fn earliest_volume(&self, ident: &SeriesIdent) -> Result<Option<TrackedRow>> {
        let row = sqlx::query(&format!(
            "SELECT {VOLUME_COLUMNS} FROM table_volumes
             WHERE server = $1 AND database_name = $2 AND table_name = $3
             ORDER BY run_time ASC, id ASC LIMIT 1"
        ))
        .bind(&ident.server)
        .bind(&ident.database_name)
        .bind(&ident.table_name)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref()
            .map(|r| decode::parse_row(CollectorKind::Volume, r))
            .transpose()
    }
}
