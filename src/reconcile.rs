// Series reconciliation: for each table's latest volume row, create its series file from the full
// history, or append only rows newer than the file's last update. Each table is committed on its own;
// a failed external command stops that table only and is reported in ReconcileReport::failures.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::filter::IgnoreRules;
use crate::models::{CollectorKind, SeriesIdent, TrackedRow};
use crate::series::{
    START_OFFSET_SECS, SeriesPoint, SeriesSpec, SeriesStore, UPDATE_BATCH, parse_update_interval,
};
use crate::tracking_repo::TrackingRepo;

#[derive(Debug)]
pub struct TableFailure {
    pub ident: SeriesIdent,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Rows that survived the ignore rules.
    pub tables_seen: usize,
    pub series_created: usize,
    /// Points the store accepted, including batches committed before a table failed.
    pub points_appended: usize,
    pub skipped_unreachable: usize,
    pub failures: Vec<TableFailure>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct SeriesReconciler<'a, S: SeriesStore> {
    repo: &'a TrackingRepo,
    store: &'a S,
    dir: PathBuf,
    step: u64,
}

impl<'a, S: SeriesStore> SeriesReconciler<'a, S> {
    /// Fails with InvalidArgument before touching the store if `update_interval` is bad.
    pub fn new(
        repo: &'a TrackingRepo,
        store: &'a S,
        dir: impl Into<PathBuf>,
        update_interval: &str,
    ) -> Result<Self> {
        let step = parse_update_interval(update_interval)?;
        Ok(Self {
            repo,
            store,
            dir: dir.into(),
            step,
        })
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn series_path(&self, ident: &SeriesIdent) -> PathBuf {
        ident.series_path(&self.dir, self.store.extension())
    }

    /// `most_recent` holds one row per table (its latest observation).
    #[instrument(skip_all, fields(dir = %self.dir.display(), step = self.step, rows = most_recent.len()))]
    pub async fn reconcile(
        &self,
        most_recent: &[TrackedRow],
        rules: &IgnoreRules,
    ) -> Result<ReconcileReport> {
        let rows = rules.apply(most_recent);
        let mut report = ReconcileReport::default();

        for row in rows.iter() {
            if row.collector_kind() != CollectorKind::Volume {
                debug!(table = %row.ident, kind = %row.collector_kind(), "no series for collector, skipping");
                continue;
            }
            report.tables_seen += 1;
            if row.is_unreachable() {
                debug!(table = %row.ident, "unreachable, skipping");
                report.skipped_unreachable += 1;
                continue;
            }
            match self.reconcile_table(&row.ident, &mut report).await {
                Ok(()) => {}
                Err(e) if e.is_external() => {
                    warn!(table = %row.ident, error = %e, "series update failed");
                    report.failures.push(TableFailure {
                        ident: row.ident.clone(),
                        error: e,
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            tables = report.tables_seen,
            created = report.series_created,
            points = report.points_appended,
            unreachable = report.skipped_unreachable,
            failures = report.failures.len(),
            "series reconcile complete"
        );
        Ok(report)
    }

    async fn reconcile_table(
        &self,
        ident: &SeriesIdent,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let path = self.series_path(ident);
        if self.store.exists(&path).await? {
            let last = self.store.last_update(&path).await?;
            let rows = self.repo.volume_history_after(ident, last).await?;
            self.append(&path, last, &rows, report).await
        } else {
            let Some(first) = self.repo.earliest_volume(ident).await? else {
                return Ok(());
            };
            let start = first.run_time.timestamp() - START_OFFSET_SECS;
            self.store
                .create(&path, &SeriesSpec::volume(start, self.step))
                .await?;
            report.series_created += 1;
            let rows = self.repo.volume_history(ident).await?;
            self.append(&path, start, &rows, report).await
        }
    }

    /// Sends rows newer than `watermark` in order, `UPDATE_BATCH` points per store call.
    /// Repeated timestamps are collapsed to the first. Batches sent before a failure stay counted.
    async fn append(
        &self,
        path: &Path,
        watermark: i64,
        rows: &[TrackedRow],
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let points = ordered_points(watermark, rows);
        for batch in points.chunks(UPDATE_BATCH) {
            self.store.update(path, batch).await?;
            report.points_appended += batch.len();
        }
        Ok(())
    }
}

/// Points with strictly increasing timestamps, all after `watermark`.
pub fn ordered_points(watermark: i64, rows: &[TrackedRow]) -> Vec<SeriesPoint> {
    let mut last = watermark;
    let mut out = Vec::with_capacity(rows.len());
    for point in rows.iter().filter_map(SeriesPoint::from_row) {
        if point.timestamp <= last {
            continue;
        }
        last = point.timestamp;
        out.push(point);
    }
    out
}
