// Medium dispatch: look up the runner registered for a medium and run it against tracked rows.

use std::io::Write;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::formatters::{self, RunnerType};
use crate::models::{CollectorKind, Medium, TrackedRow};
use crate::reconcile::{ReconcileReport, SeriesReconciler};
use crate::series::SeriesStore;
use crate::text_report::{self, TextOptions};
use crate::tracking_repo::TrackingRepo;

/// Which versions of each table a text report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowScope {
    /// Latest row per table.
    #[default]
    MostRecent,
    /// Every recorded row.
    History,
}

pub struct RunContext<'a, S: SeriesStore> {
    pub repo: &'a TrackingRepo,
    pub store: &'a S,
    pub config: &'a AppConfig,
}

#[derive(Debug)]
pub enum RunOutcome {
    Text { rows: usize },
    Series(ReconcileReport),
}

impl RunOutcome {
    pub fn is_clean(&self) -> bool {
        match self {
            RunOutcome::Text { .. } => true,
            RunOutcome::Series(report) => report.is_clean(),
        }
    }
}

pub async fn load_rows(
    repo: &TrackingRepo,
    kind: CollectorKind,
    scope: RowScope,
) -> Result<Vec<TrackedRow>> {
    match scope {
        RowScope::MostRecent => repo.most_recent_versions(kind).await,
        RowScope::History => repo.history(kind).await,
    }
}

/// `kind` and `scope` select rows for text; the series runner always reconciles latest volume rows.
pub async fn run<S: SeriesStore>(
    medium: Medium,
    kind: CollectorKind,
    scope: RowScope,
    ctx: &RunContext<'_, S>,
    out: &mut dyn Write,
) -> Result<RunOutcome> {
    let rules = ctx.config.ignore_rules()?;
    match formatters::runner_for(medium)? {
        RunnerType::TextReport => {
            let rows = load_rows(ctx.repo, kind, scope).await?;
            let rows = rules.apply(&rows);
            let options = TextOptions {
                display_width: ctx.config.report.display_width,
            };
            text_report::render(out, &rows, &options)?;
            out.flush()?;
            Ok(RunOutcome::Text { rows: rows.len() })
        }
        RunnerType::SeriesReconcile => {
            let rrd = ctx.config.rrd.as_ref().ok_or_else(|| {
                Error::Configuration("an [rrd] section is required for the rrd medium".into())
            })?;
            let reconciler =
                SeriesReconciler::new(ctx.repo, ctx.store, &rrd.path, &rrd.update_interval)?;
            let latest = ctx
                .repo
                .most_recent_versions(CollectorKind::Volume)
                .await?;
            let report = reconciler.reconcile(&latest, &rules).await?;
            Ok(RunOutcome::Series(report))
        }
    }
}
