use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use table_tracker::models::{CollectorKind, Medium};
use table_tracker::runner::{RowScope, RunContext, RunOutcome};
use table_tracker::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

/// Report on tracked table history, or reconcile it into rrdtool series files.
#[derive(Parser, Debug)]
#[command(name = "table-tracker", version, about)]
struct Args {
    /// Output medium
    #[arg(value_enum, default_value_t = Medium::Text)]
    medium: Medium,

    /// Collector whose rows are reported
    #[arg(value_enum, default_value_t = CollectorKind::Volume)]
    kind: CollectorKind,

    /// Report every recorded row instead of the latest row per table (text only)
    #[arg(long)]
    history: bool,
}

impl Args {
    fn scope(&self) -> RowScope {
        if self.history {
            RowScope::History
        } else {
            RowScope::MostRecent
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let app_config = config::AppConfig::load()?;
    let repo = tracking_repo::TrackingRepo::connect(&app_config.database.path).await?;
    repo.init().await?;

    let store = series::RrdTool::new(
        app_config
            .rrd
            .as_ref()
            .map(|r| r.rrdtool.clone())
            .unwrap_or_else(|| "rrdtool".into()),
    );
    let ctx = RunContext {
        repo: &repo,
        store: &store,
        config: &app_config,
    };

    tracing::debug!(
        medium = %args.medium,
        kind = %args.kind,
        scope = ?args.scope(),
        "{}",
        version::banner()
    );
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = runner::run(args.medium, args.kind, args.scope(), &ctx, &mut out).await?;

    if let RunOutcome::Series(report) = &outcome {
        for failure in &report.failures {
            tracing::error!(table = %failure.ident, error = %failure.error, "series not updated");
        }
    }
    Ok(if outcome.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
