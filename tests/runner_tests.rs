// Medium dispatch through the registry: text report and series reconcile end to end

mod common;

use common::{RecordingStore, temp_repo, volume_row};
use table_tracker::config::AppConfig;
use table_tracker::error::Error;
use table_tracker::models::{CollectorKind, Medium};
use table_tracker::runner::{RowScope, RunContext, RunOutcome, run};

const T0: i64 = 1_241_179_200;

fn config(extra: &str) -> AppConfig {
    AppConfig::load_from_str(&format!(
        "[database]\npath = \"unused.db\"\n\n[report]\nreport_ignore = [\"junk\"]\n{}",
        extra
    ))
    .unwrap()
}

#[tokio::test]
async fn text_medium_renders_filtered_latest_rows() {
    let (_dir, repo) = temp_repo().await;
    repo.save_rows(&[
        volume_row("s", "d", "a", T0, 1, 0, 0),
        volume_row("s", "d", "a", T0 + 60, 2, 0, 0),
        volume_row("s", "junk", "b", T0 + 60, 2, 0, 0),
    ])
    .await
    .unwrap();
    let store = RecordingStore::new();
    let cfg = config("");
    let ctx = RunContext {
        repo: &repo,
        store: &store,
        config: &cfg,
    };

    let mut out = Vec::new();
    let outcome = run(
        Medium::Text,
        CollectorKind::Volume,
        RowScope::MostRecent,
        &ctx,
        &mut out,
    )
    .await
    .unwrap();
    assert!(matches!(outcome, RunOutcome::Text { rows: 1 }));
    assert!(outcome.is_clean());
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("s.d.a"));
    assert!(!text.contains("junk"));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn text_medium_history_scope_shows_every_run() {
    let (_dir, repo) = temp_repo().await;
    repo.save_rows(&[
        volume_row("s", "d", "a", T0, 1, 0, 0),
        volume_row("s", "d", "a", T0 + 60, 2, 0, 0),
    ])
    .await
    .unwrap();
    let store = RecordingStore::new();
    let cfg = config("");
    let ctx = RunContext {
        repo: &repo,
        store: &store,
        config: &cfg,
    };

    let mut out = Vec::new();
    run(Medium::Text, CollectorKind::Volume, RowScope::History, &ctx, &mut out)
        .await
        .unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("-- ")).count(), 2);
}

#[tokio::test]
async fn rrd_medium_requires_rrd_section() {
    let (_dir, repo) = temp_repo().await;
    let store = RecordingStore::new();
    let cfg = config("");
    let ctx = RunContext {
        repo: &repo,
        store: &store,
        config: &cfg,
    };
    let mut out = Vec::new();
    let err = run(Medium::Rrd, CollectorKind::Volume, RowScope::MostRecent, &ctx, &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[tokio::test]
async fn rrd_medium_reconciles_latest_volume_rows() {
    let (_dir, repo) = temp_repo().await;
    repo.save_rows(&[
        volume_row("s", "d", "a", T0, 1, 0, 0),
        volume_row("s", "d", "a", T0 + 300, 2, 0, 0),
        volume_row("s", "junk", "b", T0, 1, 0, 0),
    ])
    .await
    .unwrap();
    let store = RecordingStore::new();
    let cfg = config("\n[rrd]\npath = \"/srv/rrd\"\nupdate_interval = \"5m\"\n");
    let ctx = RunContext {
        repo: &repo,
        store: &store,
        config: &cfg,
    };

    let mut out = Vec::new();
    let outcome = run(Medium::Rrd, CollectorKind::Volume, RowScope::MostRecent, &ctx, &mut out)
        .await
        .unwrap();
    let RunOutcome::Series(report) = outcome else {
        panic!("expected series outcome");
    };
    assert_eq!(report.series_created, 1);
    assert_eq!(report.points_appended, 2);
    assert!(out.is_empty());
    assert_eq!(store.creates().len(), 1);
}
