// Formatter registry: builtin bindings, overwrite semantics, NotFound, one-time load

mod common;

use common::volume_row;
use std::io::{self, Write};
use table_tracker::error::Error;
use table_tracker::formatters::{self, FormatterRegistry, RenderOptions, RunnerType};
use table_tracker::models::{CollectorKind, Medium, TrackedRow};

fn shout(out: &mut dyn Write, row: &TrackedRow, _opts: &RenderOptions) -> io::Result<()> {
    writeln!(out, "SHOUT {}", row.ident)
}

#[test]
fn empty_registry_lookups_fail_with_not_found() {
    let registry = FormatterRegistry::new();
    assert!(!registry.is_loaded());
    assert!(matches!(
        registry.lookup_renderer(CollectorKind::Volume, Medium::Text),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        registry.lookup_runner(Medium::Text),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn builtins_cover_text_and_runners() {
    let registry = FormatterRegistry::with_builtins();
    assert!(registry.is_loaded());
    assert!(registry.lookup_renderer(CollectorKind::Volume, Medium::Text).is_ok());
    assert!(registry.lookup_renderer(CollectorKind::Definition, Medium::Text).is_ok());
    assert_eq!(registry.lookup_runner(Medium::Text).unwrap(), RunnerType::TextReport);
    assert_eq!(registry.lookup_runner(Medium::Rrd).unwrap(), RunnerType::SeriesReconcile);
}

#[test]
fn missing_pair_is_not_found_even_after_load() {
    let mut registry = FormatterRegistry::with_builtins();
    registry.load_all();
    let err = registry
        .lookup_renderer(CollectorKind::Definition, Medium::Rrd)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(err.to_string().contains("definition"));
}

#[test]
fn last_registration_wins_and_reload_is_noop() {
    let mut registry = FormatterRegistry::with_builtins();
    registry.register(CollectorKind::Volume, Medium::Text, shout);
    registry.register_runner(Medium::Rrd, RunnerType::TextReport);
    // Already loaded: must not restore the builtins.
    registry.load_all();

    let render = registry
        .lookup_renderer(CollectorKind::Volume, Medium::Text)
        .unwrap();
    let mut out = Vec::new();
    render(&mut out, &volume_row("s", "d", "t", 1, 1, 1, 1), &RenderOptions::default()).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "SHOUT s.d.t\n");
    assert_eq!(registry.lookup_runner(Medium::Rrd).unwrap(), RunnerType::TextReport);
}

#[test]
fn global_registry_is_loaded_once_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| formatters::global() as *const _ as usize))
        .collect();
    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    assert!(formatters::global().read().unwrap().is_loaded());
    assert!(formatters::renderer_for(CollectorKind::Volume, Medium::Text).is_ok());
    assert!(matches!(
        formatters::renderer_for(CollectorKind::Definition, Medium::Rrd),
        Err(Error::NotFound(_))
    ));
    assert_eq!(formatters::runner_for(Medium::Rrd).unwrap(), RunnerType::SeriesReconcile);
}

#[test]
fn volume_renderer_header_and_detail() {
    let opts = RenderOptions {
        display_width: 80,
        header: true,
    };
    let mut out = Vec::new();
    formatters::volume::render_text(&mut out, &volume_row("s", "d", "t", 1, 2048, 1024, 0), &opts)
        .unwrap();
    formatters::volume::render_text(
        &mut out,
        &volume_row("s", "d", "t", 1, 2048, 1024, 0),
        &RenderOptions { header: false, ..opts },
    )
    .unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("table"));
    assert!(lines[0].trim_end().ends_with("total"));
    assert!(lines[1].starts_with("s.d.t"));
    assert!(lines[1].contains("2.0K"));
    assert!(lines[1].trim_end().ends_with("3.0K"));
    assert_eq!(lines[0].len(), 80);
    assert_eq!(lines[1].len(), 80);
}

#[test]
fn volume_renderer_marks_unreachable() {
    let mut out = Vec::new();
    formatters::volume::render_text(
        &mut out,
        &common::unreachable_row("s", "d", "gone", 1),
        &RenderOptions::default(),
    )
    .unwrap();
    assert!(String::from_utf8(out).unwrap().contains("unreachable"));
}

#[test]
fn definition_renderer_reports_size() {
    let row = TrackedRow::definition(
        table_tracker::models::SeriesIdent::new("s", "d", "t"),
        common::ts(1),
        Some("CREATE TABLE t (id INT)".into()),
    );
    let mut out = Vec::new();
    formatters::definition::render_text(&mut out, &row, &RenderOptions::default()).unwrap();
    assert!(String::from_utf8(out).unwrap().contains("defined (23 bytes)"));
}

#[test]
fn renderer_rejects_row_of_other_kind() {
    let row = TrackedRow::definition(
        table_tracker::models::SeriesIdent::new("s", "d", "t"),
        common::ts(1),
        None,
    );
    let mut out = Vec::new();
    assert!(formatters::volume::render_text(&mut out, &row, &RenderOptions::default()).is_err());
}
