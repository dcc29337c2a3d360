// Formatter registry: (collector kind, medium) -> row renderer, medium -> runner.
// Built-ins come from a static descriptor table; the process-wide instance loads them once.

pub mod definition;
pub mod volume;

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::models::{CollectorKind, Medium, TrackedRow};

/// Options handed to a row renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub display_width: usize,
    /// Print column headings instead of the row.
    pub header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_WIDTH,
            header: false,
        }
    }
}

pub const DEFAULT_DISPLAY_WIDTH: usize = 80;

pub type RenderFn = fn(&mut dyn Write, &TrackedRow, &RenderOptions) -> io::Result<()>;

/// Top-level runner handling a medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerType {
    /// Grouped column report on a stream.
    TextReport,
    /// Per-table series create/append.
    SeriesReconcile,
}

struct FormatterDescriptor {
    kind: CollectorKind,
    medium: Medium,
    render: RenderFn,
}

const BUILTIN_FORMATTERS: &[FormatterDescriptor] = &[
    FormatterDescriptor {
        kind: CollectorKind::Volume,
        medium: Medium::Text,
        render: volume::render_text,
    },
    FormatterDescriptor {
        kind: CollectorKind::Definition,
        medium: Medium::Text,
        render: definition::render_text,
    },
];

const BUILTIN_RUNNERS: &[(Medium, RunnerType)] = &[
    (Medium::Text, RunnerType::TextReport),
    (Medium::Rrd, RunnerType::SeriesReconcile),
];

#[derive(Default)]
pub struct FormatterRegistry {
    renderers: HashMap<(CollectorKind, Medium), RenderFn>,
    runners: HashMap<Medium, RunnerType>,
    loaded: bool,
}

impl FormatterRegistry {
    /// Empty registry; call `load_all` for the built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.load_all();
        registry
    }

    /// Overwrites any previous binding for the pair.
    pub fn register(&mut self, kind: CollectorKind, medium: Medium, render: RenderFn) {
        self.renderers.insert((kind, medium), render);
    }

    /// Overwrites any previous runner for the medium.
    pub fn register_runner(&mut self, medium: Medium, runner: RunnerType) {
        self.runners.insert(medium, runner);
    }

    pub fn lookup_renderer(&self, kind: CollectorKind, medium: Medium) -> Result<RenderFn> {
        self.renderers
            .get(&(kind, medium))
            .copied()
            .ok_or_else(|| Error::NotFound(format!("no {} formatter for collector {}", medium, kind)))
    }

    pub fn lookup_runner(&self, medium: Medium) -> Result<RunnerType> {
        self.runners
            .get(&medium)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("no runner for medium {}", medium)))
    }

    /// Registers every built-in formatter and runner. No-op after the first call.
    pub fn load_all(&mut self) {
        if self.loaded {
            return;
        }
        for d in BUILTIN_FORMATTERS {
            self.register(d.kind, d.medium, d.render);
        }
        for &(medium, runner) in BUILTIN_RUNNERS {
            self.register_runner(medium, runner);
        }
        self.loaded = true;
        tracing::debug!(
            formatters = BUILTIN_FORMATTERS.len(),
            runners = BUILTIN_RUNNERS.len(),
            "formatters loaded"
        );
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

static GLOBAL: OnceLock<RwLock<FormatterRegistry>> = OnceLock::new();

/// Process-wide registry; built-ins are loaded exactly once on first access.
pub fn global() -> &'static RwLock<FormatterRegistry> {
    GLOBAL.get_or_init(|| RwLock::new(FormatterRegistry::with_builtins()))
}

pub fn renderer_for(kind: CollectorKind, medium: Medium) -> Result<RenderFn> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .lookup_renderer(kind, medium)
}

pub fn runner_for(medium: Medium) -> Result<RunnerType> {
    global()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .lookup_runner(medium)
}

/// Width of the `server.database.table` column once `fixed` columns are laid out.
pub(crate) fn name_width(display_width: usize, fixed: usize) -> usize {
    display_width.saturating_sub(fixed).max(12)
}

/// Truncates to `width` chars, marking the cut with `~`.
pub(crate) fn fit(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}
