// Time-series store adapter: layout of a series file, update points, and the store interface.
// The reconciler only talks to `SeriesStore`; `RrdTool` is the command-line implementation.

mod interval;
mod rrdtool;

pub use interval::{MAX_INTERVAL_SECS, parse_update_interval};
pub use rrdtool::{RrdTool, create_args, update_args};

use std::path::Path;

use crate::error::Result;
use crate::models::{TrackedRow, VolumeStats};

/// Start offset before the first sample; the store rejects a point at exactly the start time.
pub const START_OFFSET_SECS: i64 = 10;

/// Most points handed to one `SeriesStore::update` call (one `rrdtool update` invocation).
pub const UPDATE_BATCH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DsKind {
    Gauge,
}

impl DsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DsKind::Gauge => "GAUGE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub name: String,
    pub kind: DsKind,
    /// Seconds without an update before the value becomes unknown.
    pub heartbeat: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consolidation {
    Last,
    Average,
}

impl Consolidation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Consolidation::Last => "LAST",
            Consolidation::Average => "AVERAGE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archive {
    pub consolidation: Consolidation,
    /// Fraction of samples that may be unknown for a consolidated point to stay valid.
    pub xff: f64,
    pub steps: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub start: i64,
    pub step: u64,
    pub data_sources: Vec<DataSource>,
    pub archives: Vec<Archive>,
}

impl SeriesSpec {
    /// data_length/index_length/data_free gauges, one LAST and two AVERAGE tiers.
    pub fn volume(start: i64, step: u64) -> Self {
        let heartbeat = step.saturating_mul(2);
        let data_sources = ["data_length", "index_length", "data_free"]
            .into_iter()
            .map(|name| DataSource {
                name: name.to_string(),
                kind: DsKind::Gauge,
                heartbeat,
            })
            .collect();
        let archives = vec![
            Archive {
                consolidation: Consolidation::Last,
                xff: 0.5,
                steps: 1,
                rows: 1000,
            },
            Archive {
                consolidation: Consolidation::Average,
                xff: 0.5,
                steps: 2,
                rows: 2000,
            },
            Archive {
                consolidation: Consolidation::Average,
                xff: 0.5,
                steps: 4,
                rows: 4000,
            },
        ];
        Self {
            start,
            step,
            data_sources,
            archives,
        }
    }
}

/// One timestamped sample; values are positional per data source, None = unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPoint {
    pub timestamp: i64,
    pub values: Vec<Option<u64>>,
}

impl SeriesPoint {
    pub fn from_volume(timestamp: i64, v: &VolumeStats) -> Self {
        Self {
            timestamp,
            values: vec![v.data_length, v.index_length, v.data_free],
        }
    }

    /// None for rows that aren't volume rows.
    pub fn from_row(row: &TrackedRow) -> Option<Self> {
        row.volume_stats()
            .map(|v| Self::from_volume(row.run_time.timestamp(), v))
    }

    /// `timestamp:v:v:v` with `U` for unknown values.
    pub fn to_arg(&self) -> String {
        let mut out = self.timestamp.to_string();
        for v in &self.values {
            out.push(':');
            match v {
                Some(n) => out.push_str(&n.to_string()),
                None => out.push('U'),
            }
        }
        out
    }
}

/// Append-only time-series store, one file per tracked table.
#[allow(async_fn_in_trait)]
pub trait SeriesStore {
    /// File extension for series paths (without the dot).
    fn extension(&self) -> &str;

    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Unix seconds of the most recent recorded point.
    async fn last_update(&self, path: &Path) -> Result<i64>;

    async fn create(&self, path: &Path, spec: &SeriesSpec) -> Result<()>;

    /// Points must be in strictly increasing timestamp order, after the file's last update.
    async fn update(&self, path: &Path, points: &[SeriesPoint]) -> Result<()>;
}
