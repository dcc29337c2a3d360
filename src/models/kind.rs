// Collector kinds and output media (formatter registry keys)

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::Error;

/// Metric family a row was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum CollectorKind {
    /// Table storage footprint (data, index, free bytes).
    Volume,
    /// Table definition (`CREATE TABLE` text).
    Definition,
}

impl CollectorKind {
    pub const ALL: [CollectorKind; 2] = [CollectorKind::Volume, CollectorKind::Definition];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectorKind::Volume => "volume",
            CollectorKind::Definition => "definition",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "volume" => Ok(CollectorKind::Volume),
            "definition" => Ok(CollectorKind::Definition),
            other => Err(Error::InvalidArgument(format!(
                "unknown collector kind {:?}",
                other
            ))),
        }
    }
}

/// Output modality a formatter targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum Medium {
    /// Columnar report written to a stream.
    Text,
    /// Per-table rrdtool series files.
    Rrd,
}

impl Medium {
    pub fn as_str(&self) -> &'static str {
        match self {
            Medium::Text => "text",
            Medium::Rrd => "rrd",
        }
    }
}

impl fmt::Display for Medium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Medium {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Medium::Text),
            "rrd" => Ok(Medium::Rrd),
            other => Err(Error::InvalidArgument(format!("unknown medium {:?}", other))),
        }
    }
}
