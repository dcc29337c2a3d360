// Tracked rows: one observation of one table at one run

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use super::CollectorKind;

/// Identity of a tracked table: (server, database, table).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesIdent {
    pub server: String,
    pub database_name: String,
    pub table_name: String,
}

impl SeriesIdent {
    pub fn new(
        server: impl Into<String>,
        database_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            database_name: database_name.into(),
            table_name: table_name.into(),
        }
    }

    /// `server.database.table`; the string ignore rules are matched against.
    pub fn key(&self) -> String {
        format!("{}.{}.{}", self.server, self.database_name, self.table_name)
    }

    /// `<dir>/<server>_<database>_<table>.<ext>`. Path separators in names become `_`,
    /// so the file always lands directly in `dir`.
    pub fn series_path(&self, dir: &Path, ext: &str) -> PathBuf {
        dir.join(format!(
            "{}_{}_{}.{}",
            file_safe(&self.server),
            file_safe(&self.database_name),
            file_safe(&self.table_name),
            ext
        ))
    }
}

fn file_safe(name: &str) -> Cow<'_, str> {
    if name.contains(['/', '\\', '\0']) {
        Cow::Owned(name.replace(['/', '\\', '\0'], "_"))
    } else {
        Cow::Borrowed(name)
    }
}

impl fmt::Display for SeriesIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.server, self.database_name, self.table_name)
    }
}

/// Storage footprint in bytes. All three absent means the table could not be measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeStats {
    pub data_length: Option<u64>,
    pub index_length: Option<u64>,
    pub data_free: Option<u64>,
}

impl VolumeStats {
    pub fn new(data_length: u64, index_length: u64, data_free: u64) -> Self {
        Self {
            data_length: Some(data_length),
            index_length: Some(index_length),
            data_free: Some(data_free),
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn is_unreachable(&self) -> bool {
        self.data_length.is_none() && self.index_length.is_none() && self.data_free.is_none()
    }

    /// data + index; None when either is unknown.
    pub fn total(&self) -> Option<u64> {
        Some(self.data_length? + self.index_length?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionStats {
    /// None when the table could not be read at that run.
    pub create_syntax: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Measurement {
    Volume(VolumeStats),
    Definition(DefinitionStats),
}

impl Measurement {
    pub fn kind(&self) -> CollectorKind {
        match self {
            Measurement::Volume(_) => CollectorKind::Volume,
            Measurement::Definition(_) => CollectorKind::Definition,
        }
    }
}

/// Immutable once produced by a collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRow {
    pub ident: SeriesIdent,
    pub run_time: DateTime<Utc>,
    pub measurement: Measurement,
}

impl TrackedRow {
    pub fn volume(ident: SeriesIdent, run_time: DateTime<Utc>, stats: VolumeStats) -> Self {
        Self {
            ident,
            run_time,
            measurement: Measurement::Volume(stats),
        }
    }

    pub fn definition(
        ident: SeriesIdent,
        run_time: DateTime<Utc>,
        create_syntax: Option<String>,
    ) -> Self {
        Self {
            ident,
            run_time,
            measurement: Measurement::Definition(DefinitionStats { create_syntax }),
        }
    }

    pub fn server(&self) -> &str {
        &self.ident.server
    }

    pub fn database_name(&self) -> &str {
        &self.ident.database_name
    }

    pub fn table_name(&self) -> &str {
        &self.ident.table_name
    }

    pub fn collector_kind(&self) -> CollectorKind {
        self.measurement.kind()
    }

    pub fn volume_stats(&self) -> Option<&VolumeStats> {
        match &self.measurement {
            Measurement::Volume(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        match &self.measurement {
            Measurement::Volume(v) => v.is_unreachable(),
            Measurement::Definition(d) => d.create_syntax.is_none(),
        }
    }
}
