// Shared test helpers: row builders, temp tracking repo, recording series store
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use table_tracker::error::{Error, Result};
use table_tracker::models::*;
use table_tracker::series::{SeriesPoint, SeriesSpec, SeriesStore};
use table_tracker::tracking_repo::TrackingRepo;
use tempfile::TempDir;

pub fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

pub fn volume_row(
    server: &str,
    db: &str,
    table: &str,
    run_time: i64,
    data: u64,
    index: u64,
    free: u64,
) -> TrackedRow {
    TrackedRow::volume(
        SeriesIdent::new(server, db, table),
        ts(run_time),
        VolumeStats::new(data, index, free),
    )
}

pub fn unreachable_row(server: &str, db: &str, table: &str, run_time: i64) -> TrackedRow {
    TrackedRow::volume(
        SeriesIdent::new(server, db, table),
        ts(run_time),
        VolumeStats::unreachable(),
    )
}

/// Keep the TempDir alive for as long as the repo is used.
pub async fn temp_repo() -> (TempDir, TrackingRepo) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracking.db");
    let repo = TrackingRepo::connect(path.to_str().unwrap()).await.unwrap();
    repo.init().await.unwrap();
    (dir, repo)
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Last(PathBuf),
    Create(PathBuf, SeriesSpec),
    Update(PathBuf, Vec<SeriesPoint>),
}

/// In-memory series store; tracks each file's last timestamp and records every command.
#[derive(Default)]
pub struct RecordingStore {
    files: Mutex<HashMap<PathBuf, i64>>,
    calls: Mutex<Vec<StoreCall>>,
    failing: Mutex<HashSet<PathBuf>>,
    reject_from: Mutex<HashMap<PathBuf, i64>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a series file already exists with the given last update.
    pub fn seed(&self, path: PathBuf, last: i64) {
        self.files.lock().unwrap().insert(path, last);
    }

    /// Every update to `path` fails like a non-zero rrdtool exit.
    pub fn fail_updates(&self, path: PathBuf) {
        self.failing.lock().unwrap().insert(path);
    }

    /// Updates to `path` carrying a point at or after `timestamp` fail; earlier batches commit.
    pub fn reject_points_from(&self, path: PathBuf, timestamp: i64) {
        self.reject_from.lock().unwrap().insert(path, timestamp);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn creates(&self) -> Vec<(PathBuf, SeriesSpec)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Create(p, s) => Some((p, s)),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(PathBuf, Vec<SeriesPoint>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Update(p, pts) => Some((p, pts)),
                _ => None,
            })
            .collect()
    }

    pub fn last(&self, path: &Path) -> Option<i64> {
        self.files.lock().unwrap().get(path).copied()
    }
}

impl SeriesStore for RecordingStore {
    fn extension(&self) -> &str {
        "rrd"
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }

    async fn last_update(&self, path: &Path) -> Result<i64> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Last(path.to_path_buf()));
        self.last(path).ok_or_else(|| Error::ExternalToolFailure {
            command: format!("rrdtool last {}", path.display()),
            output: "No such file or directory".into(),
        })
    }

    async fn create(&self, path: &Path, spec: &SeriesSpec) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Create(path.to_path_buf(), spec.clone()));
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), spec.start);
        Ok(())
    }

    async fn update(&self, path: &Path, points: &[SeriesPoint]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::Update(path.to_path_buf(), points.to_vec()));
        if self.failing.lock().unwrap().contains(path) {
            return Err(Error::ExternalToolFailure {
                command: format!("rrdtool update {}", path.display()),
                output: "ERROR: simulated failure".into(),
            });
        }
        if let Some(&from) = self.reject_from.lock().unwrap().get(path) {
            if points.iter().any(|p| p.timestamp >= from) {
                return Err(Error::ExternalToolFailure {
                    command: format!("rrdtool update {}", path.display()),
                    output: format!("ERROR: rejected update at {}", from),
                });
            }
        }
        let mut files = self.files.lock().unwrap();
        let last = files.get_mut(path).ok_or_else(|| Error::ExternalToolFailure {
            command: format!("rrdtool update {}", path.display()),
            output: "No such file or directory".into(),
        })?;
        for p in points {
            if p.timestamp <= *last {
                return Err(Error::ExternalToolFailure {
                    command: format!("rrdtool update {}", path.display()),
                    output: format!("illegal attempt to update using time {}", p.timestamp),
                });
            }
            *last = p.timestamp;
        }
        Ok(())
    }
}
