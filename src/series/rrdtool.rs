// rrdtool command-line adapter. Each command is logged before it runs; failures carry the command and its output.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use super::{SeriesPoint, SeriesSpec, SeriesStore, UPDATE_BATCH};
use crate::error::{Error, Result};

pub struct RrdTool {
    binary: PathBuf,
}

impl Default for RrdTool {
    fn default() -> Self {
        Self::new("rrdtool")
    }
}

impl RrdTool {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<String> {
        let command = format!("{} {}", self.binary.display(), args.join(" "));
        info!(command = %command, "rrdtool");
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::ExternalToolFailure {
                command: command.clone(),
                output: e.to_string(),
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalToolFailure {
                command,
                output: format!("{} {}", stderr.trim(), stdout.trim()).trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

/// `create <path> --step N --start T DS:... RRA:...`
pub fn create_args(path: &Path, spec: &SeriesSpec) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        path.display().to_string(),
        "--step".to_string(),
        spec.step.to_string(),
        "--start".to_string(),
        spec.start.to_string(),
    ];
    for ds in &spec.data_sources {
        args.push(format!(
            "DS:{}:{}:{}:U:U",
            ds.name,
            ds.kind.as_str(),
            ds.heartbeat
        ));
    }
    for rra in &spec.archives {
        args.push(format!(
            "RRA:{}:{:.2}:{}:{}",
            rra.consolidation.as_str(),
            rra.xff,
            rra.steps,
            rra.rows
        ));
    }
    args
}

/// `update <path> t:v:v:v ...`
pub fn update_args(path: &Path, points: &[SeriesPoint]) -> Vec<String> {
    let mut args = Vec::with_capacity(points.len() + 2);
    args.push("update".to_string());
    args.push(path.display().to_string());
    args.extend(points.iter().map(SeriesPoint::to_arg));
    args
}

impl SeriesStore for RrdTool {
    fn extension(&self) -> &str {
        "rrd"
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }

    async fn last_update(&self, path: &Path) -> Result<i64> {
        let args = vec!["last".to_string(), path.display().to_string()];
        let out = self.run(&args).await?;
        out.trim()
            .parse::<i64>()
            .map_err(|_| Error::ExternalToolFailure {
                command: format!("{} {}", self.binary.display(), args.join(" ")),
                output: format!("unparsable timestamp {:?}", out.trim()),
            })
    }

    async fn create(&self, path: &Path, spec: &SeriesSpec) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.run(&create_args(path, spec)).await?;
        Ok(())
    }

    async fn update(&self, path: &Path, points: &[SeriesPoint]) -> Result<()> {
        for batch in points.chunks(UPDATE_BATCH) {
            self.run(&update_args(path, batch)).await?;
        }
        Ok(())
    }
}
