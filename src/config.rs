use serde::Deserialize;

use crate::filter::IgnoreRules;
use crate::formatters::DEFAULT_DISPLAY_WIDTH;
use crate::series::parse_update_interval;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub report: ReportConfig,
    /// Required only for the rrd medium.
    pub rrd: Option<RrdConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Regexes matched against `server.database.table`; any match drops the row.
    #[serde(default)]
    pub report_ignore: Vec<String>,
    #[serde(default = "default_display_width")]
    pub display_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            report_ignore: Vec::new(),
            display_width: default_display_width(),
        }
    }
}

fn default_display_width() -> usize {
    DEFAULT_DISPLAY_WIDTH
}

#[derive(Debug, Clone, Deserialize)]
pub struct RrdConfig {
    /// Directory holding one series file per table.
    pub path: String,
    /// `<number>[m|h|d]` or seconds; becomes the series step.
    pub update_interval: String,
    #[serde(default = "default_rrdtool")]
    pub rrdtool: String,
}

fn default_rrdtool() -> String {
    "rrdtool".into()
}

const MIN_DISPLAY_WIDTH: usize = 40;

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.report.display_width >= MIN_DISPLAY_WIDTH,
            "report.display_width must be >= {}, got {}",
            MIN_DISPLAY_WIDTH,
            self.report.display_width
        );
        self.ignore_rules()?;
        if let Some(rrd) = &self.rrd {
            anyhow::ensure!(!rrd.path.is_empty(), "rrd.path must be non-empty");
            anyhow::ensure!(!rrd.rrdtool.is_empty(), "rrd.rrdtool must be non-empty");
            parse_update_interval(&rrd.update_interval)?;
        }
        Ok(())
    }

    pub fn ignore_rules(&self) -> crate::error::Result<IgnoreRules> {
        IgnoreRules::compile(&self.report.report_ignore)
    }
}
