// Ignore rules: drop rows whose `server.database.table` matches any configured pattern.
// Patterns are compiled once at config load; a bad pattern is a configuration error there, never per row.

use std::borrow::Cow;

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{SeriesIdent, TrackedRow};

#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<Regex>,
}

impl IgnoreRules {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let rules = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    Error::Configuration(format!("report_ignore pattern {:?}: {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Unanchored search; any matching rule rejects.
    pub fn is_ignored(&self, ident: &SeriesIdent) -> bool {
        let key = ident.key();
        self.rules.iter().any(|r| r.is_match(&key))
    }

    /// Borrowed input when there are no rules, otherwise the surviving rows in order.
    pub fn apply<'a>(&self, rows: &'a [TrackedRow]) -> Cow<'a, [TrackedRow]> {
        if self.rules.is_empty() {
            return Cow::Borrowed(rows);
        }
        let kept: Vec<TrackedRow> = rows
            .iter()
            .filter(|r| !self.is_ignored(&r.ident))
            .cloned()
            .collect();
        if kept.len() < rows.len() {
            tracing::debug!(
                rejected = rows.len() - kept.len(),
                kept = kept.len(),
                "ignore rules applied"
            );
        }
        Cow::Owned(kept)
    }
}
