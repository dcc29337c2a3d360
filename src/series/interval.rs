// update_interval parsing: `<number>[m|h|d]` or bare seconds, normalized to whole seconds.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Largest accepted step; rrdtool keeps steps and heartbeats as unsigned longs.
pub const MAX_INTERVAL_SECS: u64 = u32::MAX as u64;

fn interval_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)?)([mhd])?$").expect("interval regex"))
}

/// "30m" -> 1800, "2h" -> 7200, "1d" -> 86400, "120" -> 120, "1.5h" -> 5400.
pub fn parse_update_interval(input: &str) -> Result<u64> {
    let input = input.trim();
    let caps = interval_re().captures(input).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "update_interval {:?} is not <number>[m|h|d] or a number of seconds",
            input
        ))
    })?;
    let value: f64 = caps[1]
        .parse()
        .map_err(|e| Error::InvalidArgument(format!("update_interval {:?}: {}", input, e)))?;
    let multiplier = match caps.get(2).map(|m| m.as_str()) {
        Some("m") => 60.0,
        Some("h") => 3600.0,
        Some("d") => 86400.0,
        _ => 1.0,
    };
    let seconds = value * multiplier;
    if seconds < 1.0 {
        return Err(Error::InvalidArgument(
            "update_interval must resolve to a number greater than 0".to_string(),
        ));
    }
    if seconds > MAX_INTERVAL_SECS as f64 {
        return Err(Error::InvalidArgument(format!(
            "update_interval {:?} exceeds {} seconds",
            input, MAX_INTERVAL_SECS
        )));
    }
    Ok(seconds as u64)
}
