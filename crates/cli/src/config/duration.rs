// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time budgets for spawned processes.
//!
//! Accepted forms: `"500ms"`, `"30s"`, `"1.5s"`, `"5m"`, `"1h"`.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Parse a duration string such as `"30s"` or `"5m"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let invalid = || format!("invalid duration: {s}");

    // "ms" before "m" and "s"
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.trim().parse().map_err(|_| invalid())?;
        return Ok(Duration::from_millis(n));
    }
    if let Some(secs) = s.strip_suffix('s') {
        let n: f64 = secs.trim().parse().map_err(|_| invalid())?;
        if !n.is_finite() || n < 0.0 {
            return Err(format!("negative or non-finite duration: {s}"));
        }
        return Ok(Duration::from_secs_f64(n));
    }
    if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.trim().parse().map_err(|_| invalid())?;
        return Ok(Duration::from_secs(n.saturating_mul(60)));
    }
    if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.trim().parse().map_err(|_| invalid())?;
        return Ok(Duration::from_secs(n.saturating_mul(3600)));
    }

    Err(format!(
        "invalid duration format: {s} (use 500ms, 30s, 5m, or 1h)"
    ))
}

/// Render a duration in the shortest accepted form that round-trips.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if d.subsec_millis() != 0 || millis == 0 {
        return format!("{millis}ms");
    }
    let secs = d.as_secs();
    if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

pub fn serialize<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_duration(*d))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
