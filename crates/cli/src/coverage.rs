// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Coverage results and aggregation.
//!
//! Browser runs each produce one JSON coverage payload. Payload entries are
//! matched to the spec that produced them and accumulated into one running
//! [`CoverageResult`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::spec::SpecId;

/// Recorded hits for one source line.
///
/// `Empty` marks a line with nothing executable on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineHits {
    #[default]
    Empty,
    Count(u64),
}

impl LineHits {
    pub fn count(self) -> Option<u64> {
        match self {
            LineHits::Empty => None,
            LineHits::Count(n) => Some(n),
        }
    }
}

impl Serialize for LineHits {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LineHits::Empty => serializer.serialize_str(""),
            LineHits::Count(n) => serializer.serialize_u64(*n),
        }
    }
}

impl<'de> Deserialize<'de> for LineHits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u64),
            Text(String),
            Null(()),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(LineHits::Count(n)),
            Raw::Null(()) => Ok(LineHits::Empty),
            Raw::Text(s) if s.trim().is_empty() => Ok(LineHits::Empty),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map(LineHits::Count)
                .map_err(|_| serde::de::Error::custom(format!("invalid line coverage: {s:?}"))),
        }
    }
}

/// Coverage of one source line, with its text when the reporter includes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCoverage {
    #[serde(default)]
    pub coverage: LineHits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Coverage of one source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    pub filename: String,
    #[serde(default)]
    pub hits: u64,
    #[serde(default)]
    pub misses: u64,
    #[serde(default)]
    pub sloc: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    /// Line number to coverage.
    #[serde(default)]
    pub source: BTreeMap<u32, LineCoverage>,
}

impl FileCoverage {
    pub fn percentage(&self) -> Option<f64> {
        percentage(self.hits, self.sloc)
    }
}

/// Aggregated coverage across files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    #[serde(default)]
    pub files: Vec<FileCoverage>,
    #[serde(default)]
    pub hits: u64,
    #[serde(default)]
    pub misses: u64,
    #[serde(default)]
    pub sloc: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
}

impl CoverageResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON coverage payload. `origin` names its producer in errors.
    pub fn parse(json: &str, origin: &str) -> Result<Self> {
        let mut result: CoverageResult =
            serde_json::from_str(json).map_err(|e| Error::Payload {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;
        result.recompute();
        Ok(result)
    }

    /// Parse the coverage payload in a runner's stdout.
    ///
    /// Specs may log to the console before or after the reporter prints its
    /// JSON; only the outermost object is parsed.
    pub fn from_runner_output(stdout: &str, origin: &str) -> Result<Self> {
        Self::parse(payload_text(stdout), origin)
    }

    /// Merge the entries of `payload` that belong to `spec`.
    ///
    /// Returns how many file entries were merged. A payload with no entry for
    /// the spec contributes nothing and is logged.
    pub fn merge(&mut self, payload: &CoverageResult, spec: &SpecId) -> usize {
        let mut merged = 0;
        for file in payload
            .files
            .iter()
            .filter(|f| spec.matches_filename(&f.filename))
        {
            self.hits += file.hits;
            self.misses += file.misses;
            self.sloc += file.sloc;
            self.files.push(file.clone());
            merged += 1;
        }

        if merged == 0 {
            tracing::warn!(
                "coverage payload for {} has no matching file entry ({} entries)",
                spec,
                payload.files.len()
            );
        } else {
            tracing::debug!("merged {} coverage entry(ies) for {}", merged, spec);
        }

        self.files.sort_by(|a, b| a.filename.cmp(&b.filename));
        self.recompute();
        merged
    }

    /// Merge payloads in order.
    pub fn aggregate<'a, I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = (&'a SpecId, &'a CoverageResult)>,
    {
        let mut total = Self::new();
        for (spec, payload) in payloads {
            total.merge(payload, spec);
        }
        total
    }

    /// Recompute the coverage percentage from the line totals.
    pub fn recompute(&mut self) {
        self.coverage = percentage(self.hits, self.sloc);
        for file in &mut self.files {
            file.coverage = file.percentage();
        }
    }
}

/// The JSON object in runner output, skipping console noise around it.
fn payload_text(stdout: &str) -> &str {
    match (stdout.find('{'), stdout.rfind('}')) {
        (Some(start), Some(end)) if start < end => &stdout[start..=end],
        _ => stdout,
    }
}

fn percentage(hits: u64, sloc: u64) -> Option<f64> {
    (sloc > 0).then(|| 100.0 * hits as f64 / sloc as f64)
}

#[cfg(test)]
#[path = "coverage_tests.rs"]
mod tests;
