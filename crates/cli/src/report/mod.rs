// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Report writers.
//!
//! Aggregated coverage is serialized as an HTML page or an LCOV trace;
//! per-harness XUnit documents are merged into one. Every artifact replaces
//! any previous file at its path.

mod html;
mod lcov;
mod xunit;

use std::path::{Path, PathBuf};

use crate::coverage::CoverageResult;
use crate::error::{Error, Result};

pub use html::{CoverageBand, HtmlFormatter};
pub use lcov::LcovFormatter;
pub use xunit::{XunitDocument, XunitReport, XunitSummary, merge_xunit};

/// Name of the XUnit artifact in a report directory.
pub const XUNIT_FILE: &str = "xunit.xml";

/// Serializes an aggregated coverage result.
pub trait CoverageFormatter {
    /// Artifact file name within the report directory.
    fn file_name(&self) -> &'static str;

    fn format(&self, result: &CoverageResult) -> String;
}

/// Write `result` into `dir` with `formatter`.
pub fn write_coverage(
    formatter: &dyn CoverageFormatter,
    result: &CoverageResult,
    dir: &Path,
) -> Result<PathBuf> {
    let path = dir.join(formatter.file_name());
    write_artifact(&path, &formatter.format(result))?;
    Ok(path)
}

/// Delete any previous artifact at `path`, then write `contents`.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| Error::io(path, e))?;
    }
    std::fs::write(path, contents).map_err(|e| Error::io(path, e))?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
