// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! LCOV trace output.

use std::fmt::Write;

use super::CoverageFormatter;
use crate::coverage::CoverageResult;

/// LCOV formatter: one `SF`/`DA`/`end_of_record` block per file.
pub struct LcovFormatter;

impl CoverageFormatter for LcovFormatter {
    fn file_name(&self) -> &'static str {
        "index.lcov"
    }

    fn format(&self, result: &CoverageResult) -> String {
        let mut out = String::new();
        for file in &result.files {
            let _ = writeln!(out, "SF:{}", file.filename);
            for (line, cov) in &file.source {
                if let Some(count) = cov.coverage.count() {
                    let _ = writeln!(out, "DA:{line},{count}");
                }
            }
            out.push_str("end_of_record\n");
        }
        out
    }
}

#[cfg(test)]
#[path = "lcov_tests.rs"]
mod tests;
