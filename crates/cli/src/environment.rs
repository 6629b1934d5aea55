// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Execution environments and run modes.

use std::fmt;

use serde::Serialize;

/// One of the two contexts a spec runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// In-process runner on the host (the "server" side).
    Native,
    /// Headless browser driven through generated harness documents (the "client" side).
    Browser,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Native => "native",
            Environment::Browser => "browser",
        }
    }

    /// Report subdirectory under the reporting destination.
    pub fn report_dir(self) -> &'static str {
        match self {
            Environment::Native => "server-coverage",
            Environment::Browser => "client-coverage",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environments requested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvSet {
    Native,
    Browser,
    Both,
}

impl EnvSet {
    /// Requested environments, native first.
    pub fn environments(self) -> Vec<Environment> {
        match self {
            EnvSet::Native => vec![Environment::Native],
            EnvSet::Browser => vec![Environment::Browser],
            EnvSet::Both => vec![Environment::Native, Environment::Browser],
        }
    }
}

/// What a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Run specs with the plain spec reporter.
    Test,
    /// Instrument, run, and write an HTML coverage page.
    Coverage,
    /// Instrument, run, and write an LCOV trace file.
    Lcov,
    /// Run and write a combined XUnit document.
    Xunit,
    /// Static analysis of the source tree; no specs are run.
    Analyze,
}

impl Mode {
    /// Whether this mode runs against the instrumented source tree.
    pub fn instruments(self) -> bool {
        matches!(self, Mode::Coverage | Mode::Lcov)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Test => "test",
            Mode::Coverage => "coverage",
            Mode::Lcov => "lcov",
            Mode::Xunit => "xunit",
            Mode::Analyze => "analyze",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
