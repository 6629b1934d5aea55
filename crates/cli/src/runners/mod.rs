// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment runners.
//!
//! The native runner executes every native spec in one runner process; the
//! browser runner drives one headless-browser process per harness document,
//! strictly one after another.

pub mod browser;
pub mod native;

use crate::environment::{Environment, Mode};

pub use browser::BrowserResults;

/// What a runner's reporter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// Human-readable spec output.
    Spec,
    /// JSON coverage payload.
    JsonCoverage,
    /// Complete HTML coverage page.
    HtmlCoverage,
    /// XUnit XML document.
    Xunit,
}

impl OutputShape {
    /// Reporter name passed to the runner.
    pub fn reporter(self) -> &'static str {
        match self {
            OutputShape::Spec => "spec",
            OutputShape::JsonCoverage => "json-cov",
            OutputShape::HtmlCoverage => "html-cov",
            OutputShape::Xunit => "xunit",
        }
    }

    /// Reporter output for a mode in an environment; `None` when the mode
    /// runs no specs.
    ///
    /// Browser coverage always collects JSON payloads, which are aggregated
    /// and rendered afterwards. Native coverage renders HTML directly.
    pub fn for_run(mode: Mode, env: Environment) -> Option<Self> {
        match (mode, env) {
            (Mode::Test, _) => Some(OutputShape::Spec),
            (Mode::Coverage, Environment::Native) => Some(OutputShape::HtmlCoverage),
            (Mode::Coverage | Mode::Lcov, _) => Some(OutputShape::JsonCoverage),
            (Mode::Xunit, _) => Some(OutputShape::Xunit),
            (Mode::Analyze, _) => None,
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
