// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text output formatter.
//!
//! One status line per environment, then the artifacts it wrote:
//! ```text
//! <environment>: PASS (<n> specs, <coverage>%)
//!   <artifact>
//! ```
//!
//! A failed run prints a single `castle: FAIL <error>` line instead.

use std::path::{Path, PathBuf};

use termcolor::WriteColor;

use crate::color::scheme;
use crate::error::Error;
use crate::orchestrator::{EnvironmentReport, RunReport};

/// Text output formatter with color support.
pub struct TextFormatter<W: WriteColor> {
    out: W,
    root: PathBuf,
}

impl<W: WriteColor> TextFormatter<W> {
    /// Create a formatter; artifact paths are shown relative to `root`.
    pub fn new(out: W, root: impl Into<PathBuf>) -> Self {
        Self {
            out,
            root: root.into(),
        }
    }

    /// Write the summary of a finished run.
    pub fn write_report(&mut self, report: &RunReport) -> std::io::Result<()> {
        for env in &report.environments {
            self.write_environment(env)?;
        }

        if let Some(dir) = &report.analysis {
            self.out.set_color(&scheme::env_name())?;
            write!(self.out, "analyze")?;
            self.out.reset()?;
            write!(self.out, ": ")?;
            self.out.set_color(&scheme::pass())?;
            write!(self.out, "PASS")?;
            self.out.reset()?;
            writeln!(self.out)?;
            self.write_path(dir)?;
        }

        self.out.flush()
    }

    /// Write a failed run: `castle: FAIL <error>`.
    pub fn write_failure(&mut self, err: &Error) -> std::io::Result<()> {
        self.out.set_color(&scheme::env_name())?;
        write!(self.out, "castle")?;
        self.out.reset()?;
        write!(self.out, ": ")?;
        self.out.set_color(&scheme::fail())?;
        write!(self.out, "FAIL")?;
        self.out.reset()?;
        writeln!(self.out, " {err}")?;
        self.out.flush()
    }

    fn write_environment(&mut self, env: &EnvironmentReport) -> std::io::Result<()> {
        self.out.set_color(&scheme::env_name())?;
        write!(self.out, "{}", env.environment)?;
        self.out.reset()?;
        write!(self.out, ": ")?;

        if env.specs == 0 {
            self.out.set_color(&scheme::skip())?;
            write!(self.out, "SKIP")?;
            self.out.reset()?;
            writeln!(self.out, " (no specs)")?;
            return Ok(());
        }

        self.out.set_color(&scheme::pass())?;
        write!(self.out, "PASS")?;
        self.out.reset()?;
        write!(
            self.out,
            " ({} spec{}",
            env.specs,
            if env.specs == 1 { "" } else { "s" }
        )?;
        if let Some(percent) = env.coverage {
            write!(self.out, ", ")?;
            self.out.set_color(&scheme::coverage(percent))?;
            write!(self.out, "{percent:.1}%")?;
            self.out.reset()?;
        }
        writeln!(self.out, ")")?;

        for artifact in &env.artifacts {
            self.write_path(artifact)?;
        }
        Ok(())
    }

    fn write_path(&mut self, path: &Path) -> std::io::Result<()> {
        let shown = path.strip_prefix(&self.root).unwrap_or(path);
        write!(self.out, "  ")?;
        self.out.set_color(&scheme::path())?;
        write!(self.out, "{}", shown.display())?;
        self.out.reset()?;
        writeln!(self.out)
    }

    /// Consume the formatter, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
