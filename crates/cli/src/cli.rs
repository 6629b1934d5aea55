// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing with clap derive.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::RunOptions;
use crate::config::duration::parse_duration;
use crate::environment::{EnvSet, Mode};
use crate::error::{Error, Result};

/// Runs specs natively and in a headless browser, with coverage and XUnit reports
#[derive(Parser)]
#[command(name = "castle")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "CASTLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Time budget for each external process (e.g. 90s, 5m)
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run specs in both environments
    Test(SpecArgs),
    /// Run browser specs
    TestClient(SpecArgs),
    /// Run native specs
    TestServer(SpecArgs),
    /// Write HTML coverage for both environments
    Cov(SpecArgs),
    /// Write HTML coverage for browser specs
    CovClient(SpecArgs),
    /// Write HTML coverage for native specs
    CovServer(SpecArgs),
    /// Write LCOV traces for both environments
    Lcov(SpecArgs),
    /// Write an LCOV trace for browser specs
    LcovClient(SpecArgs),
    /// Write an LCOV trace for native specs
    LcovServer(SpecArgs),
    /// Write XUnit reports for both environments
    Xunit(SpecArgs),
    /// Write an XUnit report for browser specs
    XunitClient(SpecArgs),
    /// Write an XUnit report for native specs
    XunitServer(SpecArgs),
    /// Run static analysis over the source tree
    Analyze,
}

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecArgs {
    /// Run only this spec (name or path relative to the spec root)
    #[arg(value_name = "SPEC")]
    pub spec: Option<String>,
}

impl Command {
    /// Mode, environments, and spec filter this command requests.
    pub fn plan(&self) -> (Mode, EnvSet, Option<&str>) {
        use Command::*;
        let (mode, envs, args) = match self {
            Test(a) => (Mode::Test, EnvSet::Both, Some(a)),
            TestClient(a) => (Mode::Test, EnvSet::Browser, Some(a)),
            TestServer(a) => (Mode::Test, EnvSet::Native, Some(a)),
            Cov(a) => (Mode::Coverage, EnvSet::Both, Some(a)),
            CovClient(a) => (Mode::Coverage, EnvSet::Browser, Some(a)),
            CovServer(a) => (Mode::Coverage, EnvSet::Native, Some(a)),
            Lcov(a) => (Mode::Lcov, EnvSet::Both, Some(a)),
            LcovClient(a) => (Mode::Lcov, EnvSet::Browser, Some(a)),
            LcovServer(a) => (Mode::Lcov, EnvSet::Native, Some(a)),
            Xunit(a) => (Mode::Xunit, EnvSet::Both, Some(a)),
            XunitClient(a) => (Mode::Xunit, EnvSet::Browser, Some(a)),
            XunitServer(a) => (Mode::Xunit, EnvSet::Native, Some(a)),
            Analyze => (Mode::Analyze, EnvSet::Both, None),
        };
        (mode, envs, args.and_then(|a| a.spec.as_deref()))
    }
}

impl Cli {
    /// The command to run; a bare invocation runs `test`.
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Test(SpecArgs::default()))
    }

    /// Run options for the requested command and global flags.
    pub fn run_options(&self) -> Result<RunOptions> {
        let command = self.command_or_default();
        let (mode, envs, filter) = command.plan();

        if filter.is_some_and(|name| name.trim().is_empty()) {
            return Err(Error::Argument("spec name must not be empty".to_string()));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Argument(
                "--timeout must be greater than zero".to_string(),
            ));
        }

        let mut options = RunOptions::new(mode, envs);
        options.filter = filter.map(str::to_string);
        options.timeout = self.timeout;
        Ok(options)
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
