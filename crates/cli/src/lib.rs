// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod analyze;
pub mod cli;
pub mod color;
pub mod config;
pub mod coverage;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod harness;
pub mod instrument;
pub mod orchestrator;
pub mod output;
pub mod process;
pub mod report;
pub mod runners;
pub mod sink;
pub mod spec;

pub use cli::{Cli, Command, SpecArgs};
pub use config::{Config, RunConfiguration, RunOptions};
pub use coverage::CoverageResult;
pub use environment::{EnvSet, Environment, Mode};
pub use error::{Error, ExitCode, Result};
pub use orchestrator::{Orchestrator, RunContext, RunReport};
pub use process::{ProcessSpawner, Spawner};

#[cfg(test)]
pub mod test_utils;
