// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Castle CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use termcolor::StandardStream;
use tracing_subscriber::{EnvFilter, fmt};

use castle::cli::Cli;
use castle::color::resolve_color;
use castle::config::{self, Config};
use castle::discovery;
use castle::error::{ExitCode, exit_status};
use castle::orchestrator::{self, RunContext};
use castle::output::TextFormatter;
use castle::process::ProcessSpawner;

fn init_logging() {
    let filter = EnvFilter::try_from_env("CASTLE_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let code = match run() {
        Ok(()) => ExitCode::Success as i32,
        Err(e) => match e.downcast_ref::<castle::Error>() {
            Some(err) => {
                report_failure(err);
                exit_status(err)
            }
            None => {
                eprintln!("castle: {}", e);
                ExitCode::InternalError as i32
            }
        },
    };

    std::process::exit(code);
}

fn report_failure(err: &castle::Error) {
    let mut formatter = TextFormatter::new(StandardStream::stderr(resolve_color()), PathBuf::new());
    if formatter.write_failure(err).is_err() {
        eprintln!("castle: {}", err);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = cli.run_options()?;
    let cwd = std::env::current_dir()?;

    let config_path = discovery::resolve_config(cli.config.as_deref(), &cwd)?;
    let config = match &config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            config::load(path)?
        }
        None => {
            tracing::debug!("no {} found, using defaults", config::CONFIG_FILE);
            Config::default()
        }
    };
    let root = discovery::project_root(config_path.as_deref(), &cwd);

    let resolved = config::resolve(&config, &root, options);
    let ctx = RunContext::new(resolved, Arc::new(ProcessSpawner));
    let report = orchestrator::run(&ctx)?;

    let mut formatter = TextFormatter::new(StandardStream::stdout(resolve_color()), root.clone());
    formatter.write_report(&report)?;
    Ok(())
}
