// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Native runner.

use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::orchestrator::RunContext;
use crate::process::Invocation;
use crate::sink::ReportSink;
use crate::spec::SpecFile;

use super::OutputShape;

/// Environment variable carrying the native loader configuration as JSON.
pub const LOADER_CONFIG_ENV: &str = "CASTLE_LOADER_CONFIG";

/// Environment variable carrying the resolved run configuration as JSON.
pub const RUN_CONFIG_ENV: &str = "CASTLE_RUN_CONFIG";

/// Specs the native runner loads: the filtered spec, or every native and
/// shared spec.
pub fn specs_for<'c>(ctx: &'c RunContext, filter: Option<&str>) -> Result<Vec<&'c SpecFile>> {
    match filter {
        Some(name) => Ok(vec![ctx.config.specs.find(name, Environment::Native)?]),
        None => Ok(ctx.config.specs.for_environment(Environment::Native)),
    }
}

/// Run the native specs in one fresh runner process.
///
/// Reporter output goes to `sink`, also when the run fails. Returns the
/// number of specs loaded.
pub fn run(
    ctx: &RunContext,
    filter: Option<&str>,
    shape: OutputShape,
    sink: &mut ReportSink,
) -> Result<usize> {
    let specs = specs_for(ctx, filter)?;
    if specs.is_empty() {
        tracing::info!("no native specs to run");
        return Ok(0);
    }

    let config = &ctx.config;
    let loader = serde_json::to_string(config.loader.for_environment(Environment::Native))
        .map_err(|e| Error::Internal(format!("serialize loader config: {e}")))?;
    let run_config = serde_json::to_string(config)
        .map_err(|e| Error::Internal(format!("serialize run config: {e}")))?;

    let invocation = Invocation::from_command(&config.native.command, &config.root)?
        .arg(&config.native.reporter_flag)
        .arg(shape.reporter())
        .args(specs.iter().map(|s| s.path.to_string_lossy().into_owned()))
        .env(LOADER_CONFIG_ENV, loader)
        .env(RUN_CONFIG_ENV, run_config)
        .timeout(ctx.timeout());

    tracing::info!(
        "running {} native spec(s) with {} reporter",
        specs.len(),
        shape.reporter()
    );
    let output = ctx.spawner.spawn(&invocation, &ctx.cancel)?;
    sink.write_chunk(&output.stdout)?;

    if output.has_stderr() {
        tracing::warn!("native runner stderr:\n{}", output.stderr_excerpt(20));
    }
    if !output.success {
        return Err(Error::Spawn {
            program: invocation.program.clone(),
            target: config.specs.root.clone(),
            code: output.code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(specs.len())
}

#[cfg(test)]
#[path = "native_tests.rs"]
mod tests;
