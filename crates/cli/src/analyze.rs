// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Static analysis of the source tree.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::orchestrator::RunContext;
use crate::process::Invocation;
use crate::spec::matching_files;

/// Run the analyzer over every source file, writing into the analysis
/// report directory. Returns that directory.
pub fn run(ctx: &RunContext) -> Result<PathBuf> {
    let config = &ctx.config;
    let dest = config.analysis_dir();
    std::fs::create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;

    let files = matching_files(&config.coverage.src, &config.pattern);
    if files.is_empty() {
        tracing::warn!(
            "no files matching {} under {}, skipping analysis",
            config.pattern,
            config.coverage.src.display()
        );
        return Ok(dest);
    }

    let invocation = Invocation::from_command(&config.analyze_command, &config.root)?
        .arg("-d")
        .arg(dest.to_string_lossy())
        .args(files.iter().map(|f| f.to_string_lossy().into_owned()))
        .timeout(ctx.timeout());

    tracing::info!("analyzing {} file(s)", files.len());
    let output = ctx.spawner.spawn(&invocation, &ctx.cancel)?;
    if !output.success {
        return Err(Error::Spawn {
            program: invocation.program.clone(),
            target: config.coverage.src.clone(),
            code: output.code,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(dest)
}

#[cfg(test)]
#[path = "analyze_tests.rs"]
mod tests;
