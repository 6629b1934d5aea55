// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Browser runner.
//!
//! Each harness runs in its own driver process. Runs are sequential, and the
//! first failing run aborts the rest, so results arrive in harness order.

use crate::coverage::CoverageResult;
use crate::error::{Error, Result};
use crate::harness::Harness;
use crate::orchestrator::RunContext;
use crate::process::Invocation;
use crate::report::XunitDocument;
use crate::sink::ReportSink;

use super::OutputShape;

/// Environment variable tagging a driver process with its spec.
pub const SPEC_ID_ENV: &str = "CASTLE_SPEC_ID";

/// Collected output of a browser run.
#[derive(Debug, Clone)]
pub enum BrowserResults {
    /// Spec output was streamed to the sink.
    Spec { runs: usize },
    /// Aggregated coverage of every run.
    Coverage { runs: usize, total: CoverageResult },
    /// One XUnit document per run.
    Xunit { documents: Vec<XunitDocument> },
}

impl BrowserResults {
    pub fn runs(&self) -> usize {
        match self {
            BrowserResults::Spec { runs } | BrowserResults::Coverage { runs, .. } => *runs,
            BrowserResults::Xunit { documents } => documents.len(),
        }
    }
}

/// Run `harnesses` one at a time.
///
/// Spec output is written to `sink` as each run finishes. A non-zero exit or
/// any stderr output stops the sequence with `Error::Spawn`.
pub fn run(
    ctx: &RunContext,
    harnesses: &[Harness],
    shape: OutputShape,
    sink: &mut ReportSink,
) -> Result<BrowserResults> {
    let mut total = CoverageResult::new();
    let mut documents = Vec::new();

    for (index, harness) in harnesses.iter().enumerate() {
        let invocation = Invocation::from_command(&ctx.config.browser.driver, &ctx.config.root)?
            .arg(harness.path.to_string_lossy())
            .arg(&ctx.config.browser.reporter_flag)
            .arg(shape.reporter())
            .env(SPEC_ID_ENV, harness.id.as_str())
            .timeout(ctx.timeout());

        tracing::debug!("browser run {}/{}: {}", index + 1, harnesses.len(), harness.id);
        let output = ctx.spawner.spawn(&invocation, &ctx.cancel)?;
        if shape == OutputShape::Spec {
            sink.write_chunk(&output.stdout)?;
        }

        if !output.success || output.has_stderr() {
            tracing::error!(
                "{} failed on {}: {}",
                invocation.program,
                harness.path.display(),
                output.stderr_excerpt(5)
            );
            return Err(Error::Spawn {
                program: invocation.program.clone(),
                target: harness.path.clone(),
                code: output.code,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let origin = harness.path.display().to_string();
        match shape {
            OutputShape::Spec => {}
            OutputShape::JsonCoverage => {
                let stdout = output.stdout_lossy();
                let payload = CoverageResult::from_runner_output(&stdout, &origin)?;
                total.merge(&payload, &harness.id);
            }
            OutputShape::Xunit => documents.push(XunitDocument {
                origin,
                xml: output.stdout_lossy(),
            }),
            OutputShape::HtmlCoverage => {
                return Err(Error::Internal(
                    "browser runs cannot render html coverage".to_string(),
                ));
            }
        }
    }

    let runs = harnesses.len();
    tracing::info!("completed {} browser run(s)", runs);
    Ok(match shape {
        OutputShape::JsonCoverage => BrowserResults::Coverage { runs, total },
        OutputShape::Xunit => BrowserResults::Xunit { documents },
        _ => BrowserResults::Spec { runs },
    })
}

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;
