// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Coverage instrumentation.
//!
//! Produces an instrumented copy of the source tree with the external
//! instrumenter. The first successful call marks the [`Instrumenter`] as done;
//! later calls within the same run are no-ops.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::config::CoverageSettings;
use crate::error::{Error, Result};
use crate::process::{CancelToken, Invocation, Spawner};

/// Runs the instrumenter at most once.
#[derive(Debug, Default)]
pub struct Instrumenter {
    done: Mutex<bool>,
}

impl Instrumenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        *self.done.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Instrument `settings.src` into `settings.dest`.
    ///
    /// Concurrent callers wait for the first one; a failed attempt leaves the
    /// instrumenter un-done so a later call retries.
    pub fn instrument(
        &self,
        settings: &CoverageSettings,
        spawner: &dyn Spawner,
        cancel: &CancelToken,
        timeout: Duration,
    ) -> Result<()> {
        let mut done = self.done.lock().unwrap_or_else(PoisonError::into_inner);
        if *done {
            tracing::debug!("source already instrumented, skipping");
            return Ok(());
        }

        if settings.dest.exists() {
            tracing::debug!("removing {}", settings.dest.display());
            std::fs::remove_dir_all(&settings.dest)
                .map_err(|e| Error::io(&settings.dest, e))?;
        }

        let invocation = Invocation::from_command(
            std::slice::from_ref(&settings.command),
            settings.src.parent().unwrap_or(&settings.src),
        )?
        .args(instrument_args(settings))
        .timeout(timeout);

        let output = spawner.spawn(&invocation, cancel)?;
        if !output.success {
            tracing::error!("instrumentation failed: {}", output.stderr_excerpt(20));
            return Err(Error::Instrumentation {
                code: output.code,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::info!(
            "instrumented {} -> {}",
            settings.src.display(),
            settings.dest.display()
        );
        *done = true;
        Ok(())
    }
}

/// Instrumenter arguments: source root, output root, then optional flags.
pub fn instrument_args(settings: &CoverageSettings) -> Vec<String> {
    let mut args = vec![
        settings.src.to_string_lossy().into_owned(),
        settings.dest.to_string_lossy().into_owned(),
    ];
    if !settings.highlight {
        args.push("--no-highlight".to_string());
    }
    let flags = [
        ("--exclude", &settings.exclude),
        ("--encoding", &settings.encoding),
        ("--no-instrument", &settings.no_instrument),
        ("--js-version", &settings.js_version),
    ];
    for (flag, value) in flags {
        if let Some(value) = value {
            args.push(format!("{flag}={value}"));
        }
    }
    args
}

#[cfg(test)]
#[path = "instrument_tests.rs"]
mod tests;
