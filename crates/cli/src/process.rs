// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! External process execution.
//!
//! Every external tool (instrumenter, native runner, browser driver, analyzer)
//! is started through a [`Spawner`], so runs can be observed and scripted in
//! tests. [`ProcessSpawner`] is the real implementation: it drains both output
//! pipes on helper threads, enforces the invocation's timeout, and kills the
//! child as soon as the run's [`CancelToken`] fires.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Shared cancellation flag for every process started by one run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl Invocation {
    /// Start from a configured command line (program plus leading arguments).
    pub fn from_command(command: &[String], cwd: &Path) -> Result<Self> {
        let (program, args) = command.split_first().ok_or_else(|| Error::Config {
            message: "command must name a program".to_string(),
            path: None,
        })?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            cwd: cwd.to_path_buf(),
            env: Vec::new(),
            timeout: None,
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Command line for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code (None when killed by a signal).
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

impl ToolOutput {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// First lines of stderr, for error messages.
    pub fn stderr_excerpt(&self, lines: usize) -> String {
        String::from_utf8_lossy(&self.stderr)
            .lines()
            .take(lines)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_stderr(&self) -> bool {
        self.stderr.iter().any(|b| !b.is_ascii_whitespace())
    }
}

/// Starts external processes and waits for them.
pub trait Spawner: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// Returns `Error::Timeout` when its time budget runs out and
    /// `Error::Cancelled` when `cancel` fires first; a non-zero exit is not an
    /// error at this level.
    fn spawn(&self, invocation: &Invocation, cancel: &CancelToken) -> Result<ToolOutput>;
}

/// Spawner backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, invocation: &Invocation, cancel: &CancelToken) -> Result<ToolOutput> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                program: invocation.program.clone(),
            });
        }

        tracing::debug!("spawning {}", invocation.display());
        let start = Instant::now();

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::io(&invocation.program, e))?;

        let output = wait_with_timeout(child, invocation, cancel, start)?;
        tracing::debug!(
            code = ?output.code,
            elapsed = ?output.elapsed,
            "{} finished",
            invocation.program
        );
        Ok(output)
    }
}

/// Poll interval while waiting on a child.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Wait for `child`, killing it on timeout or cancellation.
///
/// Output pipes are drained on their own threads so a chatty child can never
/// block on a full pipe while we poll.
fn wait_with_timeout(
    mut child: Child,
    invocation: &Invocation,
    cancel: &CancelToken,
    start: Instant,
) -> Result<ToolOutput> {
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status: ExitStatus = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if cancel.is_cancelled() {
                    kill(&mut child);
                    return Err(Error::Cancelled {
                        program: invocation.program.clone(),
                    });
                }
                if let Some(limit) = invocation.timeout
                    && start.elapsed() > limit
                {
                    kill(&mut child);
                    return Err(Error::Timeout {
                        program: invocation.program.clone(),
                        after: limit,
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(Error::io(&invocation.program, e)),
        }
    };

    Ok(ToolOutput {
        code: status.code(),
        success: status.success(),
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
        elapsed: start.elapsed(),
    })
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            tracing::warn!("failed to read child output: {}", e);
        }
        buf
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| Error::Internal("output reader thread panicked".to_string())),
        None => Ok(Vec::new()),
    }
}

fn kill(child: &mut Child) {
    child.kill().ok();
    child.wait().ok();
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
