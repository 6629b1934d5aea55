// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use crate::environment::Environment;

/// Castle error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found or invalid
    #[error("config error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid command-line arguments
    #[error("argument error: {0}")]
    Argument(String),

    /// File I/O error
    #[error("io error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single requested spec is not part of the resolved spec set.
    #[error("spec not found: {name} (searched {environment} and shared specs)")]
    SpecNotFound {
        name: String,
        environment: Environment,
    },

    /// The coverage instrumenter exited unsuccessfully.
    #[error("instrumentation failed ({}):\n{stderr}", describe_code(.code))]
    Instrumentation { code: Option<i32>, stderr: String },

    /// An external runner process failed or wrote to stderr.
    #[error("{program} failed on {} ({}):\n{stderr}", .target.display(), describe_code(.code))]
    Spawn {
        program: String,
        target: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    /// An external process exceeded its time budget and was killed.
    #[error("{program} timed out after {after:?}")]
    Timeout { program: String, after: Duration },

    /// An external process was killed because a sibling run failed.
    #[error("{program} cancelled")]
    Cancelled { program: String },

    /// Harness template could not be compiled or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// Coverage payload was not valid JSON coverage output.
    #[error("invalid coverage payload from {origin}: {message}")]
    Payload { origin: String, message: String },

    /// XUnit document could not be read or written.
    #[error("xunit error: {0}")]
    Xml(String),

    /// Internal error (bug)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error only reports that a sibling failure stopped the run.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Result type using castle Error
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// All requested runs completed
    Success = 0,
    /// A test run, instrumentation, or external runner failed
    TestsFailed = 1,
    /// Configuration or argument error
    ConfigError = 2,
    /// Internal error
    InternalError = 3,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config { .. } | Error::Argument(_) | Error::SpecNotFound { .. } => {
                ExitCode::ConfigError
            }
            Error::Instrumentation { .. }
            | Error::Spawn { .. }
            | Error::Timeout { .. }
            | Error::Cancelled { .. } => ExitCode::TestsFailed,
            Error::Io { .. }
            | Error::Template(_)
            | Error::Payload { .. }
            | Error::Xml(_)
            | Error::Internal(_) => ExitCode::InternalError,
        }
    }
}

/// Process status for an error.
///
/// Runner failures carry the child's own exit code through to the caller.
pub fn exit_status(err: &Error) -> i32 {
    match err {
        Error::Spawn {
            code: Some(code), ..
        } if *code != 0 => *code,
        _ => ExitCode::from(err) as i32,
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
