// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared unit test utilities.
//!
//! Provides project scaffolding and a scripted [`Spawner`] for unit tests in
//! the cli crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;

use crate::config::{RunConfiguration, RunOptions};
use crate::error::{Error, Result};
use crate::orchestrator::RunContext;
use crate::process::{CancelToken, Invocation, Spawner, ToolOutput};

/// Creates a temp directory with a minimal castle.toml.
pub fn temp_project() -> TempDir {
    temp_project_with_config("version = 1\n")
}

/// Creates a temp directory with custom config content.
pub fn temp_project_with_config(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("castle.toml"), config).unwrap();
    dir
}

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically.
///
/// # Example
///
/// ```ignore
/// let tmp = temp_project();
/// create_tree(tmp.path(), &[
///     ("lib/util.js", "module.exports = 1;"),
///     ("test/specs/native/util.js", "describe('util', ...);"),
/// ]);
/// ```
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// Spawner lifecycle event, in the order the fake observed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnEvent {
    Start(String),
    Finish(String),
}

/// Scripted reply for invocations whose command line contains a needle.
#[derive(Debug, Clone)]
pub enum Reply {
    Output(ToolOutput),
    Timeout,
}

/// A [`Spawner`] that never starts processes.
///
/// Invocations are recorded; replies are looked up by program name plus a
/// substring of the joined arguments. Unmatched invocations succeed with empty
/// output.
#[derive(Default)]
pub struct FakeSpawner {
    replies: Mutex<Vec<(String, String, Reply)>>,
    invocations: Mutex<Vec<Invocation>>,
    events: Mutex<Vec<SpawnEvent>>,
    delay: Option<Duration>,
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep inside every spawn, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reply to `program` invocations whose arguments contain `needle`.
    pub fn reply(&self, program: &str, needle: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .push((program.to_string(), needle.to_string(), reply));
    }

    /// Shorthand for a finished process with the given exit code and output.
    pub fn respond(&self, program: &str, needle: &str, code: i32, stdout: &str, stderr: &str) {
        self.reply(program, needle, Reply::Output(output(code, stdout, stderr)));
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn invocations_of(&self, program: &str) -> Vec<Invocation> {
        self.invocations()
            .into_iter()
            .filter(|inv| inv.program == program)
            .collect()
    }

    pub fn events(&self) -> Vec<SpawnEvent> {
        self.events.lock().unwrap().clone()
    }

    fn lookup(&self, invocation: &Invocation) -> Option<Reply> {
        let joined = invocation.args.join(" ");
        self.replies
            .lock()
            .unwrap()
            .iter()
            .find(|(program, needle, _)| *program == invocation.program && joined.contains(needle))
            .map(|(_, _, reply)| reply.clone())
    }
}

impl Spawner for FakeSpawner {
    fn spawn(&self, invocation: &Invocation, cancel: &CancelToken) -> Result<ToolOutput> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled {
                program: invocation.program.clone(),
            });
        }
        let label = invocation.display();
        self.invocations.lock().unwrap().push(invocation.clone());
        self.events
            .lock()
            .unwrap()
            .push(SpawnEvent::Start(label.clone()));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let reply = self.lookup(invocation);
        self.events.lock().unwrap().push(SpawnEvent::Finish(label));
        match reply {
            Some(Reply::Output(out)) => Ok(out),
            Some(Reply::Timeout) => Err(Error::Timeout {
                program: invocation.program.clone(),
                after: invocation.timeout.unwrap_or_default(),
            }),
            None => Ok(output(0, "", "")),
        }
    }
}

/// A finished process result.
pub fn output(code: i32, stdout: &str, stderr: &str) -> ToolOutput {
    ToolOutput {
        code: Some(code),
        success: code == 0,
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        elapsed: Duration::ZERO,
    }
}

/// Parse `config` and resolve it against `root`.
pub fn resolved_config(root: &Path, config: &str, options: RunOptions) -> RunConfiguration {
    let parsed = crate::config::parse(config, &root.join("castle.toml")).unwrap();
    crate::config::resolve(&parsed, root, options)
}

/// Config of [`sample_project`].
pub const SAMPLE_CONFIG: &str = r#"
version = 1

[loader]
base_url = "lib"
paths = { util = "util", dom = "dom" }

[specs]
native = ["native"]
browser = ["browser"]
shared = ["shared"]
"#;

/// A project with one native, one browser, and one shared spec.
pub fn sample_project() -> TempDir {
    let dir = temp_project_with_config(SAMPLE_CONFIG);
    create_tree(
        dir.path(),
        &[
            ("lib/util.js", "define(function () { return 1; });"),
            ("lib/dom.js", "define(function () { return document; });"),
            ("test/specs/native/fs.js", "describe('fs', function () {});"),
            ("test/specs/browser/dom.js", "describe('dom', function () {});"),
            ("test/specs/shared/util.js", "describe('util', function () {});"),
        ],
    );
    dir
}

/// A run context over `root` backed by `spawner`.
pub fn sample_context(
    root: &Path,
    options: RunOptions,
    spawner: &std::sync::Arc<FakeSpawner>,
) -> RunContext {
    let config = std::fs::read_to_string(root.join("castle.toml")).unwrap();
    RunContext::new(resolved_config(root, &config, options), spawner.clone())
}

/// A JSON coverage payload with one file.
pub fn coverage_payload(filename: &str, hits: u64, misses: u64) -> String {
    let mut source = serde_json::Map::new();
    for line in 0..hits + misses {
        let count = if line < hits { 1 } else { 0 };
        source.insert(
            (line + 1).to_string(),
            serde_json::json!({ "coverage": count, "source": format!("line {}", line + 1) }),
        );
    }
    source.insert(
        (hits + misses + 1).to_string(),
        serde_json::json!({ "coverage": "", "source": "" }),
    );
    serde_json::json!({
        "files": [{
            "filename": filename,
            "hits": hits,
            "misses": misses,
            "sloc": hits + misses,
            "source": source,
        }],
        "hits": hits,
        "misses": misses,
        "sloc": hits + misses,
    })
    .to_string()
}
