// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.
//!
//! Projects are built in temp dirs with shell scripts standing in for the
//! native runner, browser driver, and instrumenter.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::PredicateBooleanExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Returns a Command configured to run the castle binary
pub fn castle_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("castle"));
    cmd.env_remove("CASTLE_CONFIG").env_remove("CASTLE_LOG");
    cmd
}

/// A scratch project with a castle.toml and spec tree.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// An empty project whose tools all succeed silently.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        // Stop config discovery from escaping the temp dir.
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let project = Self { dir };
        project.file("lib/util.js", "define(function () { return 1; });\n");
        project.tool("native", "exit 0");
        project.tool("driver", "exit 0");
        project.tool("instrument", "mkdir -p \"$2\"; exit 0");
        project.tool("analyze", "exit 0");
        project
    }

    /// Project with one native and one browser spec.
    pub fn with_specs() -> Self {
        let project = Self::new();
        project.file("test/specs/native/fs.js", "describe('fs', function () {});\n");
        project.file("test/specs/browser/dom.js", "describe('dom', function () {});\n");
        project.config("");
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write a file, creating parents.
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Replace a stand-in tool's script body.
    pub fn tool(&self, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let rel = format!("tools/{name}.sh");
        self.file(&rel, &format!("#!/bin/sh\n{body}\n"));
        std::fs::set_permissions(self.join(&rel), std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Write castle.toml wired to the stand-in tools, plus `extra` TOML.
    pub fn config(&self, extra: &str) {
        let config = format!(
            r#"version = 1

[specs]
native = ["native"]
browser = ["browser"]

[coverage]
command = "{instrument}"

[native]
command = ["sh", "tools/native.sh"]

[browser]
driver = ["sh", "tools/driver.sh"]
timeout = "30s"

[analyze]
command = ["sh", "tools/analyze.sh"]
{extra}
"#,
            instrument = self.join("tools/instrument.sh").display(),
        );
        self.file("castle.toml", &config);
    }

    /// A castle command running inside the project.
    pub fn cmd(&self) -> Command {
        let mut cmd = castle_cmd();
        cmd.current_dir(self.path()).env("NO_COLOR", "1");
        cmd
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.join(rel)).unwrap()
    }
}

/// A coverage payload for `filename` with `hits` covered and `misses`
/// uncovered lines.
pub fn coverage_json(filename: &str, hits: u32, misses: u32) -> String {
    let mut lines = Vec::new();
    for line in 1..=hits + misses {
        let count = if line <= hits { 1 } else { 0 };
        lines.push(format!(
            r#""{line}": {{ "coverage": {count}, "source": "line {line}" }}"#
        ));
    }
    let total = hits + misses;
    let percent = if total == 0 {
        0.0
    } else {
        f64::from(hits) * 100.0 / f64::from(total)
    };
    format!(
        r#"{{"files": [{{"filename": "{filename}", "hits": {hits}, "misses": {misses}, "sloc": {total}, "coverage": {percent}, "source": {{ {} }}}}], "hits": {hits}, "misses": {misses}, "sloc": {total}, "coverage": {percent}}}"#,
        lines.join(", ")
    )
}
