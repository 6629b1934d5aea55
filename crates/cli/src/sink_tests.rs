// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::test_utils::create_tree;

#[test]
fn file_sink_replaces_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    create_tree(dir.path(), &[("reports/server-coverage/index.html", "stale report")]);
    let path = dir.path().join("reports/server-coverage/index.html");

    let mut sink = ReportSink::file(&path).unwrap();
    sink.write_chunk(b"<html>").unwrap();
    let written = sink.finish().unwrap();

    assert_eq!(written.as_deref(), Some(path.as_path()));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>");
}

#[test]
fn file_sink_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/xunit.xml");

    let sink = ReportSink::file(&path).unwrap();

    assert!(path.exists());
    assert_eq!(sink.finish().unwrap(), Some(path));
}

#[test]
fn dropped_sink_flushes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.json");

    let result: Result<()> = (|| {
        let mut sink = ReportSink::file(&path)?;
        sink.write_chunk(b"{\"files\":")?;
        Err(Error::Internal("runner crashed".to_string()))
    })();

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"files\":");
}

#[test]
fn stdout_sink_has_no_path() {
    let sink = ReportSink::stdout();
    assert_eq!(sink.finish().unwrap(), None);
}
