// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use super::*;
use crate::config::RunOptions;
use crate::environment::{EnvSet, Mode};
use crate::test_utils::{FakeSpawner, create_tree, sample_context, sample_project};

#[test]
fn analyzer_gets_destination_and_sources() {
    let dir = sample_project();
    let spawner = Arc::new(FakeSpawner::new());
    let ctx = sample_context(dir.path(), RunOptions::new(Mode::Analyze, EnvSet::Both), &spawner);

    let dest = run(&ctx).unwrap();

    assert_eq!(dest, dir.path().join("reports/analysis"));
    assert!(dest.is_dir());
    let inv = &spawner.invocations_of("plato")[0];
    assert_eq!(inv.args[0], "-r");
    assert_eq!(inv.args[1], "-d");
    assert_eq!(inv.args[2], dest.to_string_lossy());
    let files: Vec<&str> = inv.args[3..].iter().map(String::as_str).collect();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("lib/dom.js"));
    assert!(files[1].ends_with("lib/util.js"));
}

#[test]
fn nested_sources_are_included() {
    let dir = sample_project();
    create_tree(dir.path(), &[("lib/models/user.js", ""), ("lib/README.md", "")]);
    let spawner = Arc::new(FakeSpawner::new());
    let ctx = sample_context(dir.path(), RunOptions::new(Mode::Analyze, EnvSet::Both), &spawner);

    run(&ctx).unwrap();

    let inv = &spawner.invocations()[0];
    assert!(inv.args.iter().any(|a| a.ends_with("lib/models/user.js")));
    assert!(!inv.args.iter().any(|a| a.ends_with("README.md")));
}

#[test]
fn missing_sources_skip_analyzer() {
    let dir = crate::test_utils::temp_project();
    let spawner = Arc::new(FakeSpawner::new());
    let ctx = sample_context(dir.path(), RunOptions::new(Mode::Analyze, EnvSet::Both), &spawner);

    run(&ctx).unwrap();

    assert!(spawner.invocations().is_empty());
}

#[test]
fn analyzer_failure_is_spawn_error() {
    let dir = sample_project();
    let spawner = Arc::new(FakeSpawner::new());
    spawner.respond("plato", "", 1, "", "plato: parse error\n");
    let ctx = sample_context(dir.path(), RunOptions::new(Mode::Analyze, EnvSet::Both), &spawner);

    let err = run(&ctx).unwrap_err();

    assert!(matches!(err, Error::Spawn { code: Some(1), .. }));
}
