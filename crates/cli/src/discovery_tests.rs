// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn finds_config_in_current_dir() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("castle.toml");
    fs::write(&config_path, "[specs]\n").unwrap();

    let found = find_config(dir.path());
    assert_eq!(found, Some(config_path));
}

#[test]
fn finds_config_in_parent_dir() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("castle.toml");
    fs::write(&config_path, "[specs]\n").unwrap();

    let subdir = dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();

    let found = find_config(&subdir);
    assert_eq!(found, Some(config_path));
}

#[test]
fn stops_at_git_root() {
    let dir = tempdir().unwrap();

    // Create .git directory (git root marker)
    let git_dir = dir.path().join(".git");
    fs::create_dir(&git_dir).unwrap();

    // Create subdir without config
    let subdir = dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();

    // No config anywhere - should return None at git root
    let found = find_config(&subdir);
    assert_eq!(found, None);
}

#[test]
fn finds_config_before_git_root() {
    let dir = tempdir().unwrap();

    // Create .git directory
    let git_dir = dir.path().join(".git");
    fs::create_dir(&git_dir).unwrap();

    // Create config at git root
    let config_path = dir.path().join("castle.toml");
    fs::write(&config_path, "[specs]\n").unwrap();

    // Create subdir
    let subdir = dir.path().join("subdir");
    fs::create_dir(&subdir).unwrap();

    let found = find_config(&subdir);
    assert_eq!(found, Some(config_path));
}

#[test]
fn returns_none_when_no_config() {
    let dir = tempdir().unwrap();

    // Create .git directory to stop at
    let git_dir = dir.path().join(".git");
    fs::create_dir(&git_dir).unwrap();

    let found = find_config(dir.path());
    assert_eq!(found, None);
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = resolve_config(Some(&missing), dir.path()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn explicit_config_wins_over_discovery() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("castle.toml"), "[specs]\n").unwrap();
    let other = dir.path().join("ci.toml");
    fs::write(&other, "[specs]\n").unwrap();

    let found = resolve_config(Some(&other), dir.path()).unwrap();
    assert_eq!(found, Some(other));
}

#[test]
fn project_root_is_config_parent() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("castle.toml");
    assert_eq!(project_root(Some(&config), Path::new("/elsewhere")), dir.path());
}

#[test]
fn project_root_falls_back_to_cwd() {
    assert_eq!(project_root(None, Path::new("/work")), PathBuf::from("/work"));
    assert_eq!(
        project_root(Some(Path::new("castle.toml")), Path::new("/work")),
        PathBuf::from("/work")
    );
}
