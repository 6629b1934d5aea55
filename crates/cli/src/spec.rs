// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Spec discovery and lookup.
//!
//! Specs live under one spec root and fall into three categories: native-only,
//! browser-only, and shared. Each category is a list of globs (or plain
//! directories) relative to the root. A malformed glob contributes no specs;
//! it is reported as a warning, never as an error.

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::Serialize;

use crate::config::SpecsConfig;
use crate::environment::Environment;
use crate::error::{Error, Result};

/// Which environments a spec belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecCategory {
    Native,
    Browser,
    Shared,
}

/// Canonical spec identifier: path relative to the spec root, `/`-separated,
/// without extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SpecId(String);

impl SpecId {
    /// Build an identifier from a path relative to the spec root.
    pub fn from_relative(relative: &Path) -> Self {
        let without_ext = relative.with_extension("");
        let id = without_ext
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        SpecId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component (the spec's file stem).
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Whether a coverage payload entry belongs to this spec.
    ///
    /// The entry's filename, without extension, must be a suffix of the
    /// identifier that starts at a path boundary. Comparison ignores case.
    pub fn matches_filename(&self, filename: &str) -> bool {
        let normalized = filename.replace('\\', "/");
        let stem = Path::new(&normalized).with_extension("");
        let stem = stem.to_string_lossy().to_lowercase();
        let stem = stem.trim_start_matches("./");
        if stem.is_empty() {
            return false;
        }
        let id = self.0.to_lowercase();
        id == stem || id.ends_with(&format!("/{stem}"))
    }
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discovered spec file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecFile {
    /// Absolute path.
    pub path: PathBuf,
    pub id: SpecId,
    pub category: SpecCategory,
}

/// All specs resolved for a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpecSet {
    pub root: PathBuf,
    pub native: Vec<SpecFile>,
    pub browser: Vec<SpecFile>,
    pub shared: Vec<SpecFile>,
}

impl SpecSet {
    /// Expand the configured globs under `root`.
    ///
    /// Files under `skip` (the harness output root) are never specs. When no
    /// category lists anything, every `pattern` match under the root is shared.
    pub fn discover(root: &Path, config: &SpecsConfig, skip: Option<&Path>) -> SpecSet {
        if !root.is_dir() {
            tracing::warn!("spec root {} does not exist", root.display());
            return SpecSet {
                root: root.to_path_buf(),
                ..SpecSet::default()
            };
        }

        let files = walk_files(root, skip);
        let pattern = if config.pattern.is_empty() {
            SpecsConfig::default_pattern()
        } else {
            config.pattern.clone()
        };

        let mut set = SpecSet {
            root: root.to_path_buf(),
            ..SpecSet::default()
        };

        if config.native.is_empty() && config.browser.is_empty() && config.shared.is_empty() {
            let globs = build_glob_set(std::slice::from_ref(&pattern));
            set.shared = select(root, &files, &globs, SpecCategory::Shared);
        } else {
            let expand = |entries: &[String]| -> Vec<String> {
                entries.iter().map(|e| expand_entry(e, &pattern)).collect()
            };
            set.native = select(
                root,
                &files,
                &build_glob_set(&expand(&config.native)),
                SpecCategory::Native,
            );
            set.browser = select(
                root,
                &files,
                &build_glob_set(&expand(&config.browser)),
                SpecCategory::Browser,
            );
            set.shared = select(
                root,
                &files,
                &build_glob_set(&expand(&config.shared)),
                SpecCategory::Shared,
            );
        }

        tracing::debug!(
            native = set.native.len(),
            browser = set.browser.len(),
            shared = set.shared.len(),
            "discovered specs under {}",
            root.display()
        );
        set
    }

    /// Specs run in `env`: its own category first, then shared ones.
    pub fn for_environment(&self, env: Environment) -> Vec<&SpecFile> {
        let own = match env {
            Environment::Native => &self.native,
            Environment::Browser => &self.browser,
        };
        own.iter().chain(self.shared.iter()).collect()
    }

    /// Look up a single spec by name for `env`.
    ///
    /// `name` may be a full identifier (`client/widget`) or a bare file name,
    /// with or without extension.
    pub fn find(&self, name: &str, env: Environment) -> Result<&SpecFile> {
        let wanted = SpecId::from_relative(Path::new(name.trim_start_matches("./")));
        let candidates = self.for_environment(env);

        candidates
            .iter()
            .find(|spec| spec.id == wanted)
            .or_else(|| {
                candidates
                    .iter()
                    .find(|spec| spec.id.name() == wanted.as_str())
            })
            .copied()
            .ok_or_else(|| Error::SpecNotFound {
                name: name.to_string(),
                environment: env,
            })
    }

    /// True when no environment has any spec.
    pub fn is_empty(&self) -> bool {
        self.native.is_empty() && self.browser.is_empty() && self.shared.is_empty()
    }
}

/// Whether a string contains glob metacharacters.
pub fn is_glob_pattern(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Absolute paths of files under `root` matching `pattern`, sorted.
pub fn matching_files(root: &Path, pattern: &str) -> Vec<PathBuf> {
    if !root.is_dir() {
        tracing::warn!("{} does not exist", root.display());
        return Vec::new();
    }
    let globs = build_glob_set(&[pattern.to_string()]);
    walk_files(root, None)
        .into_iter()
        .filter(|relative| globs.is_match(relative))
        .map(|relative| root.join(relative))
        .collect()
}

/// Directory entries become `<dir>/<pattern>`; globs pass through.
fn expand_entry(entry: &str, pattern: &str) -> String {
    let entry = entry.trim_start_matches("./");
    if is_glob_pattern(entry) {
        entry.to_string()
    } else {
        format!("{}/{}", entry.trim_end_matches('/'), pattern)
    }
}

/// Build a GlobSet from pattern strings.
///
/// Invalid patterns are logged and skipped.
fn build_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => {
                tracing::warn!("invalid spec glob '{}': {}", pattern, e);
            }
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Every file under `root` as a root-relative path, sorted.
fn walk_files(root: &Path, skip: Option<&Path>) -> Vec<PathBuf> {
    let skip = skip.map(Path::to_path_buf);
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_exclude(false)
        .git_global(false)
        .follow_links(true)
        .filter_entry(move |entry| skip.as_deref().is_none_or(|s| !entry.path().starts_with(s)));

    let mut files: Vec<PathBuf> = builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable spec path: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

fn select(root: &Path, files: &[PathBuf], globs: &GlobSet, category: SpecCategory) -> Vec<SpecFile> {
    if globs.is_empty() {
        return Vec::new();
    }
    files
        .iter()
        .filter(|relative| globs.is_match(relative))
        .map(|relative| SpecFile {
            path: root.join(relative),
            id: SpecId::from_relative(relative),
            category,
        })
        .collect()
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
