// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration resolution.
//!
//! Turns a parsed [`Config`] plus the caller's run options into a
//! [`RunConfiguration`] in which every path is absolute and every spec glob
//! has been expanded. Resolution happens once per invocation; the result is
//! read-only for every other component.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use super::{Config, ModuleConfig, SpecsConfig, duration};
use crate::environment::{EnvSet, Environment, Mode};
use crate::spec::SpecSet;

/// Caller-supplied options for one invocation.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: Mode,
    pub envs: EnvSet,
    /// Run only this spec.
    pub filter: Option<String>,
    /// Overrides `browser.timeout`.
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn new(mode: Mode, envs: EnvSet) -> Self {
        Self {
            mode,
            envs,
            filter: None,
            timeout: None,
        }
    }
}

/// A module-loader path map with an absolute base and absolute paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleMap {
    pub base_url: PathBuf,
    pub paths: BTreeMap<String, String>,
}

impl ModuleMap {
    fn resolve(config: &ModuleConfig, root: &Path, fallback_base: &Path) -> Self {
        let base_url = match &config.base_url {
            Some(base) => absolute(root, base),
            None => fallback_base.to_path_buf(),
        };
        let paths = config
            .paths
            .iter()
            .map(|(alias, rel)| {
                let resolved = absolute(&base_url, Path::new(rel));
                (alias.clone(), resolved.to_string_lossy().into_owned())
            })
            .collect();
        Self { base_url, paths }
    }
}

/// Resolved loader maps for every environment.
#[derive(Debug, Clone, Serialize)]
pub struct LoaderSettings {
    pub native: ModuleMap,
    pub browser: ModuleMap,
    pub shared: ModuleMap,
    /// Loader entry point embedded into harness documents.
    pub entry: PathBuf,
}

impl LoaderSettings {
    pub fn for_environment(&self, env: Environment) -> &ModuleMap {
        match env {
            Environment::Native => &self.native,
            Environment::Browser => &self.browser,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverageSettings {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub exclude: Option<String>,
    pub encoding: Option<String>,
    pub highlight: bool,
    pub no_instrument: Option<String>,
    pub js_version: Option<String>,
    pub command: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NativeSettings {
    pub command: Vec<String>,
    pub reporter_flag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrowserSettings {
    pub driver: Vec<String>,
    pub reporter_flag: String,
    #[serde(serialize_with = "duration::serialize")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessSettings {
    pub template: Option<PathBuf>,
    /// Base path of harness support files.
    pub support_dir: PathBuf,
    /// Harness output root.
    pub dir: PathBuf,
    /// Test-library aliases (absolute module paths).
    pub libraries: BTreeMap<String, String>,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfiguration {
    /// Project root every relative path was resolved against.
    pub root: PathBuf,
    pub mode: Mode,
    #[serde(skip)]
    pub envs: EnvSet,
    pub filter: Option<String>,
    pub loader: LoaderSettings,
    pub mocks: ModuleMap,
    pub specs: SpecSet,
    /// File pattern for specs and analyzed sources.
    pub pattern: String,
    pub coverage: CoverageSettings,
    /// Report destination root.
    pub reporting_dest: PathBuf,
    pub native: NativeSettings,
    pub browser: BrowserSettings,
    pub harness: HarnessSettings,
    pub analyze_command: Vec<String>,
}

impl RunConfiguration {
    /// Report directory for an environment.
    pub fn report_dir(&self, env: Environment) -> PathBuf {
        self.reporting_dest.join(env.report_dir())
    }

    /// Report directory for static analysis.
    pub fn analysis_dir(&self) -> PathBuf {
        self.reporting_dest.join("analysis")
    }

    /// Re-root loader paths that point into the source tree at the
    /// instrumented tree, leaving excluded directories alone.
    fn rewrite_coverage_paths(&mut self) {
        let src = self.coverage.src.clone();
        let dest = self.coverage.dest.clone();
        let exclude = self
            .coverage
            .exclude
            .as_deref()
            .map(|ex| format!("/{}/", ex.trim_matches('/')));

        for map in [
            &mut self.loader.native,
            &mut self.loader.browser,
            &mut self.loader.shared,
        ] {
            for value in map.paths.values_mut() {
                if exclude.as_deref().is_some_and(|ex| value.contains(ex)) {
                    continue;
                }
                if let Ok(rest) = Path::new(value.as_str()).strip_prefix(&src) {
                    *value = dest.join(rest).to_string_lossy().into_owned();
                }
            }
        }
    }
}

/// Default test-library aliases, relative to the harness support directory.
const DEFAULT_LIBRARIES: &[(&str, &str)] = &[
    ("squire", "vendor/squire"),
    ("chai", "vendor/chai"),
    ("sinon", "vendor/sinon"),
    ("sinon-chai", "vendor/sinon-chai"),
    ("castle", "castle"),
];

/// Resolve `config` against `root` for one invocation.
pub fn resolve(config: &Config, root: &Path, options: RunOptions) -> RunConfiguration {
    let root = normalize_path(root);

    let common = config.loader.common();
    let common_base = match &common.base_url {
        Some(base) => absolute(&root, base),
        None => root.clone(),
    };
    let module_map = |over: &Option<ModuleConfig>| {
        ModuleMap::resolve(over.as_ref().unwrap_or(&common), &root, &common_base)
    };
    let native = module_map(&config.loader.native);
    let browser = module_map(&config.loader.browser);
    let shared = module_map(&config.loader.shared);

    let support_dir = match &config.harness.support_dir {
        Some(dir) => absolute(&root, dir),
        None => root.join("node_modules").join("castle"),
    };
    let entry = match &config.loader.entry {
        Some(entry) => absolute(&root, entry),
        None => support_dir.join("vendor").join("require.js"),
    };

    let mut libraries: BTreeMap<String, String> = DEFAULT_LIBRARIES
        .iter()
        .map(|(alias, rel)| (alias.to_string(), rel.to_string()))
        .collect();
    libraries.extend(config.harness.libraries.clone());
    let libraries = libraries
        .into_iter()
        .map(|(alias, rel)| {
            let path = absolute(&support_dir, Path::new(&rel));
            (alias, path.to_string_lossy().into_owned())
        })
        .collect();

    let specs_root = absolute(&root, &config.specs.root);
    let harness_dir = match &config.specs.harness_dir {
        Some(dir) => absolute(&root, dir),
        None => specs_root.join("html"),
    };
    let specs = SpecSet::discover(&specs_root, &config.specs, Some(&harness_dir));
    let pattern = if config.specs.pattern.is_empty() {
        SpecsConfig::default_pattern()
    } else {
        config.specs.pattern.clone()
    };

    let mut resolved = RunConfiguration {
        mode: options.mode,
        envs: options.envs,
        filter: options.filter,
        loader: LoaderSettings {
            native,
            browser,
            shared,
            entry,
        },
        mocks: ModuleMap::resolve(&config.mocks, &root, &root),
        specs,
        pattern,
        coverage: CoverageSettings {
            src: absolute(&root, &config.coverage.src),
            dest: absolute(&root, &config.coverage.dest),
            exclude: config.coverage.exclude.clone(),
            encoding: config.coverage.encoding.clone(),
            highlight: config.coverage.highlight,
            no_instrument: config.coverage.no_instrument.clone(),
            js_version: config.coverage.js_version.clone(),
            command: config.coverage.command.clone(),
        },
        reporting_dest: absolute(&root, &config.reporting.dest),
        native: NativeSettings {
            command: config.native.command.clone(),
            reporter_flag: config.native.reporter_flag.clone(),
        },
        browser: BrowserSettings {
            driver: config.browser.driver.clone(),
            reporter_flag: config.browser.reporter_flag.clone(),
            timeout: options.timeout.unwrap_or(config.browser.timeout),
        },
        harness: HarnessSettings {
            template: config.harness.template.as_ref().map(|t| absolute(&root, t)),
            support_dir,
            dir: harness_dir,
            libraries,
        },
        analyze_command: config.analyze.command.clone(),
        root,
    };

    if resolved.mode.instruments() {
        resolved.rewrite_coverage_paths();
    }

    resolved
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    normalize_path(&base.join(path))
}

/// Lexically normalize a path, dropping `.` and folding `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
