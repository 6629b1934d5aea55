// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration parsing and validation.
//!
//! Handles castle.toml parsing with version validation and unknown key warnings.
//! Paths stay exactly as written here; [`resolve`] turns them into an absolute
//! [`RunConfiguration`].

pub mod duration;
mod resolve;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use resolve::{
    BrowserSettings, CoverageSettings, HarnessSettings, LoaderSettings, ModuleMap,
    NativeSettings, RunConfiguration, RunOptions, normalize_path, resolve,
};

/// Currently supported config version.
pub const SUPPORTED_VERSION: i64 = 1;

/// Default config file name.
pub const CONFIG_FILE: &str = "castle.toml";

/// Known top-level keys in the config.
const KNOWN_KEYS: &[&str] = &[
    "version",
    "loader",
    "mocks",
    "specs",
    "coverage",
    "reporting",
    "native",
    "browser",
    "harness",
    "analyze",
];

/// Full configuration, as written in castle.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Config file version (must be 1).
    pub version: i64,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub mocks: ModuleConfig,

    #[serde(default)]
    pub specs: SpecsConfig,

    #[serde(default)]
    pub coverage: CoverageConfig,

    #[serde(default)]
    pub reporting: ReportingConfig,

    #[serde(default)]
    pub native: NativeConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub harness: HarnessConfig,

    #[serde(default)]
    pub analyze: AnalyzeConfig,
}

/// A module-loader path map: a base directory plus alias -> relative path.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    #[serde(default)]
    pub base_url: Option<PathBuf>,

    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

/// Module-loader configuration with optional per-environment overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoaderConfig {
    /// Base directory used by environments without their own override.
    #[serde(default)]
    pub base_url: Option<PathBuf>,

    #[serde(default)]
    pub paths: BTreeMap<String, String>,

    /// Loader entry point embedded into harness documents.
    #[serde(default)]
    pub entry: Option<PathBuf>,

    #[serde(default)]
    pub native: Option<ModuleConfig>,

    #[serde(default)]
    pub browser: Option<ModuleConfig>,

    #[serde(default)]
    pub shared: Option<ModuleConfig>,
}

impl LoaderConfig {
    /// The top-level map, used when no environment override applies.
    pub fn common(&self) -> ModuleConfig {
        ModuleConfig {
            base_url: self.base_url.clone(),
            paths: self.paths.clone(),
        }
    }
}

/// Spec discovery configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecsConfig {
    /// Spec base directory.
    pub root: PathBuf,

    /// Native-only spec globs (or directories), relative to `root`.
    pub native: Vec<String>,

    /// Browser-only spec globs (or directories), relative to `root`.
    pub browser: Vec<String>,

    /// Specs run in both environments.
    pub shared: Vec<String>,

    /// File pattern applied inside directory entries.
    pub pattern: String,

    /// Harness output root (default: `<root>/html`).
    pub harness_dir: Option<PathBuf>,
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("test/specs"),
            native: Vec::new(),
            browser: Vec::new(),
            shared: Vec::new(),
            pattern: Self::default_pattern(),
            harness_dir: None,
        }
    }
}

impl SpecsConfig {
    pub(crate) fn default_pattern() -> String {
        "**/*.js".to_string()
    }
}

/// Coverage instrumentation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageConfig {
    /// Source root to instrument.
    pub src: PathBuf,

    /// Instrumented-output root.
    pub dest: PathBuf,

    /// Directory name excluded from instrumentation and path rewriting.
    pub exclude: Option<String>,

    /// Source encoding passed to the instrumenter.
    pub encoding: Option<String>,

    /// Keep syntax highlighting in instrumented sources.
    pub highlight: bool,

    /// Constructs the instrumenter should leave alone.
    pub no_instrument: Option<String>,

    /// Language-version dialect for the instrumenter.
    pub js_version: Option<String>,

    /// Instrumenter program.
    pub command: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("lib"),
            dest: PathBuf::from("lib-cov"),
            exclude: None,
            encoding: None,
            highlight: false,
            no_instrument: None,
            js_version: None,
            command: "jscoverage".to_string(),
        }
    }
}

/// Report destination.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportingConfig {
    pub dest: PathBuf,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            dest: PathBuf::from("reports"),
        }
    }
}

/// Native runner command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NativeConfig {
    /// Program and leading arguments; reporter and spec files are appended.
    pub command: Vec<String>,

    /// Flag that selects the reporter.
    pub reporter_flag: String,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            command: vec!["mocha".to_string(), "--ui".to_string(), "bdd".to_string()],
            reporter_flag: "--reporter".to_string(),
        }
    }
}

/// Headless browser driver command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Program and leading arguments; harness path and reporter are appended.
    pub driver: Vec<String>,

    /// Flag that selects the reporter.
    pub reporter_flag: String,

    /// Time budget for each spawned process.
    #[serde(with = "duration")]
    pub timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            driver: vec!["mocha-phantomjs".to_string()],
            reporter_flag: "-R".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Harness document generation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Handlebars template (built-in template when unset).
    pub template: Option<PathBuf>,

    /// Base path of harness support files (default: `node_modules/castle`).
    pub support_dir: Option<PathBuf>,

    /// Test-library aliases injected into the browser loader config.
    pub libraries: BTreeMap<String, String>,
}

/// Static analysis command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeConfig {
    pub command: Vec<String>,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            command: vec!["plato".to_string(), "-r".to_string()],
        }
    }
}

/// Load and validate config from a file path.
pub fn load(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse(&content, path)
}

/// Parse config from string content, warning on unknown top-level keys.
pub fn parse(content: &str, path: &Path) -> Result<Config> {
    let config_error = |message: String| Error::Config {
        message,
        path: Some(path.to_path_buf()),
    };

    let table: toml::Table = toml::from_str(content).map_err(|e| config_error(e.to_string()))?;

    let version = table
        .get("version")
        .ok_or_else(|| config_error("missing required field: version".to_string()))?
        .as_integer()
        .ok_or_else(|| config_error("version must be an integer".to_string()))?;

    if version != SUPPORTED_VERSION {
        return Err(config_error(format!(
            "unsupported config version {} (supported: {})\n  Upgrade castle to use this config.",
            version, SUPPORTED_VERSION
        )));
    }

    for key in table.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn_unknown_key(path, key);
        }
    }

    toml::from_str(content).map_err(|e| config_error(e.to_string()))
}

fn warn_unknown_key(path: &Path, key: &str) {
    tracing::warn!("{}: unrecognized field `{}` (ignored)", path.display(), key);
    eprintln!(
        "castle: warning: {}: unrecognized field `{}` (ignored)",
        path.display(),
        key
    );
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
