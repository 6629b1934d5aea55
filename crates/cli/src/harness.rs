// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Browser harness generation.
//!
//! Every browser spec gets one generated HTML document that configures the
//! module loader and loads the spec. Harness documents are disposable build
//! output and are rewritten on every browser run.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::RunConfiguration;
use crate::environment::Environment;
use crate::error::{Error, Result};
use crate::spec::{SpecFile, SpecId};

/// Template used when `harness.template` is not configured.
const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{{title}}</title>
  <link rel="stylesheet" href="{{basePath}}/vendor/mocha.css">
</head>
<body>
  <div id="mocha"></div>
  <script src="{{basePath}}/vendor/mocha.js"></script>
  <script src="{{requirejsPath}}"></script>
  <script>
    window.castle = { config: {{{castle}}} };
    mocha.setup('bdd');
    require.config({{{config}}});
    require(['{{spec}}'], function () {
      if (window.mochaPhantomJS) {
        mochaPhantomJS.run();
      } else {
        mocha.run();
      }
    });
  </script>
</body>
</html>
"#;

const TEMPLATE_NAME: &str = "harness";

/// A generated harness document for one browser spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harness {
    pub id: SpecId,
    /// Absolute spec path.
    pub spec: PathBuf,
    /// Absolute harness document path.
    pub path: PathBuf,
}

/// Harness document path for a spec.
///
/// The spec's path relative to `spec_root` is re-rooted under `harness_dir`
/// with an `.html` extension. Specs outside the spec root keep only their file
/// name.
pub fn harness_path_of(spec_root: &Path, harness_dir: &Path, spec_path: &Path) -> PathBuf {
    let relative = match spec_path.strip_prefix(spec_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => spec_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| spec_path.to_path_buf()),
    };
    harness_dir.join(relative).with_extension("html")
}

/// Module-loader configuration embedded in a harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderDocument {
    pub base_url: String,
    pub paths: BTreeMap<String, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateData<'a> {
    title: &'a str,
    config: String,
    spec: String,
    castle: String,
    base_path: String,
    requirejs_path: String,
}

/// Renders harness documents for one run.
pub struct HarnessGenerator<'a> {
    config: &'a RunConfiguration,
    registry: Handlebars<'static>,
}

impl<'a> HarnessGenerator<'a> {
    /// Compile the configured template, or the built-in one.
    pub fn new(config: &'a RunConfiguration) -> Result<Self> {
        let source = match &config.harness.template {
            Some(path) => std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?,
            None => DEFAULT_TEMPLATE.to_string(),
        };
        let mut registry = Handlebars::new();
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| Error::Template(e.to_string()))?;
        Ok(Self { config, registry })
    }

    /// Harnesses to generate: the filtered spec, or every browser spec.
    pub fn plan(&self, filter: Option<&str>) -> Result<Vec<Harness>> {
        let specs: Vec<&SpecFile> = match filter {
            Some(name) => vec![self.config.specs.find(name, Environment::Browser)?],
            None => self.config.specs.for_environment(Environment::Browser),
        };
        let harnesses: Vec<Harness> = specs
            .into_iter()
            .map(|spec| Harness {
                id: spec.id.clone(),
                spec: spec.path.clone(),
                path: harness_path_of(
                    &self.config.specs.root,
                    &self.config.harness.dir,
                    &spec.path,
                ),
            })
            .collect();

        // Specs differing only in extension would share one document.
        let mut seen: BTreeMap<&Path, &Path> = BTreeMap::new();
        for harness in &harnesses {
            if let Some(other) = seen.insert(&harness.path, &harness.spec) {
                return Err(Error::Config {
                    message: format!(
                        "specs {} and {} both map to harness {}",
                        other.display(),
                        harness.spec.display(),
                        harness.path.display()
                    ),
                    path: None,
                });
            }
        }
        Ok(harnesses)
    }

    /// Write harness documents and return them in spec order.
    ///
    /// Every document is attempted even when another fails; the first
    /// failure is returned afterwards.
    pub fn generate(&self, filter: Option<&str>) -> Result<Vec<Harness>> {
        let harnesses = self.plan(filter)?;
        let loader = serde_json::to_string(&self.loader_document())
            .map_err(|e| Error::Internal(format!("serialize loader config: {e}")))?;
        let castle = serde_json::to_string(self.config)
            .map_err(|e| Error::Internal(format!("serialize run config: {e}")))?;

        let results: Vec<Result<()>> = harnesses
            .par_iter()
            .map(|harness| self.write(harness, &loader, &castle))
            .collect();

        let mut first_error = None;
        for (harness, result) in harnesses.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!("harness {} not written: {}", harness.path.display(), e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => {
                tracing::info!("generated {} harness document(s)", harnesses.len());
                Ok(harnesses)
            }
        }
    }

    /// Browser loader map with the test libraries injected.
    ///
    /// Coverage runs load sources from the instrumented tree.
    pub fn loader_document(&self) -> LoaderDocument {
        let map = self.config.loader.for_environment(Environment::Browser);
        let base_url = if self.config.mode.instruments() {
            &self.config.coverage.dest
        } else {
            &map.base_url
        };
        let mut paths = map.paths.clone();
        paths.extend(self.config.harness.libraries.clone());
        LoaderDocument {
            base_url: base_url.to_string_lossy().into_owned(),
            paths,
        }
    }

    fn write(&self, harness: &Harness, loader: &str, castle: &str) -> Result<()> {
        let data = TemplateData {
            title: harness.id.as_str(),
            config: loader.to_string(),
            spec: harness.spec.to_string_lossy().into_owned(),
            castle: castle.to_string(),
            base_path: self.config.harness.support_dir.to_string_lossy().into_owned(),
            requirejs_path: self.config.loader.entry.to_string_lossy().into_owned(),
        };
        let rendered = self
            .registry
            .render(TEMPLATE_NAME, &data)
            .map_err(|e| Error::Template(e.to_string()))?;

        if let Some(parent) = harness.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        std::fs::write(&harness.path, rendered).map_err(|e| Error::io(&harness.path, e))?;
        tracing::debug!("wrote harness {}", harness.path.display());
        Ok(())
    }
}

#[cfg(test)]
#[path = "harness_tests.rs"]
mod tests;
