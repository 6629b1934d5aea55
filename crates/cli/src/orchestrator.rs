// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run orchestration.
//!
//! One [`Orchestrator`] drives one invocation: it validates the requested
//! spec, instruments the source tree in coverage modes, runs each requested
//! environment on its own scoped thread, and turns the branch results into
//! report artifacts. Completion is tracked by a [`RunCompletion`] counter that
//! fires once, when every branch has reported back.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RunConfiguration;
use crate::coverage::CoverageResult;
use crate::environment::{EnvSet, Environment, Mode};
use crate::error::{Error, Result};
use crate::harness::HarnessGenerator;
use crate::instrument::Instrumenter;
use crate::process::{CancelToken, Spawner};
use crate::report::{
    CoverageFormatter, HtmlFormatter, LcovFormatter, XUNIT_FILE, XunitDocument, merge_xunit,
    write_artifact, write_coverage,
};
use crate::runners::{BrowserResults, OutputShape, browser, native};
use crate::sink::ReportSink;

/// Everything one invocation needs. Built per run; nothing is global.
pub struct RunContext {
    pub config: RunConfiguration,
    pub spawner: Arc<dyn Spawner>,
    pub instrumenter: Instrumenter,
    pub cancel: CancelToken,
}

impl RunContext {
    pub fn new(config: RunConfiguration, spawner: Arc<dyn Spawner>) -> Self {
        Self {
            config,
            spawner,
            instrumenter: Instrumenter::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Time budget of every spawned process.
    pub fn timeout(&self) -> Duration {
        self.config.browser.timeout
    }
}

/// Orchestrator lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Configuring,
    Running(EnvSet),
    Aggregating,
    Reporting,
    Done,
}

/// Counts environment branches that have reported back.
#[derive(Debug, Clone)]
pub struct RunCompletion {
    expected: usize,
    completed: usize,
    fired: bool,
}

impl RunCompletion {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            completed: 0,
            fired: false,
        }
    }

    /// Record one finished branch.
    ///
    /// Returns true exactly once: on the call that brings the count to the
    /// expected number.
    pub fn complete(&mut self) -> bool {
        self.completed += 1;
        if !self.fired && self.completed >= self.expected {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn is_done(&self) -> bool {
        self.fired
    }
}

/// Results of one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentReport {
    pub environment: Environment,
    /// Specs executed.
    pub specs: usize,
    /// Report artifacts written.
    pub artifacts: Vec<PathBuf>,
    /// Aggregated coverage percentage, when collected.
    pub coverage: Option<f64>,
}

/// Summary of a finished invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub mode: Mode,
    /// Environments in native, browser order.
    pub environments: Vec<EnvironmentReport>,
    /// Static analysis output directory (analyze mode).
    pub analysis: Option<PathBuf>,
}

/// Raw output of an environment branch, before reporting.
enum BranchOutput {
    /// Spec output went to the terminal.
    Streamed,
    /// The native reporter's output was captured in this file.
    Captured(PathBuf),
    Coverage(CoverageResult),
    Xunit(Vec<XunitDocument>),
}

struct BranchOutcome {
    specs: usize,
    output: BranchOutput,
}

/// Drives one invocation through its states.
pub struct Orchestrator<'a> {
    ctx: &'a RunContext,
    history: Vec<RunState>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            history: vec![RunState::Idle],
        }
    }

    pub fn state(&self) -> RunState {
        self.history.last().copied().unwrap_or(RunState::Idle)
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Run to completion. The orchestrator ends in `Done` whatever the
    /// outcome.
    pub fn run(&mut self) -> Result<RunReport> {
        let result = self.execute();
        self.transition(RunState::Done);
        match &result {
            Ok(_) => tracing::info!("{} run complete", self.ctx.config.mode),
            Err(e) => tracing::error!("{} run failed: {}", self.ctx.config.mode, e),
        }
        result
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!("run state: {:?} -> {:?}", self.state(), next);
        self.history.push(next);
    }

    fn execute(&mut self) -> Result<RunReport> {
        let ctx = self.ctx;
        let config = &ctx.config;
        let mode = config.mode;
        self.transition(RunState::Configuring);

        if mode == Mode::Analyze {
            self.transition(RunState::Running(config.envs));
            let dir = crate::analyze::run(ctx)?;
            return Ok(RunReport {
                mode,
                environments: Vec::new(),
                analysis: Some(dir),
            });
        }

        if config.specs.is_empty() {
            tracing::warn!("no specs found under {}", config.specs.root.display());
        }

        let envs = config.envs.environments();
        if let Some(name) = &config.filter {
            for env in &envs {
                config.specs.find(name, *env)?;
            }
        }

        if mode.instruments() {
            ctx.instrumenter.instrument(
                &config.coverage,
                ctx.spawner.as_ref(),
                &ctx.cancel,
                ctx.timeout(),
            )?;
        }

        self.transition(RunState::Running(config.envs));
        let outcomes = run_branches(ctx, &envs)?;

        if mode != Mode::Test {
            self.transition(RunState::Aggregating);
        }
        let mut aggregated = Vec::new();
        for (env, outcome) in outcomes {
            aggregated.push((env, outcome.specs, aggregate(mode, outcome.output)?));
        }

        if mode != Mode::Test {
            self.transition(RunState::Reporting);
        }
        let mut environments = Vec::new();
        for (env, specs, output) in aggregated {
            let (artifacts, coverage) = report(ctx, env, output)?;
            environments.push(EnvironmentReport {
                environment: env,
                specs,
                artifacts,
                coverage,
            });
        }

        Ok(RunReport {
            mode,
            environments,
            analysis: None,
        })
    }
}

/// Run `ctx` to completion.
pub fn run(ctx: &RunContext) -> Result<RunReport> {
    Orchestrator::new(ctx).run()
}

/// Start every branch without waiting on the others, then join them.
///
/// The first failing branch cancels its siblings; its error is returned once
/// all branches have settled. Outcomes come back in `envs` order.
fn run_branches(
    ctx: &RunContext,
    envs: &[Environment],
) -> Result<Vec<(Environment, BranchOutcome)>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut completion = RunCompletion::new(envs.len());
    let mut settled: Vec<(Environment, Result<BranchOutcome>)> = Vec::new();

    std::thread::scope(|scope| {
        for &env in envs {
            let tx = tx.clone();
            scope.spawn(move || {
                let result = run_branch(ctx, env);
                if let Err(e) = &result
                    && !e.is_cancellation()
                {
                    tracing::debug!("{} branch failed, cancelling siblings", env);
                    ctx.cancel.cancel();
                }
                let _ = tx.send((env, result));
            });
        }
        drop(tx);

        for (env, result) in rx.iter() {
            tracing::debug!("{} branch settled", env);
            settled.push((env, result));
            if completion.complete() {
                break;
            }
        }
    });

    if !completion.is_done() {
        return Err(Error::Internal(
            "environment branch exited without reporting".to_string(),
        ));
    }

    let first_error = settled
        .iter()
        .position(|(_, r)| r.as_ref().is_err_and(|e| !e.is_cancellation()))
        .or_else(|| settled.iter().position(|(_, r)| r.is_err()));
    if let Some(index) = first_error
        && let (_, Err(e)) = settled.swap_remove(index)
    {
        return Err(e);
    }

    let mut outcomes: Vec<(Environment, BranchOutcome)> = settled
        .into_iter()
        .filter_map(|(env, r)| r.ok().map(|o| (env, o)))
        .collect();
    outcomes.sort_by_key(|(env, _)| envs.iter().position(|e| e == env));
    Ok(outcomes)
}

fn run_branch(ctx: &RunContext, env: Environment) -> Result<BranchOutcome> {
    let config = &ctx.config;
    let filter = config.filter.as_deref();
    let shape = OutputShape::for_run(config.mode, env)
        .ok_or_else(|| Error::Internal(format!("{} mode runs no specs", config.mode)))?;

    match env {
        Environment::Native => {
            // No capture file for an empty run; an empty report is not a report.
            if native::specs_for(ctx, filter)?.is_empty() {
                tracing::info!("no native specs to run");
                return Ok(BranchOutcome {
                    specs: 0,
                    output: BranchOutput::Streamed,
                });
            }
            let capture = native_capture(config, shape);
            let mut sink = match &capture {
                Some(path) => ReportSink::file(path)?,
                None => ReportSink::stdout(),
            };
            let specs = native::run(ctx, filter, shape, &mut sink)?;
            let output = match sink.finish()? {
                Some(path) => BranchOutput::Captured(path),
                None => BranchOutput::Streamed,
            };
            Ok(BranchOutcome { specs, output })
        }
        Environment::Browser => {
            let harnesses = HarnessGenerator::new(config)?.generate(filter)?;
            let mut sink = ReportSink::stdout();
            let results = browser::run(ctx, &harnesses, shape, &mut sink)?;
            let specs = results.runs();
            let output = match results {
                BrowserResults::Spec { .. } => BranchOutput::Streamed,
                BrowserResults::Coverage { total, .. } => BranchOutput::Coverage(total),
                BrowserResults::Xunit { documents } => BranchOutput::Xunit(documents),
            };
            Ok(BranchOutcome { specs, output })
        }
    }
}

/// Where the native reporter's output is captured, if anywhere.
fn native_capture(config: &RunConfiguration, shape: OutputShape) -> Option<PathBuf> {
    let dir = config.report_dir(Environment::Native);
    match shape {
        OutputShape::Spec => None,
        OutputShape::HtmlCoverage => Some(dir.join(HtmlFormatter.file_name())),
        OutputShape::JsonCoverage => Some(dir.join("index.json")),
        OutputShape::Xunit => Some(dir.join(XUNIT_FILE)),
    }
}

/// Branch output after aggregation.
enum Aggregated {
    Nothing,
    /// A finished artifact written during the run.
    Artifact(PathBuf),
    /// Coverage to render, and an intermediate file to remove afterwards.
    Coverage {
        result: CoverageResult,
        intermediate: Option<PathBuf>,
    },
    Xunit(String),
}

fn aggregate(mode: Mode, output: BranchOutput) -> Result<Aggregated> {
    Ok(match output {
        BranchOutput::Streamed => Aggregated::Nothing,
        BranchOutput::Captured(path) if mode == Mode::Lcov => {
            let json = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            let result = CoverageResult::from_runner_output(&json, &path.display().to_string())?;
            Aggregated::Coverage {
                result,
                intermediate: Some(path),
            }
        }
        BranchOutput::Captured(path) => Aggregated::Artifact(path),
        BranchOutput::Coverage(result) => Aggregated::Coverage {
            result,
            intermediate: None,
        },
        BranchOutput::Xunit(documents) => Aggregated::Xunit(merge_xunit(&documents)?.xml),
    })
}

fn report(
    ctx: &RunContext,
    env: Environment,
    output: Aggregated,
) -> Result<(Vec<PathBuf>, Option<f64>)> {
    let dir = ctx.config.report_dir(env);
    match output {
        Aggregated::Nothing => Ok((Vec::new(), None)),
        Aggregated::Artifact(path) => Ok((vec![path], None)),
        Aggregated::Coverage {
            result,
            intermediate,
        } => {
            let formatter: &dyn CoverageFormatter = match ctx.config.mode {
                Mode::Lcov => &LcovFormatter,
                _ => &HtmlFormatter,
            };
            let path = write_coverage(formatter, &result, &dir)?;
            if let Some(intermediate) = intermediate {
                std::fs::remove_file(&intermediate).map_err(|e| Error::io(&intermediate, e))?;
            }
            Ok((vec![path], result.coverage))
        }
        Aggregated::Xunit(xml) => {
            let path = dir.join(XUNIT_FILE);
            write_artifact(&path, &xml)?;
            Ok((vec![path], None))
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
