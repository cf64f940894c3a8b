// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Run orchestration with typed phase transitions.
//!
//! Implements the run lifecycle: Discover → Setup → Execute → Cleanup → Done.
//! Every artifact generated during Setup is removed in Cleanup, whether the
//! run succeeds, fails or is interrupted.

use crate::artifact::{ArtifactSet, CleanupReport};
use crate::config::Config;
use crate::error::{BenchinitError, BenchinitResult, HardValidationError, SetupError};
use crate::layout::{self, Sizes};
use crate::loader::ModuleLoader;
use crate::module::{ModuleGraph, TargetModule};
use crate::runner::{Runner, RunnerInvocation};
use crate::synth::{render_harness, render_stub, HarnessPlan};
use crate::types::{GoIdent, ModulePath};
use crate::walker::collect_initializers;

/// Run lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Loading modules and their import graph.
    Discover,

    /// Generating artifacts per target.
    Setup,

    /// The runner is executing the benchmarks.
    Execute,

    /// Removing generated artifacts.
    Cleanup,

    /// Run finished.
    Done,
}

impl RunPhase {
    /// Get the phase name for log messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Discover => "Discover",
            Self::Setup => "Setup",
            Self::Execute => "Execute",
            Self::Cleanup => "Cleanup",
            Self::Done => "Done",
        }
    }

    /// Check if transition to the target phase is valid.
    pub fn can_transition_to(&self, target: RunPhase) -> bool {
        matches!(
            (self, target),
            // Load failures leave nothing to clean up
            (Self::Discover, Self::Setup) |
            (Self::Discover, Self::Done) |
            // Setup failures skip Execute
            (Self::Setup, Self::Execute) |
            (Self::Setup, Self::Cleanup) |
            (Self::Execute, Self::Cleanup) |
            (Self::Cleanup, Self::Done)
        )
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What to run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Module patterns; empty means the current directory.
    pub patterns: Vec<String>,
    /// Flags passed to the runner verbatim.
    pub runner_flags: Vec<String>,
    /// Reset the initializers of transitive imports too.
    pub recursive: bool,
}

/// Outcome of a successful run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Modules handed to the runner.
    pub targets: Vec<ModulePath>,
    /// Targets left without artifacts.
    pub skipped: Vec<ModulePath>,
    pub cleanup: CleanupReport,
}

/// Drives one benchmark run.
pub struct Orchestrator<L, R> {
    config: Config,
    sizes: Sizes,
    loader: L,
    runner: R,
    phase: RunPhase,
}

impl<L: ModuleLoader, R: Runner> Orchestrator<L, R> {
    /// Create an orchestrator for the configured target architecture.
    pub fn new(config: Config, loader: L, runner: R) -> Result<Self, HardValidationError> {
        let arch = config.target_arch()?;
        tracing::debug!(arch = arch.name(), "Using target architecture");
        Ok(Self {
            sizes: Sizes::for_arch(arch),
            config,
            loader,
            runner,
            phase: RunPhase::Discover,
        })
    }

    /// Current phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn advance(&mut self, next: RunPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
    }

    /// Generate the artifacts for one target.
    ///
    /// Returns `None` for a target with nothing to benchmark. On error every
    /// file created for this target has already been removed.
    pub fn setup_target(
        &self,
        target: &TargetModule,
        graph: &ModuleGraph,
        recursive: bool,
    ) -> Result<Option<ArtifactSet>, SetupError> {
        if target.is_empty() {
            tracing::info!(module = %target.path, "No source files, skipping");
            return Ok(None);
        }
        if self.config.exclusions.contains(&target.path) {
            tracing::warn!(module = %target.path, "Initializer cannot be reset, skipping");
            return Ok(None);
        }

        let package_name =
            GoIdent::new(&target.name).map_err(|_| SetupError::InvalidPackageName {
                module: target.path.clone(),
                name: target.name.clone(),
            })?;
        let initializers =
            collect_initializers(graph, &target.path, recursive, &self.config.exclusions);
        let zero_regions = layout::analyze(target, &self.sizes)?;

        let plan = HarnessPlan {
            module: target.path.clone(),
            package_name,
            benchmark: self.config.runner.benchmark.clone(),
            initializers,
            zero_regions,
            symbols: self.config.symbols.clone(),
        };

        let mut artifacts = ArtifactSet::new(target.dir.clone());
        artifacts.create(&self.config.artifacts.harness_file, &render_harness(&plan))?;
        artifacts.create(&self.config.artifacts.stub_file, &render_stub(&plan))?;

        tracing::info!(
            module = %target.path,
            initializers = plan.initializers.len(),
            registries = plan.zero_regions.len(),
            "Generated harness"
        );
        Ok(Some(artifacts))
    }

    /// Load, set up, run and clean up.
    ///
    /// Each call starts a fresh lifecycle from Discover.
    pub async fn run(&mut self, request: &RunRequest) -> BenchinitResult<RunSummary> {
        self.phase = RunPhase::Discover;
        let loaded = match self.loader.load(&request.patterns) {
            Ok(loaded) => loaded,
            Err(e) => {
                self.advance(RunPhase::Done);
                return Err(e.into());
            }
        };

        self.advance(RunPhase::Setup);
        let mut summary = RunSummary::default();
        let mut artifacts = Vec::new();
        let mut failures = Vec::new();

        for target in &loaded.targets {
            summary.targets.push(target.path.clone());
            match self.setup_target(target, &loaded.graph, request.recursive) {
                Ok(Some(set)) => artifacts.push(set),
                Ok(None) => summary.skipped.push(target.path.clone()),
                Err(e) => {
                    tracing::debug!(module = %target.path, "Setup failed: {}", e);
                    let aborts = e.aborts_run();
                    failures.push(e);
                    if aborts {
                        break;
                    }
                }
            }
        }

        if !failures.is_empty() {
            self.advance(RunPhase::Cleanup);
            summary.cleanup = cleanup_all(&mut artifacts);
            self.advance(RunPhase::Done);

            let failed = failures.len();
            let total = loaded.targets.len();
            if failed == 1 {
                if let Some(only) = failures.pop() {
                    return Err(only.into());
                }
            }
            // SetupFailed names no target
            for e in &failures {
                tracing::error!("benchmark: {}", e);
            }
            return Err(BenchinitError::SetupFailed { failed, total });
        }

        self.advance(RunPhase::Execute);
        let invocation = RunnerInvocation::go_test(
            self.config.runner.program.clone(),
            &self.config.runner.benchmark,
            &request.runner_flags,
            &summary.targets,
        );
        let outcome = self.runner.run(&invocation).await;

        self.advance(RunPhase::Cleanup);
        summary.cleanup = cleanup_all(&mut artifacts);
        self.advance(RunPhase::Done);

        outcome?;
        if !summary.cleanup.is_clean() {
            return Err(BenchinitError::Cleanup {
                failed: summary.cleanup.failed.len(),
            });
        }
        Ok(summary)
    }
}

fn cleanup_all(artifacts: &mut Vec<ArtifactSet>) -> CleanupReport {
    let mut report = CleanupReport::default();
    for mut set in artifacts.drain(..) {
        report.merge(set.cleanup());
    }
    tracing::debug!(
        removed = report.removed.len(),
        failed = report.failed.len(),
        "Cleanup finished"
    );
    report
}
