// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchinit Core Library
//!
//! Benchmarks the package initializers of Go modules. For each target a
//! throwaway benchmark harness is generated next to the module's sources,
//! `go test` runs it, and the generated files are removed afterwards.

pub mod artifact;
pub mod config;
pub mod error;
pub mod flags;
pub mod gotype;
pub mod layout;
pub mod loader;
pub mod module;
pub mod orchestrator;
pub mod runner;
pub mod synth;
pub mod types;
pub mod walker;

// Re-export commonly used types
pub use artifact::{ArtifactSet, CleanupReport};
pub use config::{Config, ConfigLoader};
pub use error::{
    BenchinitError, BenchinitResult, HardValidationError, LoadError, RunnerError, SetupError,
};
pub use flags::{split_args, SplitArgs};
pub use layout::{LayoutDescriptor, Sizes};
pub use loader::{GoListLoader, ModuleLoader};
pub use module::{LoadedModules, ModuleGraph, PackageVar, TargetModule, TypeName};
pub use orchestrator::{Orchestrator, RunPhase, RunRequest, RunSummary};
pub use runner::{GoTestRunner, Runner, RunnerInvocation};
pub use types::{GoArch, GoIdent, ModulePath};
pub use walker::{collect_initializers, Exclusions};
