// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Module loading.
//!
//! The pipeline only sees the [`ModuleLoader`] trait. [`GoListLoader`] is
//! the production implementation; tests substitute in-memory loaders.

pub mod godoc;
pub mod golist;
pub mod scope;

pub use godoc::GoDocResolver;
pub use golist::GoListLoader;

use crate::error::LoadError;
use crate::module::LoadedModules;

/// Source of target modules and their import graph.
pub trait ModuleLoader {
    /// Load the modules matched by `patterns`, plus every module they
    /// transitively import. An empty pattern list means the current
    /// directory.
    fn load(&self, patterns: &[String]) -> Result<LoadedModules, LoadError>;
}
