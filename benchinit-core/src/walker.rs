// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Dependency walker.
//!
//! Collects the initializers whose guard flags a harness re-arms: the target
//! itself and, in recursive mode, every module reachable from it without
//! passing through an excluded module.

use std::collections::{BTreeSet, HashSet};

use crate::module::ModuleGraph;
use crate::types::ModulePath;

/// Modules whose one-shot state must never be reset.
///
/// `runtime` underpins everything, `testing` runs the benchmark itself,
/// `os/signal` owns `signal.Notify` state and `time` owns the monotonic clock.
pub const HARD_EXCLUSIONS: [&str; 4] = ["runtime", "testing", "os/signal", "time"];

/// The set of modules the walker never records or descends into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusions {
    modules: BTreeSet<ModulePath>,
}

impl Exclusions {
    /// Only the hard exclusions.
    pub fn hard() -> Self {
        let modules = HARD_EXCLUSIONS
            .iter()
            .map(|p| ModulePath::new_unchecked(*p))
            .collect();
        Self { modules }
    }

    /// Hard exclusions plus `extra`. Extra entries can only widen the set.
    pub fn with_extra(extra: impl IntoIterator<Item = ModulePath>) -> Self {
        let mut exclusions = Self::hard();
        exclusions.modules.extend(extra);
        exclusions
    }

    pub fn contains(&self, module: &ModulePath) -> bool {
        self.modules.contains(module)
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::hard()
    }
}

/// Collect initializer references starting at `target`, in pre-order.
///
/// Imports are visited in sorted order, so the result is identical across
/// runs for the same graph. Each module appears at most once. Imports that
/// are missing from the graph are skipped.
pub fn collect_initializers(
    graph: &ModuleGraph,
    target: &ModulePath,
    recursive: bool,
    exclusions: &Exclusions,
) -> Vec<ModulePath> {
    let mut inits = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![target.clone()];

    while let Some(module) = stack.pop() {
        if !seen.insert(module.clone()) {
            continue;
        }
        if exclusions.contains(&module) {
            tracing::trace!(module = %module, "Skipping excluded module");
            continue;
        }
        let imports = graph.imports(&module);
        if imports.is_none() && module != *target {
            tracing::debug!(module = %module, "Import not in module graph");
            continue;
        }
        inits.push(module.clone());
        if !recursive {
            break;
        }
        if let Some(imports) = imports {
            stack.extend(imports.iter().rev().cloned());
        }
    }

    tracing::debug!(
        target = %target,
        recursive = recursive,
        initializers = inits.len(),
        "Collected initializers"
    );
    inits
}
