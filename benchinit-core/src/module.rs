// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Loaded modules and their import graph.
//!
//! Everything here is produced by a [`crate::loader::ModuleLoader`] and is
//! read-only to the rest of the pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::gotype::Type;
use crate::types::ModulePath;

/// A type name qualified by the import path that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeName {
    pub package: ModulePath,
    pub name: String,
}

impl TypeName {
    pub fn new(package: ModulePath, name: impl Into<String>) -> Self {
        Self {
            package,
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// A package-level variable of a target module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVar {
    pub name: String,
    /// Declared named type, when the declaration names one.
    pub declared: Option<TypeName>,
    /// Field-level layout of the declared type, when the loader resolved it.
    pub layout: Option<Type>,
}

/// A module whose initializer is to be benchmarked.
#[derive(Debug, Clone)]
pub struct TargetModule {
    pub path: ModulePath,
    /// Package name used in `package` clauses.
    pub name: String,
    pub dir: PathBuf,
    /// Non-test source files.
    pub source_files: Vec<PathBuf>,
    /// Package-level variables, sorted by name.
    pub vars: Vec<PackageVar>,
}

impl TargetModule {
    /// Whether the module has no own source files to initialize.
    pub fn is_empty(&self) -> bool {
        self.source_files.is_empty()
    }
}

/// Import graph: every loaded module and the modules it imports directly.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    imports: BTreeMap<ModulePath, Vec<ModulePath>>,
}

impl ModuleGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module with its direct imports. Imports are kept sorted and
    /// deduplicated.
    pub fn insert(&mut self, module: ModulePath, mut imports: Vec<ModulePath>) {
        imports.sort();
        imports.dedup();
        self.imports.insert(module, imports);
    }

    /// Direct imports of a module, or `None` if it was not loaded.
    pub fn imports(&self, module: &ModulePath) -> Option<&[ModulePath]> {
        self.imports.get(module).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }
}

/// Result of loading the requested module patterns.
#[derive(Debug, Clone, Default)]
pub struct LoadedModules {
    /// Modules matched by the patterns, in discovery order.
    pub targets: Vec<TargetModule>,
    pub graph: ModuleGraph,
}
