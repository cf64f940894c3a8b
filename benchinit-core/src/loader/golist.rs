// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Loader backed by `go list`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;

use super::godoc::GoDocResolver;
use super::scope::{resolve_aliases, scan_file};
use super::ModuleLoader;
use crate::error::{LoadError, TypeError};
use crate::gotype::{self, Type, TypeExpr, TypeResolver};
use crate::layout::flag_registry_type;
use crate::module::{LoadedModules, ModuleGraph, PackageVar, TargetModule, TypeName};
use crate::types::ModulePath;

/// One package object from `go list -json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawPackage {
    import_path: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dir: Option<PathBuf>,
    #[serde(default)]
    go_files: Vec<String>,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    dep_only: bool,
    #[serde(default)]
    error: Option<RawPackageError>,
    #[serde(default)]
    deps_errors: Vec<RawPackageError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawPackageError {
    err: String,
}

/// Loads modules by running `go list -e -json -deps`.
#[derive(Debug, Clone)]
pub struct GoListLoader {
    program: String,
}

impl GoListLoader {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn list(&self, patterns: &[String]) -> Result<Vec<u8>, LoadError> {
        let mut command = Command::new(&self.program);
        command.args(["list", "-e", "-json", "-deps", "--"]);
        if patterns.is_empty() {
            command.arg(".");
        } else {
            command.args(patterns);
        }

        tracing::debug!(program = %self.program, ?patterns, "Listing packages");
        let output = command.output().map_err(|e| LoadError::ToolchainUnavailable {
            program: self.program.clone(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(LoadError::CommandFailed {
                command: format!("{} list", self.program),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl ModuleLoader for GoListLoader {
    fn load(&self, patterns: &[String]) -> Result<LoadedModules, LoadError> {
        let stdout = self.list(patterns)?;
        let packages = decode_packages(&stdout)?;
        let mut resolver = GoDocResolver::new(self.program.clone());
        let loaded = build_modules(packages, &mut resolver)?;

        tracing::info!(
            targets = loaded.targets.len(),
            modules = loaded.graph.len(),
            "Loaded packages"
        );
        Ok(loaded)
    }
}

/// Decode the concatenated JSON objects `go list -json` prints.
pub(crate) fn decode_packages(stdout: &[u8]) -> Result<Vec<RawPackage>, LoadError> {
    serde_json::Deserializer::from_slice(stdout)
        .into_iter::<RawPackage>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LoadError::Decode {
            message: e.to_string(),
        })
}

/// Turn listed packages into targets and an import graph.
///
/// Any package error fails the whole load. Targets are the packages the
/// patterns matched directly, in listing order.
pub(crate) fn build_modules(
    packages: Vec<RawPackage>,
    resolver: &mut dyn TypeResolver,
) -> Result<LoadedModules, LoadError> {
    let mut errors = Vec::new();
    for package in &packages {
        if let Some(error) = &package.error {
            errors.push((package.import_path.clone(), error.err.clone()));
        }
        if !package.dep_only {
            for error in &package.deps_errors {
                errors.push((package.import_path.clone(), error.err.clone()));
            }
        }
    }
    errors.dedup_by(|a, b| a.1 == b.1);
    for (path, message) in &errors {
        tracing::error!(package = %path, "{}", message);
    }
    if let Some((path, message)) = errors.into_iter().next() {
        return Err(LoadError::Package { path, message });
    }

    let mut graph = ModuleGraph::new();
    let mut targets = Vec::new();
    let mut layouts = HashMap::new();

    for package in packages {
        let path = ModulePath::new(package.import_path)?;
        let imports = package
            .imports
            .into_iter()
            .map(ModulePath::new)
            .collect::<Result<Vec<_>, _>>()?;
        graph.insert(path.clone(), imports);

        if package.dep_only {
            continue;
        }

        let dir = package
            .dir
            .ok_or_else(|| LoadError::MissingDirectory { path: path.clone() })?;
        let source_files: Vec<PathBuf> = package.go_files.iter().map(|f| dir.join(f)).collect();

        let mut vars = Vec::new();
        let mut aliases = HashMap::new();
        for file in &source_files {
            let source = std::fs::read_to_string(file).map_err(|e| LoadError::ReadSource {
                path: file.clone(),
                source: e,
            })?;
            let scanned = scan_file(&source, &path).map_err(|e| LoadError::Type {
                name: file.display().to_string(),
                source: e,
            })?;
            vars.extend(scanned.vars);
            aliases.extend(scanned.aliases);
        }
        resolve_aliases(&mut vars, &path, &aliases);
        vars.sort_by(|a, b| a.name.cmp(&b.name));
        vars.dedup_by(|a, b| a.name == b.name);
        resolve_registry_layouts(&mut vars, resolver, &mut layouts)?;

        tracing::debug!(
            module = %path,
            files = source_files.len(),
            vars = vars.len(),
            "Scanned target"
        );
        targets.push(TargetModule {
            path,
            name: package.name,
            dir,
            source_files,
            vars,
        });
    }

    Ok(LoadedModules { targets, graph })
}

/// Fill in the field layout of every flag registry variable.
fn resolve_registry_layouts(
    vars: &mut [PackageVar],
    resolver: &mut dyn TypeResolver,
    layouts: &mut HashMap<String, Type>,
) -> Result<(), LoadError> {
    let registry = flag_registry_type();
    for var in vars.iter_mut() {
        if var.declared.as_ref() != Some(&registry) {
            continue;
        }
        let key = registry.to_string();
        if let Some(layout) = layouts.get(&key) {
            var.layout = Some(layout.clone());
            continue;
        }
        let layout = resolve_named(&registry, resolver).map_err(|e| LoadError::Type {
            name: key.clone(),
            source: e,
        })?;
        layouts.insert(key, layout.clone());
        var.layout = Some(layout);
    }
    Ok(())
}

fn resolve_named(name: &TypeName, resolver: &mut dyn TypeResolver) -> Result<Type, TypeError> {
    let package = name.package.as_str();
    let expr = TypeExpr::Named {
        qualifier: Some(package.to_string()),
        name: name.name.clone(),
    };
    gotype::resolve(&expr, package, resolver)
}
