// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fixtures for the harness generation benchmarks.
//!
//! Builds synthetic import graphs and targets so the walker, layout
//! analyzer and synthesizer can be measured without a Go toolchain.

use std::path::PathBuf;

use benchinit_core::gotype::{BasicKind, Field, Type};
use benchinit_core::layout::flag_registry_type;
use benchinit_core::{ModuleGraph, ModulePath, PackageVar, TargetModule};

/// Root module of every synthetic graph.
pub const ROOT: &str = "example.com/root";

/// A layered import graph: `ROOT` imports every module of the first layer,
/// and each module imports `fanout` modules of the next layer, wrapping
/// around. The last layer imports `time`, which the walker must not enter.
pub fn layered_graph(layers: usize, width: usize, fanout: usize) -> ModuleGraph {
    let module =
        |layer: usize, i: usize| ModulePath::new_unchecked(format!("example.com/l{}/m{}", layer, i));
    let mut graph = ModuleGraph::new();

    graph.insert(
        ModulePath::new_unchecked(ROOT),
        (0..width).map(|i| module(0, i)).collect(),
    );
    for layer in 0..layers {
        for i in 0..width {
            let imports = if layer + 1 < layers {
                (0..fanout).map(|k| module(layer + 1, (i + k) % width)).collect()
            } else {
                vec![ModulePath::new_unchecked("time")]
            };
            graph.insert(module(layer, i), imports);
        }
    }
    graph.insert(ModulePath::new_unchecked("time"), vec![]);
    graph
}

/// The `flag.FlagSet` field list of current Go releases.
pub fn flagset_fields() -> Vec<Field> {
    vec![
        Field::new("Usage", Type::Pointer),
        Field::new("name", Type::String),
        Field::new("parsed", Type::Basic(BasicKind::Bool)),
        Field::new("actual", Type::Pointer),
        Field::new("formal", Type::Pointer),
        Field::new("args", Type::Slice),
        Field::new("errorHandling", Type::Basic(BasicKind::Int)),
        Field::new("output", Type::Interface),
        Field::new("undef", Type::Pointer),
    ]
}

/// The root target with `registries` flag registry variables.
pub fn root_target(registries: usize) -> TargetModule {
    let vars = (0..registries)
        .map(|i| PackageVar {
            name: format!("fs{:03}", i),
            declared: Some(flag_registry_type()),
            layout: Some(Type::Struct(flagset_fields())),
        })
        .collect();
    TargetModule {
        path: ModulePath::new_unchecked(ROOT),
        name: "root".to_string(),
        dir: PathBuf::from("/nonexistent/root"),
        source_files: vec![PathBuf::from("/nonexistent/root/root.go")],
        vars,
    }
}
