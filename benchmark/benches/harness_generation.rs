// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Harness generation microbenchmarks.
//!
//! Measures the per-target work done before `go test` starts: the import
//! graph walk, registry layout analysis and harness rendering.

use benchinit_benchmark::{layered_graph, root_target, ROOT};
use benchinit_core::synth::{render_harness, HarnessPlan, SymbolSuffixes};
use benchinit_core::{
    collect_initializers, layout, split_args, Exclusions, GoArch, GoIdent, ModulePath, Sizes,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Graph widths to benchmark (modules per layer).
const GRAPH_WIDTHS: &[usize] = &[8, 64, 512];

/// Benchmark the recursive initializer walk.
fn bench_collect_initializers(c: &mut Criterion) {
    let mut group = c.benchmark_group("collect_initializers");
    let root = ModulePath::new_unchecked(ROOT);
    let exclusions = Exclusions::hard();

    for &width in GRAPH_WIDTHS {
        let graph = layered_graph(4, width, 3);
        group.bench_with_input(BenchmarkId::from_parameter(width), &graph, |b, graph| {
            b.iter(|| collect_initializers(black_box(graph), &root, true, &exclusions));
        });
    }

    group.finish();
}

/// Benchmark registry layout analysis on 32 and 64 bit targets.
fn bench_layout_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_analysis");
    let target = root_target(16);

    for arch in [GoArch::Amd64, GoArch::I386] {
        let sizes = Sizes::for_arch(arch);
        group.bench_with_input(BenchmarkId::from_parameter(arch.name()), &sizes, |b, sizes| {
            b.iter(|| layout::analyze(black_box(&target), sizes).ok());
        });
    }

    group.finish();
}

/// Benchmark rendering a recursive harness.
fn bench_render_harness(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_harness");
    let root = ModulePath::new_unchecked(ROOT);
    let target = root_target(4);
    let sizes = Sizes::for_arch(GoArch::Amd64);
    let zero_regions = layout::analyze(&target, &sizes).unwrap_or_default();

    for &width in GRAPH_WIDTHS {
        let graph = layered_graph(4, width, 3);
        let plan = HarnessPlan {
            module: root.clone(),
            package_name: GoIdent::new_unchecked("root"),
            benchmark: GoIdent::new_unchecked("BenchmarkInit"),
            initializers: collect_initializers(&graph, &root, true, &Exclusions::hard()),
            zero_regions: zero_regions.clone(),
            symbols: SymbolSuffixes::default(),
        };
        group.bench_with_input(BenchmarkId::from_parameter(width), &plan, |b, plan| {
            b.iter(|| render_harness(black_box(plan)));
        });
    }

    group.finish();
}

/// Benchmark splitting a typical command line.
fn bench_split_args(c: &mut Criterion) {
    let args = [
        "-count=10",
        "-benchmem",
        "-benchtime",
        "200ms",
        "-cpu=1,2,4",
        "-r",
        "./...",
    ];
    c.bench_function("split_args", |b| {
        b.iter(|| split_args(black_box(args)));
    });
}

criterion_group!(
    benches,
    bench_collect_initializers,
    bench_layout_analysis,
    bench_render_harness,
    bench_split_args
);
criterion_main!(benches);
