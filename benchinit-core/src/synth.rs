// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Harness synthesizer.
//!
//! Renders the two files placed in a target's directory:
//!
//! - the benchmark harness, an external test package that binds the target's
//!   initializer, init guards and flag registries through `go:linkname`, and
//!   times one initializer call per trial;
//! - the rebuild stub, an empty `init` added to the target itself so the
//!   build system recompiles it instead of reusing a cached archive.

use std::fmt::Write;

use crate::layout::LayoutDescriptor;
use crate::types::{GoIdent, ModulePath};

/// Header marking a file as generated.
pub const GENERATED_HEADER: &str = "// Code generated by benchinit. DO NOT EDIT.";

/// Fixed suffixes naming a module's initializer and init guard symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSuffixes {
    pub init: String,
    pub guard: String,
}

impl Default for SymbolSuffixes {
    fn default() -> Self {
        Self {
            init: "init".to_string(),
            guard: "initdone·".to_string(),
        }
    }
}

/// Everything needed to render one target's artifacts.
#[derive(Debug, Clone)]
pub struct HarnessPlan {
    pub module: ModulePath,
    pub package_name: GoIdent,
    pub benchmark: GoIdent,
    /// Modules whose init guard is cleared after every trial, in walk order.
    pub initializers: Vec<ModulePath>,
    pub zero_regions: Vec<LayoutDescriptor>,
    pub symbols: SymbolSuffixes,
}

/// Escape an import path the way the Go linker does for symbol prefixes.
///
/// Control characters, space, `%`, `"`, non-ASCII bytes and any `.` after
/// the last `/` become `%xx`.
pub fn linker_prefix(path: &str) -> String {
    let last_slash = path.rfind('/');
    let mut out = String::with_capacity(path.len());
    for (i, b) in path.bytes().enumerate() {
        let after_slash = last_slash.map_or(true, |slash| i > slash);
        let escape = b <= b' ' || b == b'%' || b == b'"' || b >= 0x7f || (b == b'.' && after_slash);
        if escape {
            let _ = write!(out, "%{:02x}", b);
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Linker symbol for `name` inside `module`.
pub fn linker_symbol(module: &ModulePath, name: &str) -> String {
    format!("{}.{}", linker_prefix(module.as_str()), name)
}

/// Render the benchmark harness source.
pub fn render_harness(plan: &HarnessPlan) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", GENERATED_HEADER);
    let _ = writeln!(out);
    let _ = writeln!(out, "package {}_test", plan.package_name);
    let _ = writeln!(out);
    out.push_str("import (\n\t\"testing\"\n\t_ \"unsafe\" // required by go:linkname\n)\n\n");

    let _ = writeln!(out, "func {}(b *testing.B) {{", plan.benchmark);
    out.push_str(concat!(
        "\tb.ReportAllocs()\n",
        "\tb.StopTimer()\n",
        "\trearm() // init already ran once at process start\n",
        "\n",
        "\tfor i := 0; i < b.N; i++ {\n",
        "\t\tb.StartTimer()\n",
        "\t\t_init()\n",
        "\t\tb.StopTimer()\n",
        "\n",
        "\t\trearm()\n",
        "\t}\n",
        "}\n\n",
    ));

    out.push_str("// rearm clears the flag registrations and init guards so that _init runs\n");
    out.push_str("// its full body again.\n");
    out.push_str("func rearm() {\n");
    for (i, region) in plan.zero_regions.iter().enumerate() {
        let _ = writeln!(
            out,
            "\tfor i := {}; i < {}; i++ {{\n\t\t_tozero{}[i] = 0\n\t}}",
            region.offset,
            region.end(),
            i
        );
    }
    for i in 0..plan.initializers.len() {
        let _ = writeln!(out, "\t_initdone{} = 0", i);
    }
    out.push_str("}\n\n");

    let _ = writeln!(
        out,
        "//go:linkname _init {}",
        linker_symbol(&plan.module, &plan.symbols.init)
    );
    out.push_str("func _init()\n");

    for (i, region) in plan.zero_regions.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "//go:linkname _tozero{} {}",
            i,
            linker_symbol(&region.module, &region.variable)
        );
        let _ = writeln!(out, "var _tozero{} [{}]byte", i, region.total_size);
    }

    for (i, module) in plan.initializers.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "//go:linkname _initdone{} {}",
            i,
            linker_symbol(module, &plan.symbols.guard)
        );
        let _ = writeln!(out, "var _initdone{} uint8", i);
    }

    out
}

/// Render the rebuild stub source.
pub fn render_stub(plan: &HarnessPlan) -> String {
    format!(
        "{}\n\npackage {}\n\nfunc init() {{}}\n",
        GENERATED_HEADER, plan.package_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ModulePath {
        ModulePath::new(s).unwrap()
    }

    fn plan(initializers: &[&str], zero_regions: Vec<LayoutDescriptor>) -> HarnessPlan {
        HarnessPlan {
            module: path("example.com/app"),
            package_name: GoIdent::new("app").unwrap(),
            benchmark: GoIdent::new("BenchmarkInit").unwrap(),
            initializers: initializers.iter().map(|p| path(p)).collect(),
            zero_regions,
            symbols: SymbolSuffixes::default(),
        }
    }

    #[test]
    fn test_linker_prefix_escapes_dots_in_last_element() {
        assert_eq!(linker_prefix("gopkg.in/yaml.v3"), "gopkg.in/yaml%2ev3");
        assert_eq!(linker_prefix("example.com/app"), "example.com/app");
        assert_eq!(linker_prefix("a.b"), "a%2eb");
        assert_eq!(linker_prefix("x/100%"), "x/100%25");
    }

    #[test]
    fn test_linker_symbol() {
        assert_eq!(
            linker_symbol(&path("github.com/x/go.tools"), "init"),
            "github.com/x/go%2etools.init"
        );
    }

    #[test]
    fn test_harness_non_recursive() {
        let source = render_harness(&plan(&["example.com/app"], vec![]));
        assert!(source.starts_with(GENERATED_HEADER));
        assert!(source.contains("package app_test\n"));
        assert!(source.contains("func BenchmarkInit(b *testing.B) {"));
        assert!(source.contains("//go:linkname _init example.com/app.init\nfunc _init()\n"));
        assert!(source.contains("//go:linkname _initdone0 example.com/app.initdone·\nvar _initdone0 uint8\n"));
        assert!(!source.contains("_initdone1"));
        assert!(!source.contains("_tozero"));
    }

    #[test]
    fn test_timer_brackets_only_the_init_call() {
        let source = render_harness(&plan(&["example.com/app"], vec![]));
        let start = source.find("b.StartTimer()").unwrap();
        let call = source.find("_init()\n\t\tb.StopTimer()").unwrap();
        let rearm = source.rfind("\t\trearm()").unwrap();
        assert!(start < call && call < rearm);
    }

    #[test]
    fn test_harness_zeroes_registration_tables() {
        let region = LayoutDescriptor {
            module: path("example.com/app"),
            variable: "cli".to_string(),
            total_size: 104,
            offset: 40,
            zero_size: 8,
        };
        let source = render_harness(&plan(&["example.com/app"], vec![region]));
        assert!(source.contains("\tfor i := 40; i < 48; i++ {\n\t\t_tozero0[i] = 0\n\t}\n"));
        assert!(source.contains("//go:linkname _tozero0 example.com/app.cli\nvar _tozero0 [104]byte\n"));
    }

    #[test]
    fn test_recursive_guards_follow_walk_order() {
        let source = render_harness(&plan(&["example.com/app", "strings", "unicode"], vec![]));
        let first = source.find("_initdone1 strings.initdone·").unwrap();
        let second = source.find("_initdone2 unicode.initdone·").unwrap();
        assert!(first < second);
        assert!(source.contains("\t_initdone0 = 0\n\t_initdone1 = 0\n\t_initdone2 = 0\n"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let p = plan(&["example.com/app", "fmt"], vec![]);
        assert_eq!(render_harness(&p), render_harness(&p));
    }

    #[test]
    fn test_custom_symbol_suffixes() {
        let mut p = plan(&["example.com/app"], vec![]);
        p.symbols = SymbolSuffixes {
            init: "init.0".to_string(),
            guard: "..inittask".to_string(),
        };
        let source = render_harness(&p);
        assert!(source.contains("_init example.com/app.init.0\n"));
        assert!(source.contains("_initdone0 example.com/app...inittask\n"));
    }

    #[test]
    fn test_stub() {
        let stub = render_stub(&plan(&["example.com/app"], vec![]));
        assert_eq!(
            stub,
            format!("{}\n\npackage app\n\nfunc init() {{}}\n", GENERATED_HEADER)
        );
    }
}
