// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Argument splitting between `go test` and benchinit itself.
//!
//! A single pass over the arguments classifies each leading flag against
//! [`RUNNER_FLAGS`]. Runner flags are passed to `go test` verbatim; anything
//! else is left for benchinit's own parser.

/// Whether a runner flag takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// `-name`
    Bool,
    /// `-name value` or `-name=value`
    Value,
}

/// A flag understood by `go test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerFlag {
    pub name: &'static str,
    pub kind: FlagKind,
}

const fn flag(name: &'static str, kind: FlagKind) -> RunnerFlag {
    RunnerFlag { name, kind }
}

/// Flags accepted by `go test`, from `go help testflag` and `go help build`.
pub const RUNNER_FLAGS: &[RunnerFlag] = &[
    // handled by go test itself
    flag("c", FlagKind::Bool),
    flag("i", FlagKind::Bool),
    flag("o", FlagKind::Value),
    flag("cover", FlagKind::Bool),
    flag("covermode", FlagKind::Value),
    flag("coverpkg", FlagKind::Value),
    flag("exec", FlagKind::Value),
    flag("json", FlagKind::Bool),
    flag("vet", FlagKind::Value),
    // passed on to the test binary
    flag("bench", FlagKind::Value),
    flag("benchmem", FlagKind::Bool),
    flag("benchtime", FlagKind::Value),
    flag("blockprofile", FlagKind::Value),
    flag("blockprofilerate", FlagKind::Value),
    flag("count", FlagKind::Value),
    flag("coverprofile", FlagKind::Value),
    flag("cpu", FlagKind::Value),
    flag("cpuprofile", FlagKind::Value),
    flag("failfast", FlagKind::Bool),
    flag("list", FlagKind::Value),
    flag("memprofile", FlagKind::Value),
    flag("memprofilerate", FlagKind::Value),
    flag("mutexprofile", FlagKind::Value),
    flag("mutexprofilefraction", FlagKind::Value),
    flag("outputdir", FlagKind::Value),
    flag("parallel", FlagKind::Value),
    flag("run", FlagKind::Value),
    flag("short", FlagKind::Bool),
    flag("timeout", FlagKind::Value),
    flag("trace", FlagKind::Value),
    flag("v", FlagKind::Bool),
];

/// Benchinit's own flags that take a value. `-name value` keeps the value
/// in the tool group so classification can continue after it.
pub const TOOL_VALUE_FLAGS: &[&str] = &["config"];

/// Look up a runner flag by name, without leading dash.
pub fn runner_flag(name: &str) -> Option<&'static RunnerFlag> {
    RUNNER_FLAGS.iter().find(|f| f.name == name)
}

/// Arguments split into the two groups, each in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitArgs {
    /// Passed to the runner verbatim.
    pub runner: Vec<String>,
    /// Left for benchinit's own parser.
    pub tool: Vec<String>,
}

/// Split `args` into runner flags and benchinit arguments.
///
/// Leading flags are classified one at a time. The first argument that is
/// not a flag, is empty, or is `--` ends classification, and it and
/// everything after it go to the tool group untouched. Flags may be spelled
/// with one or two dashes. A value-taking flag given as `-name value`, runner
/// or tool, takes the next argument with it into its own group.
pub fn split_args<I, S>(args: I) -> SplitArgs
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut split = SplitArgs::default();
    let mut args = args.into_iter().map(Into::into);

    while let Some(arg) = args.next() {
        if arg == "--" || !arg.starts_with('-') {
            split.tool.push(arg);
            split.tool.extend(args.by_ref());
            break;
        }

        let body = arg.strip_prefix("--").unwrap_or(&arg[1..]);
        let (name, has_value) = match body.split_once('=') {
            Some((name, _)) => (name, true),
            None => (body, false),
        };

        if TOOL_VALUE_FLAGS.contains(&name) {
            let takes_next = !has_value;
            split.tool.push(arg);
            if takes_next {
                if let Some(value) = args.next() {
                    split.tool.push(value);
                }
            }
            continue;
        }

        match runner_flag(name) {
            Some(f) if f.kind == FlagKind::Value && !has_value => {
                split.runner.push(arg);
                if let Some(value) = args.next() {
                    split.runner.push(value);
                }
            }
            Some(_) => split.runner.push(arg),
            None => split.tool.push(arg),
        }
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(args: &[&str]) -> SplitArgs {
        split_args(args.iter().copied())
    }

    #[test]
    fn test_count_and_package() {
        let s = split(&["-count=3", "./foo"]);
        assert_eq!(s.runner, ["-count=3"]);
        assert_eq!(s.tool, ["./foo"]);
    }

    #[test]
    fn test_bool_and_value_flags() {
        let s = split(&["-benchmem", "-benchtime", "2s", "-r", "."]);
        assert_eq!(s.runner, ["-benchmem", "-benchtime", "2s"]);
        assert_eq!(s.tool, ["-r", "."]);
    }

    #[test]
    fn test_double_dash_ends_split() {
        let s = split(&["-v", "--", "-count=2", "pkg"]);
        assert_eq!(s.runner, ["-v"]);
        assert_eq!(s.tool, ["--", "-count=2", "pkg"]);
    }

    #[test]
    fn test_non_flag_ends_split() {
        let s = split(&["pkg", "-count=2"]);
        assert!(s.runner.is_empty());
        assert_eq!(s.tool, ["pkg", "-count=2"]);
    }

    #[test]
    fn test_empty_argument_ends_split() {
        let s = split(&["-short", "", "-v"]);
        assert_eq!(s.runner, ["-short"]);
        assert_eq!(s.tool, ["", "-v"]);
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        let s = split(&["-counts=3", "-benchx"]);
        assert!(s.runner.is_empty());
        assert_eq!(s.tool, ["-counts=3", "-benchx"]);
    }

    #[test]
    fn test_tool_long_flags_stay_with_tool() {
        let s = split(&["--recursive", "--config=b.yaml", "-cpu=1,2"]);
        assert_eq!(s.runner, ["-cpu=1,2"]);
        assert_eq!(s.tool, ["--recursive", "--config=b.yaml"]);
    }

    #[test]
    fn test_runner_flags_with_two_dashes() {
        let s = split(&["--count=3", "--benchtime", "1s", "--v", "."]);
        assert_eq!(s.runner, ["--count=3", "--benchtime", "1s", "--v"]);
        assert_eq!(s.tool, ["."]);
    }

    #[test]
    fn test_tool_value_flag_keeps_its_value() {
        let s = split(&["--config", "b.yaml", "-count=3", "."]);
        assert_eq!(s.runner, ["-count=3"]);
        assert_eq!(s.tool, ["--config", "b.yaml", "."]);

        let s = split(&["-config", "-v.yaml", "-v"]);
        assert_eq!(s.runner, ["-v"]);
        assert_eq!(s.tool, ["-config", "-v.yaml"]);
    }

    #[test]
    fn test_trailing_value_flag_without_value() {
        let s = split(&["-count"]);
        assert_eq!(s.runner, ["-count"]);
        assert!(s.tool.is_empty());
    }

    #[test]
    fn test_split_is_total_and_order_preserving() {
        let input = ["-r", "-count", "5", "-x", "-benchmem", "-cpu=4", "a", "-v", "b"];
        let s = split(&input);

        assert_eq!(s.runner.len() + s.tool.len(), input.len());

        let mut runner = s.runner.iter();
        let mut tool = s.tool.iter();
        let mut next_runner = runner.next();
        let mut next_tool = tool.next();
        for arg in input {
            if next_runner.map(String::as_str) == Some(arg) {
                next_runner = runner.next();
            } else {
                assert_eq!(next_tool.map(String::as_str), Some(arg));
                next_tool = tool.next();
            }
        }
        assert!(next_runner.is_none() && next_tool.is_none());
    }

    #[test]
    fn test_table_has_no_duplicates() {
        for (i, f) in RUNNER_FLAGS.iter().enumerate() {
            assert!(RUNNER_FLAGS[i + 1..].iter().all(|g| g.name != f.name), "{}", f.name);
        }
    }
}
