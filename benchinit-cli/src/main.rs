// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchinit CLI
//!
//! Benchmarks the package initializers of Go modules through `go test`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use benchinit_core::{
    split_args, BenchinitError, ConfigLoader, GoListLoader, GoTestRunner, Orchestrator,
    RunRequest,
};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
For example:

\tbenchinit -count=10 .

All flags accepted by 'go test', including the benchmarking ones, should be
accepted. See 'go help testflag' for a complete list.";

/// Benchmark the initialization of Go packages
#[derive(Parser, Debug)]
#[command(name = "benchinit")]
#[command(version, about, long_about = None)]
#[command(override_usage = "benchinit [benchinit flags] [go test flags] [packages]")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Include inits of transitive dependencies
    #[arg(short, long)]
    pub recursive: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Configuration file path (default: ./benchinit.yaml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Packages to benchmark (default: the current directory)
    #[arg(value_name = "PACKAGES")]
    pub packages: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let (cli, runner_flags) = match parse_args(std::env::args_os().skip(1)) {
        Ok(parsed) => parsed,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match execute(cli, runner_flags).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Split off the runner flags and parse the rest as benchinit's own.
fn parse_args<I>(args: I) -> Result<(Cli, Vec<String>), clap::Error>
where
    I: IntoIterator<Item = OsString>,
{
    let args = args
        .into_iter()
        .map(|arg| {
            arg.into_string().map_err(|arg| {
                Cli::command().error(
                    ErrorKind::InvalidUtf8,
                    format!("argument {:?} is not valid UTF-8", arg),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let split = split_args(args);
    let cli = Cli::try_parse_from(std::iter::once("benchinit".to_string()).chain(split.tool))?;
    Ok((cli, split.runner))
}

async fn execute(cli: Cli, runner_flags: Vec<String>) -> Result<(), BenchinitError> {
    let config = ConfigLoader::discover(cli.config.as_deref())?;
    let loader = GoListLoader::new(config.runner.program.clone());
    let mut orchestrator = Orchestrator::new(config, loader, GoTestRunner)?;

    let request = RunRequest {
        patterns: cli.packages,
        runner_flags,
        recursive: cli.recursive,
    };
    let summary = orchestrator.run(&request).await?;

    tracing::debug!(
        targets = summary.targets.len(),
        skipped = summary.skipped.len(),
        removed = summary.cleanup.removed.len(),
        "Run finished"
    );
    Ok(())
}
