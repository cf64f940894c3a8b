// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Execution delegate.
//!
//! Benchmarks are run by `go test`, restricted to the generated benchmark.
//! The runner's output goes straight to the terminal.

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::RunnerError;
use crate::types::{GoIdent, ModulePath};

/// A fully built runner command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl RunnerInvocation {
    /// `go test -run=^$ -vet=off -bench=^<benchmark>$ <flags> <modules>`.
    ///
    /// No tests and no vet run; `flags` are passed through in order.
    pub fn go_test(
        program: impl Into<String>,
        benchmark: &GoIdent,
        flags: &[String],
        modules: &[ModulePath],
    ) -> Self {
        let mut args = vec![
            "test".to_string(),
            "-run=^$".to_string(),
            "-vet=off".to_string(),
            format!("-bench=^{}$", benchmark),
        ];
        args.extend(flags.iter().cloned());
        args.extend(modules.iter().map(|m| m.as_str().to_string()));

        Self {
            program: program.into(),
            args,
        }
    }
}

/// Runs a benchmark invocation to completion.
pub trait Runner {
    fn run(
        &self,
        invocation: &RunnerInvocation,
    ) -> impl Future<Output = Result<(), RunnerError>> + Send;
}

/// Spawns the invocation as a child process with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoTestRunner;

impl Runner for GoTestRunner {
    async fn run(&self, invocation: &RunnerInvocation) -> Result<(), RunnerError> {
        let program = invocation.program.clone();
        tracing::info!(program = %program, args = ?invocation.args, "Running benchmarks");

        let mut child = Command::new(&program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| RunnerError::Spawn {
                program: program.clone(),
                source: e,
            })?;

        let finished = tokio::select! {
            status = child.wait() => Some(status),
            _ = tokio::signal::ctrl_c() => None,
        };
        let status = match finished {
            Some(status) => status,
            None => {
                // The terminal delivered the interrupt to the child as well.
                tracing::warn!(program = %program, "Interrupted, waiting for runner to exit");
                child.wait().await
            }
        }
        .map_err(|e| RunnerError::Wait {
            program: program.clone(),
            source: e,
        })?;

        if !status.success() {
            return Err(RunnerError::Failed {
                program,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
