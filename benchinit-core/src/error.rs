// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for benchinit.
//!
//! Every failure is an explicit enum variant. Load failures abort before any
//! artifact exists; setup and runner failures are reported after artifacts
//! were generated, and cleanup still runs.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ModulePath;

/// Top-level error type for a benchinit run.
#[derive(Debug, Error)]
pub enum BenchinitError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Pipeline Errors
    // =========================================================================
    #[error("load: {0}")]
    Load(#[from] LoadError),

    #[error("benchmark: {0}")]
    Setup(#[from] SetupError),

    #[error("setup failed for {failed} of {total} target(s)")]
    SetupFailed { failed: usize, total: usize },

    #[error("runner: {0}")]
    Runner(#[from] RunnerError),

    #[error("failed to remove {failed} generated file(s)")]
    Cleanup { failed: usize },

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for configuration values and newtypes.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid module path '{path}': {reason}")]
    InvalidModulePath { path: String, reason: String },

    #[error("Invalid identifier '{ident}'")]
    InvalidIdentifier { ident: String },

    #[error("Unknown target architecture: {arch}")]
    UnknownArch { arch: String },
}

/// Failures of the external module loader.
///
/// Fatal: nothing is generated once loading fails.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to run {program}: {source}")]
    ToolchainUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("malformed package listing: {message}")]
    Decode { message: String },

    #[error("{path}: {message}")]
    Package { path: String, message: String },

    #[error("{path} has no directory")]
    MissingDirectory { path: ModulePath },

    #[error("reading {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("type {name}: {source}")]
    Type {
        name: String,
        #[source]
        source: TypeError,
    },

    #[error("{0}")]
    Validation(#[from] HardValidationError),
}

/// Errors parsing or resolving Go type expressions.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    #[error("unsupported type expression: {what}")]
    Unsupported { what: String },

    #[error("declaration of {name} not found")]
    NotFound { name: String },

    #[error("resolution of {name} exceeded depth {depth}")]
    TooDeep { name: String, depth: usize },

    #[error("looking up {name}: {message}")]
    Lookup { name: String, message: String },
}

/// Per-target setup failures.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{path} already exists; refusing to overwrite")]
    ArtifactExists { path: PathBuf },

    #[error("writing {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{module}.{variable}: field '{field}' not found in {type_name}; layout assumption violated")]
    MissingLayoutField {
        module: ModulePath,
        variable: String,
        type_name: String,
        field: &'static str,
    },

    #[error("{module}.{variable}: {type_name} has no struct layout")]
    NotAStruct {
        module: ModulePath,
        variable: String,
        type_name: String,
    },

    #[error("{module}: package name '{name}' is not an identifier")]
    InvalidPackageName { module: ModulePath, name: String },
}

impl SetupError {
    /// Whether this failure must stop setup for every remaining target.
    ///
    /// A layout-shape violation means the harness would zero memory it does
    /// not understand, so the run ends at the first one.
    pub fn aborts_run(&self) -> bool {
        matches!(self, Self::MissingLayoutField { .. } | Self::NotAStruct { .. })
    }
}

/// Failures of the delegated benchmark runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

/// Result type alias using BenchinitError.
pub type BenchinitResult<T> = Result<T, BenchinitError>;
