// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! The configuration file is optional; every field has a default matching
//! the stock Go toolchain. Any invalid field results in a
//! HardValidationError before anything is loaded or generated.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BenchinitError, BenchinitResult, HardValidationError};
use crate::synth::SymbolSuffixes;
use crate::types::{GoArch, GoIdent, ModulePath};
use crate::walker::Exclusions;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "benchinit.yaml";

/// Raw runner configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRunnerConfig {
    #[serde(default = "default_program")]
    program: String,
    #[serde(default = "default_benchmark")]
    benchmark: String,
}

fn default_program() -> String {
    "go".to_string()
}

fn default_benchmark() -> String {
    "BenchmarkInit".to_string()
}

impl Default for RawRunnerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            benchmark: default_benchmark(),
        }
    }
}

/// Raw artifact naming configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArtifactConfig {
    #[serde(default = "default_harness_file")]
    harness_file: String,
    #[serde(default = "default_stub_file")]
    stub_file: String,
}

fn default_harness_file() -> String {
    "benchinit_generated_test.go".to_string()
}

fn default_stub_file() -> String {
    "benchinit_generated_stub.go".to_string()
}

impl Default for RawArtifactConfig {
    fn default() -> Self {
        Self {
            harness_file: default_harness_file(),
            stub_file: default_stub_file(),
        }
    }
}

/// Raw symbol suffix configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSymbolConfig {
    #[serde(default = "default_init_symbol")]
    init: String,
    #[serde(default = "default_guard_symbol")]
    guard: String,
}

fn default_init_symbol() -> String {
    SymbolSuffixes::default().init
}

fn default_guard_symbol() -> String {
    SymbolSuffixes::default().guard
}

impl Default for RawSymbolConfig {
    fn default() -> Self {
        Self {
            init: default_init_symbol(),
            guard: default_guard_symbol(),
        }
    }
}

/// Raw target platform configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTargetConfig {
    #[serde(default)]
    arch: Option<String>,
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    runner: RawRunnerConfig,
    #[serde(default)]
    artifacts: RawArtifactConfig,
    #[serde(default)]
    symbols: RawSymbolConfig,
    #[serde(default)]
    target: RawTargetConfig,
    #[serde(default)]
    exclude: Vec<String>,
}

/// Validated runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Go toolchain binary.
    pub program: String,
    /// Name of the generated benchmark function.
    pub benchmark: GoIdent,
}

/// Validated artifact file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactConfig {
    pub harness_file: String,
    pub stub_file: String,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub runner: RunnerConfig,
    pub artifacts: ArtifactConfig,
    pub symbols: SymbolSuffixes,
    /// Explicit target architecture; `None` defers to GOARCH or the host.
    pub arch: Option<GoArch>,
    pub exclusions: Exclusions,
}

impl Config {
    /// Target architecture: configured, else `$GOARCH`, else the host.
    pub fn target_arch(&self) -> Result<GoArch, HardValidationError> {
        if let Some(arch) = self.arch {
            return Ok(arch);
        }
        match std::env::var("GOARCH") {
            Ok(arch) if !arch.is_empty() => arch.parse(),
            _ => GoArch::host().ok_or_else(|| HardValidationError::UnknownArch {
                arch: std::env::consts::ARCH.to_string(),
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runner: RunnerConfig {
                program: default_program(),
                benchmark: GoIdent::new_unchecked(default_benchmark()),
            },
            artifacts: ArtifactConfig {
                harness_file: default_harness_file(),
                stub_file: default_stub_file(),
            },
            symbols: SymbolSuffixes::default(),
            arch: None,
            exclusions: Exclusions::hard(),
        }
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the configuration for a run.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
    /// the working directory is used when present, defaults otherwise.
    pub fn discover(explicit: Option<&Path>) -> BenchinitResult<Config> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    tracing::debug!("No configuration file, using defaults");
                    Ok(Config::default())
                }
            }
        }
    }

    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchinitResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchinitError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchinitError::Io {
            context: "reading config file",
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "Loading configuration");
        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchinitResult<Config> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| BenchinitError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Ok(Self::validate(raw)?)
    }

    fn validate(raw: RawConfig) -> Result<Config, HardValidationError> {
        let runner = Self::validate_runner(raw.runner)?;
        let artifacts = Self::validate_artifacts(raw.artifacts)?;
        let symbols = Self::validate_symbols(raw.symbols)?;

        let arch = raw
            .target
            .arch
            .as_deref()
            .map(str::parse::<GoArch>)
            .transpose()?;

        let extra = raw
            .exclude
            .into_iter()
            .map(ModulePath::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Config {
            runner,
            artifacts,
            symbols,
            arch,
            exclusions: Exclusions::with_extra(extra),
        })
    }

    fn validate_runner(raw: RawRunnerConfig) -> Result<RunnerConfig, HardValidationError> {
        if raw.program.trim().is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "runner.program",
                value: raw.program,
                reason: "Runner program cannot be empty".to_string(),
            });
        }

        let benchmark = GoIdent::new(&raw.benchmark).map_err(|_| {
            HardValidationError::InvalidFieldValue {
                field: "runner.benchmark",
                value: raw.benchmark.clone(),
                reason: "Must be a Go identifier".to_string(),
            }
        })?;
        // go test only runs functions named BenchmarkXxx, Xxx not lowercase.
        let runnable = raw
            .benchmark
            .strip_prefix("Benchmark")
            .is_some_and(|rest| !rest.chars().next().is_some_and(char::is_lowercase));
        if !runnable {
            return Err(HardValidationError::InvalidFieldValue {
                field: "runner.benchmark",
                value: raw.benchmark,
                reason: "Must be named Benchmark or BenchmarkXxx".to_string(),
            });
        }

        Ok(RunnerConfig {
            program: raw.program,
            benchmark,
        })
    }

    fn validate_artifacts(raw: RawArtifactConfig) -> Result<ArtifactConfig, HardValidationError> {
        for (field, name) in [
            ("artifacts.harness_file", &raw.harness_file),
            ("artifacts.stub_file", &raw.stub_file),
        ] {
            if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: name.clone(),
                    reason: "Must be a plain file name".to_string(),
                });
            }
            if !name.ends_with(".go") {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: name.clone(),
                    reason: "Must be a .go file".to_string(),
                });
            }
        }

        if !raw.harness_file.ends_with("_test.go") {
            return Err(HardValidationError::InvalidFieldValue {
                field: "artifacts.harness_file",
                value: raw.harness_file,
                reason: "Harness must be a _test.go file".to_string(),
            });
        }

        if raw.stub_file.ends_with("_test.go") {
            return Err(HardValidationError::InvalidFieldValue {
                field: "artifacts.stub_file",
                value: raw.stub_file,
                reason: "Stub must be compiled into the package, not its tests".to_string(),
            });
        }

        Ok(ArtifactConfig {
            harness_file: raw.harness_file,
            stub_file: raw.stub_file,
        })
    }

    fn validate_symbols(raw: RawSymbolConfig) -> Result<SymbolSuffixes, HardValidationError> {
        for (field, value) in [("symbols.init", &raw.init), ("symbols.guard", &raw.guard)] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: value.clone(),
                    reason: "Symbol suffix must be non-empty without whitespace".to_string(),
                });
            }
        }

        Ok(SymbolSuffixes {
            init: raw.init,
            guard: raw.guard,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
runner:
  program: go1.11
  benchmark: BenchmarkPkgInit
artifacts:
  harness_file: zz_init_test.go
  stub_file: zz_init_stub.go
symbols:
  init: init
  guard: "initdone·"
target:
  arch: arm
exclude:
  - example.com/telemetry
"#;

    #[test]
    fn test_full_config() {
        let config = ConfigLoader::load_string(FULL_CONFIG).unwrap();
        assert_eq!(config.runner.program, "go1.11");
        assert_eq!(config.runner.benchmark.as_str(), "BenchmarkPkgInit");
        assert_eq!(config.artifacts.harness_file, "zz_init_test.go");
        assert_eq!(config.arch, Some(GoArch::Arm));
        assert_eq!(config.target_arch().unwrap(), GoArch::Arm);
        assert!(config
            .exclusions
            .contains(&ModulePath::new("example.com/telemetry").unwrap()));
        assert!(config.exclusions.contains(&ModulePath::new("time").unwrap()));
    }

    #[test]
    fn test_defaults_applied() {
        let config = ConfigLoader::load_string("").unwrap();
        assert_eq!(config.runner.program, "go");
        assert_eq!(config.runner.benchmark.as_str(), "BenchmarkInit");
        assert_eq!(config.artifacts.harness_file, "benchinit_generated_test.go");
        assert_eq!(config.artifacts.stub_file, "benchinit_generated_stub.go");
        assert_eq!(config.symbols, SymbolSuffixes::default());
        assert_eq!(config.exclusions, Exclusions::hard());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = ConfigLoader::load_string("runner:\n  program: /opt/go/bin/go\n").unwrap();
        assert_eq!(config.runner.program, "/opt/go/bin/go");
        assert_eq!(config.runner.benchmark.as_str(), "BenchmarkInit");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ConfigLoader::load_string("runnr:\n  program: go\n").is_err());
    }

    #[test]
    fn test_invalid_benchmark_name() {
        assert!(ConfigLoader::load_string("runner:\n  benchmark: InitBench\n").is_err());
        assert!(ConfigLoader::load_string("runner:\n  benchmark: Benchmarkinit\n").is_err());
        assert!(ConfigLoader::load_string("runner:\n  benchmark: Benchmark\n").is_ok());
    }

    #[test]
    fn test_harness_must_be_test_file() {
        let yaml = "artifacts:\n  harness_file: harness.go\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_stub_must_not_be_test_file() {
        let yaml = "artifacts:\n  stub_file: stub_test.go\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_artifact_names_must_be_plain() {
        let yaml = "artifacts:\n  stub_file: ../stub.go\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_unknown_arch() {
        assert!(ConfigLoader::load_string("target:\n  arch: z80\n").is_err());
    }

    #[test]
    fn test_invalid_exclusion() {
        assert!(ConfigLoader::load_string("exclude:\n  - \"bad path\"\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = ConfigLoader::discover(Some(Path::new("/nonexistent/benchinit.yaml")));
        assert!(matches!(result, Err(BenchinitError::ConfigNotFound { .. })));
    }
}
