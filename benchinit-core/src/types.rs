// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! All types validate their invariants at creation time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Validated Go import path, e.g. `net/http` or `example.com/app/cmd`.
///
/// Ordered so that imports can be visited in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModulePath(String);

impl ModulePath {
    /// Create a new ModulePath with validation.
    pub fn new(path: impl Into<String>) -> Result<Self, HardValidationError> {
        let path = path.into();

        if path.is_empty() {
            return Err(HardValidationError::InvalidModulePath {
                path,
                reason: "Module path cannot be empty".to_string(),
            });
        }

        if let Some(c) = path
            .chars()
            .find(|c| c.is_whitespace() || *c == '"' || *c == '`' || *c == '\0')
        {
            return Err(HardValidationError::InvalidModulePath {
                reason: format!("Module path contains forbidden character {:?}", c),
                path,
            });
        }

        Ok(Self(path))
    }

    /// Create without validation, for paths known to be well-formed.
    pub fn new_unchecked(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ModulePath {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModulePath> for String {
    fn from(path: ModulePath) -> Self {
        path.0
    }
}

/// Validated Go identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GoIdent(String);

impl GoIdent {
    /// Create a new GoIdent with validation.
    pub fn new(ident: impl Into<String>) -> Result<Self, HardValidationError> {
        let ident = ident.into();
        if !is_identifier(&ident) {
            return Err(HardValidationError::InvalidIdentifier { ident });
        }
        Ok(Self(ident))
    }

    /// Create without validation, for identifiers known to be well-formed.
    pub fn new_unchecked(ident: impl Into<String>) -> Self {
        Self(ident.into())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GoIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for GoIdent {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GoIdent> for String {
    fn from(ident: GoIdent) -> Self {
        ident.0
    }
}

/// Whether `s` is a Go identifier: a letter or `_`, then letters, digits or `_`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// gc target architectures, with the word size and maximum alignment the Go
/// compiler uses for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoArch {
    I386,
    Amd64,
    Amd64p32,
    Arm,
    Arm64,
    Loong64,
    Mips,
    Mipsle,
    Mips64,
    Mips64le,
    Ppc64,
    Ppc64le,
    Riscv64,
    S390x,
    Sparc64,
    Wasm,
}

impl GoArch {
    const ALL: [GoArch; 16] = [
        Self::I386,
        Self::Amd64,
        Self::Amd64p32,
        Self::Arm,
        Self::Arm64,
        Self::Loong64,
        Self::Mips,
        Self::Mipsle,
        Self::Mips64,
        Self::Mips64le,
        Self::Ppc64,
        Self::Ppc64le,
        Self::Riscv64,
        Self::S390x,
        Self::Sparc64,
        Self::Wasm,
    ];

    /// GOARCH spelling.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::I386 => "386",
            Self::Amd64 => "amd64",
            Self::Amd64p32 => "amd64p32",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Loong64 => "loong64",
            Self::Mips => "mips",
            Self::Mipsle => "mipsle",
            Self::Mips64 => "mips64",
            Self::Mips64le => "mips64le",
            Self::Ppc64 => "ppc64",
            Self::Ppc64le => "ppc64le",
            Self::Riscv64 => "riscv64",
            Self::S390x => "s390x",
            Self::Sparc64 => "sparc64",
            Self::Wasm => "wasm",
        }
    }

    /// Size in bytes of a pointer, `int` and `uintptr`.
    pub const fn word_size(&self) -> u64 {
        match self {
            Self::I386 | Self::Amd64p32 | Self::Arm | Self::Mips | Self::Mipsle => 4,
            _ => 8,
        }
    }

    /// Largest alignment any type gets.
    pub const fn max_align(&self) -> u64 {
        match self {
            Self::I386 | Self::Arm | Self::Mips | Self::Mipsle => 4,
            _ => 8,
        }
    }

    /// The architecture this binary was built for, if Go supports it.
    pub fn host() -> Option<Self> {
        let arch = match std::env::consts::ARCH {
            "x86" => Self::I386,
            "x86_64" => Self::Amd64,
            "arm" => Self::Arm,
            "aarch64" => Self::Arm64,
            "loongarch64" => Self::Loong64,
            "mips" if cfg!(target_endian = "little") => Self::Mipsle,
            "mips" => Self::Mips,
            "mips64" if cfg!(target_endian = "little") => Self::Mips64le,
            "mips64" => Self::Mips64,
            "powerpc64" if cfg!(target_endian = "little") => Self::Ppc64le,
            "powerpc64" => Self::Ppc64,
            "riscv64" => Self::Riscv64,
            "s390x" => Self::S390x,
            "sparc64" => Self::Sparc64,
            "wasm32" => Self::Wasm,
            _ => return None,
        };
        Some(arch)
    }
}

impl fmt::Display for GoArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GoArch {
    type Err = HardValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|arch| arch.name() == s)
            .ok_or_else(|| HardValidationError::UnknownArch {
                arch: s.to_string(),
            })
    }
}
