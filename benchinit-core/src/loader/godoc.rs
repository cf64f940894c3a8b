// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Type declarations looked up through `go doc`.

use std::collections::HashMap;
use std::process::Command;

use crate::error::TypeError;
use crate::gotype::{parse_type_decl, TypeExpr, TypeResolver};

/// Resolves named types with `go doc -u -src <package> <Name>`.
///
/// Each declaration is fetched once per resolver.
#[derive(Debug)]
pub struct GoDocResolver {
    program: String,
    cache: HashMap<(String, String), TypeExpr>,
}

impl GoDocResolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cache: HashMap::new(),
        }
    }

    /// Number of cached declarations.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn fetch(&self, package: &str, name: &str) -> Result<String, TypeError> {
        let lookup_err = |message: String| TypeError::Lookup {
            name: format!("{}.{}", package, name),
            message,
        };

        tracing::debug!(program = %self.program, package, name, "Looking up type declaration");
        let output = Command::new(&self.program)
            .args(["doc", "-u", "-src", package, name])
            .output()
            .map_err(|e| lookup_err(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(lookup_err(format!(
                "{} doc exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout).map_err(|e| lookup_err(e.to_string()))
    }
}

impl TypeResolver for GoDocResolver {
    fn declaration(&mut self, package: &str, name: &str) -> Result<TypeExpr, TypeError> {
        let key = (package.to_string(), name.to_string());
        if let Some(expr) = self.cache.get(&key) {
            return Ok(expr.clone());
        }
        let source = self.fetch(package, name)?;
        let expr = parse_type_decl(&source, name)?;
        self.cache.insert(key, expr.clone());
        Ok(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_toolchain_is_lookup_error() {
        let mut resolver = GoDocResolver::new("/nonexistent/benchinit-go");
        let err = resolver.declaration("flag", "FlagSet").unwrap_err();
        assert!(matches!(err, TypeError::Lookup { ref name, .. } if name == "flag.FlagSet"));
        assert_eq!(resolver.cached(), 0);
    }
}
