// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Generated artifact lifecycle.
//!
//! An [`ArtifactSet`] owns the files generated for one target. Files are
//! created exclusively and removed exactly once: by [`ArtifactSet::cleanup`],
//! or by `Drop` if the set goes out of scope first.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::SetupError;

/// Outcome of a cleanup pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn merge(&mut self, other: CleanupReport) {
        self.removed.extend(other.removed);
        self.failed.extend(other.failed);
    }
}

/// Files generated into one target directory.
#[derive(Debug)]
pub struct ArtifactSet {
    dir: PathBuf,
    created: Vec<PathBuf>,
}

impl ArtifactSet {
    /// Create an empty set for `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            created: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }

    /// Create `file_name` in the set's directory with `contents`.
    ///
    /// Fails without touching the file if it already exists. A file that was
    /// created but could not be fully written is still tracked for removal.
    pub fn create(&mut self, file_name: &str, contents: &str) -> Result<&Path, SetupError> {
        let path = self.dir.join(file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => SetupError::ArtifactExists { path: path.clone() },
                _ => SetupError::ArtifactWrite {
                    path: path.clone(),
                    source: e,
                },
            })?;
        self.created.push(path.clone());

        file.write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| SetupError::ArtifactWrite {
                path: path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "Created artifact");
        Ok(&self.created[self.created.len() - 1])
    }

    /// Remove every tracked file.
    ///
    /// Each file is forgotten once attempted, so a second call reports
    /// nothing removed and nothing failed.
    pub fn cleanup(&mut self) -> CleanupReport {
        let mut report = CleanupReport::default();
        for path in self.created.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Removed artifact");
                    report.removed.push(path);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to remove artifact");
                    report.failed.push((path, e.to_string()));
                }
            }
        }
        report
    }
}

impl Drop for ArtifactSet {
    fn drop(&mut self) {
        if !self.created.is_empty() {
            let _ = self.cleanup();
        }
    }
}
