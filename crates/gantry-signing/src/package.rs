//! Package discovery
//!
//! A run processes exactly one package kind. Mixed directories silently
//! ignore the non-matching kind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SigningError};

/// Recognized package archive kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    Rpm,
    Deb,
}

impl PackageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Rpm => "rpm",
            Self::Deb => "deb",
        }
    }

    /// Case-insensitive extension match.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(self.extension()))
            .unwrap_or(false)
    }
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rpm => write!(f, "rpm"),
            Self::Deb => write!(f, "deb"),
        }
    }
}

/// Select a backend from the directory's file extensions in listing
/// order: the first recognized entry decides the kind for the run.
pub fn detect_kind(dir: &Path) -> Result<Option<PackageKind>> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if PackageKind::Rpm.matches(&path) {
            return Ok(Some(PackageKind::Rpm));
        }
        if PackageKind::Deb.matches(&path) {
            return Ok(Some(PackageKind::Deb));
        }
    }
    Ok(None)
}

/// Ordered set of artifact file names of one kind inside a directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSet {
    dir: PathBuf,
    names: Vec<String>,
}

impl PackageSet {
    /// Enumerate files in `dir` matching `kind`, sorted by name.
    pub fn discover(dir: &Path, kind: PackageKind) -> Result<Self> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && kind.matches(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Full paths, one per package, in name order.
    pub fn paths(&self) -> Vec<String> {
        self.names
            .iter()
            .map(|n| self.dir.join(n).to_string_lossy().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Directory-level precondition: a run needs at least one recognized
/// package kind.
pub fn require_kind(dir: &Path) -> Result<PackageKind> {
    detect_kind(dir)?.ok_or_else(|| SigningError::Config("No package to sign".to_string()))
}
