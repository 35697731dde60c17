//! Versioned dataset files (`products_v{major}.{minor}.csv`).
//!
//! Cleaning runs bump the minor version; a new major version starts a fresh
//! dataset lineage. `latest.csv` mirrors the newest cleaned version.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::dataset::LATEST_FILE;
use crate::error::{DatasetError, DatasetResult};

const PREFIX: &str = "products_v";
const SUFFIX: &str = ".csv";

/// A dataset version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// File name without extension, e.g. `products_v1.2`.
    pub fn stem(&self) -> String {
        format!("{}{}.{}", PREFIX, self.major, self.minor)
    }

    /// File name, e.g. `products_v1.2.csv`.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.stem(), SUFFIX)
    }

    /// Parse a versioned file name. Other names (trails, `latest.csv`) give `None`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (major, minor) = file_name
            .strip_prefix(PREFIX)?
            .strip_suffix(SUFFIX)?
            .split_once('.')?;
        Some(Self::new(major.parse().ok()?, minor.parse().ok()?))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Which part of the version a new file bumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bump {
    /// Next minor version of the current (or given) major version
    Minor,
    /// Next major version, minor reset to 0
    Major,
}

/// All versions present in a directory.
pub fn scan_versions(dir: &Path) -> DatasetResult<Vec<Version>> {
    let entries = std::fs::read_dir(dir).map_err(|e| DatasetError::io(dir, e))?;
    let mut versions: Vec<Version> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| Version::parse(&entry.file_name().to_string_lossy()))
        .collect();
    versions.sort();
    Ok(versions)
}

/// Newest version in `dir`, within `major` when one is given.
pub fn latest_version(dir: &Path, major: Option<u32>) -> DatasetResult<Option<Version>> {
    let versions = scan_versions(dir)?;
    let major = match major {
        Some(major) => major,
        None => match versions.last() {
            Some(v) => v.major,
            None => return Ok(None),
        },
    };
    Ok(versions.into_iter().filter(|v| v.major == major).max())
}

/// Version the next file written to `dir` should carry.
pub fn next_version(dir: &Path, bump: Bump, major: Option<u32>) -> DatasetResult<Version> {
    let next = match bump {
        Bump::Minor => match latest_version(dir, major)? {
            Some(current) => Version::new(current.major, current.minor + 1),
            None => Version::new(major.unwrap_or(0), 0),
        },
        Bump::Major => {
            let newest = scan_versions(dir)?.last().map_or(0, |v| v.major);
            Version::new(newest + 1, 0)
        }
    };
    debug!(dir = %dir.display(), version = %next, "Next dataset version");
    Ok(next)
}

/// Create `latest.csv` in every directory under `root` (including `root`)
/// that lacks one and holds a cleaned version (minor > 0).
///
/// Returns the files created.
pub fn update_latest(root: &Path) -> DatasetResult<Vec<PathBuf>> {
    let mut created = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|e| DatasetError::io(&dir, e))?;
        for entry in entries.filter_map(|e| e.ok()) {
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                pending.push(entry.path());
            }
        }

        let latest = dir.join(LATEST_FILE);
        if latest.exists() {
            continue;
        }
        let Some(version) = latest_version(&dir, None)? else {
            continue;
        };
        if version.minor == 0 {
            continue;
        }

        let source = dir.join(version.file_name());
        std::fs::copy(&source, &latest).map_err(|e| DatasetError::io(&source, e))?;
        info!(source = %source.display(), "Created latest.csv");
        created.push(latest);
    }

    created.sort();
    Ok(created)
}
