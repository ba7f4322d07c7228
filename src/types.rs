//! Common types used throughout the pipeline
//!
//! This module contains shared type definitions: the stage identifiers,
//! the remote file descriptor, and the file naming rules every stage
//! agrees on.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ============================================================================
// File Naming
// ============================================================================

/// Extension of the data files every stage scans for
pub const DATA_FILE_EXTENSION: &str = "parquet";

/// Name prefix of the combined raw file written by the download stage
pub const COMBINED_FILE_PREFIX: &str = "taxi_tripdata";

/// Suffix appended to the stem of a transformed file
pub const TRANSFORMED_SUFFIX: &str = "_transformed";

/// Timestamp format embedded in combined raw file names
///
/// One-second granularity: two runs started within the same second write
/// the same name.
pub const COMBINED_TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

/// Check whether a file name has the data file extension
pub fn is_matching_name(name: &str) -> bool {
    name.ends_with(&format!(".{DATA_FILE_EXTENSION}"))
}

/// Build the combined raw file name for a run started at `started`
///
/// Format: `taxi_tripdata_{YYYY_MM_DD_HHMMSS}.parquet`
pub fn combined_file_name<Tz: TimeZone>(started: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "{COMBINED_FILE_PREFIX}_{}.{DATA_FILE_EXTENSION}",
        started.format(COMBINED_TIMESTAMP_FORMAT)
    )
}

/// Derive the transformed file name from an input path
///
/// `green_2025-05.parquet` becomes `green_2025-05_transformed.parquet`.
pub fn transformed_file_name(input: &Path) -> Result<String> {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::output(format!("Invalid file name: {}", input.display())))?;
    Ok(format!("{stem}{TRANSFORMED_SUFFIX}.{DATA_FILE_EXTENSION}"))
}

/// List the matching files directly inside `dir`
///
/// Non-recursive. Only regular files are returned, sorted by file name so
/// every stage walks a directory in the same order. Hidden files (a leading
/// `.`, such as `._green.parquet` sidecars) are skipped.
pub fn list_matching_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::directory(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::directory(dir, e))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| !n.starts_with('.') && is_matching_name(n));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

// ============================================================================
// Stages
// ============================================================================

/// One independently invocable unit of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fetch and combine remote files
    Download,
    /// Normalize local files
    Transform,
    /// Push processed files to the object store
    Upload,
}

impl Stage {
    /// Default log file name for the stage when run on its own
    pub fn log_file_name(self) -> &'static str {
        match self {
            Stage::Download => "download.log",
            Stage::Transform => "transform.log",
            Stage::Upload => "upload.log",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Download => write!(f, "Download"),
            Stage::Transform => write!(f, "Transformation"),
            Stage::Upload => write!(f, "Upload"),
        }
    }
}

// ============================================================================
// Remote Files
// ============================================================================

/// One remotely retrievable file
///
/// Deserializes directly from a GitHub contents API entry; extra fields
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name as listed
    pub name: String,

    /// Direct retrieval URL (absent for directories)
    #[serde(default)]
    pub download_url: Option<String>,
}

impl SourceFile {
    /// Create a descriptor with a retrieval URL
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: Some(download_url.into()),
        }
    }

    /// Whether the name has the data file extension
    pub fn is_matching(&self) -> bool {
        is_matching_name(&self.name)
    }
}
