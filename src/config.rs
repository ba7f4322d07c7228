//! Configuration for the taxi pipeline
//!
//! The orchestrated run takes no flags: everything comes from the
//! constants below through [`PipelineConfig::default`]. The standalone
//! stage commands override individual paths.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Defaults
// ============================================================================

/// Root directory for raw files
pub const DATA_DIR: &str = "data";

/// Subdirectory (under the data directory) for transformed files
pub const PROCESSED_SUBDIR: &str = "processed";

/// Subdirectory (under the data directory) for quarantined files
pub const ERROR_SUBDIR: &str = "error";

/// Target bucket for the orchestrated run; replace with a real bucket name
pub const S3_BUCKET: &str = "XXXXX-nyc-taxi-pipeline";

/// Key prefix for uploaded objects
pub const S3_PREFIX: &str = "nyc_taxi/";

/// Directory for rotating log files
pub const LOG_DIR: &str = "logs";

/// Log file for the orchestrated run
pub const PIPELINE_LOG_FILE: &str = "taxi_data_pipeline.log";

/// Size at which a log file is rotated
pub const LOG_MAX_BYTES: u64 = 1_000_000;

/// Number of rotated log files kept
pub const LOG_BACKUPS: usize = 2;

// ============================================================================
// Pipeline Config
// ============================================================================

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory for raw files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Name of the processed subdirectory
    #[serde(default = "default_processed_subdir")]
    pub processed_subdir: String,

    /// Name of the quarantine subdirectory
    #[serde(default = "default_error_subdir")]
    pub error_subdir: String,

    /// Target bucket identifier
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Object key prefix
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Remote folder to download from
    #[serde(default)]
    pub source: GithubFolder,

    /// Log file settings
    #[serde(default)]
    pub log: LogConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DATA_DIR)
}

fn default_processed_subdir() -> String {
    PROCESSED_SUBDIR.to_string()
}

fn default_error_subdir() -> String {
    ERROR_SUBDIR.to_string()
}

fn default_bucket() -> String {
    S3_BUCKET.to_string()
}

fn default_prefix() -> String {
    S3_PREFIX.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            processed_subdir: default_processed_subdir(),
            error_subdir: default_error_subdir(),
            bucket: default_bucket(),
            prefix: default_prefix(),
            source: GithubFolder::default(),
            log: LogConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config rooted at a different data directory
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the target bucket
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the object key prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Directory holding transformed files
    pub fn processed_dir(&self) -> PathBuf {
        processed_dir(&self.data_dir, &self.processed_subdir)
    }

    /// Directory holding quarantined files
    pub fn error_dir(&self) -> PathBuf {
        self.data_dir.join(&self.error_subdir)
    }
}

/// Join the processed subdirectory onto a data directory
pub fn processed_dir(data_dir: &Path, subdir: &str) -> PathBuf {
    data_dir.join(subdir)
}

// ============================================================================
// Remote Source
// ============================================================================

/// A folder in a GitHub repository, listed through the contents API
///
/// GitHub does not serve raw folder listings, so the folder is listed via
/// `api.github.com` and each file is fetched from its `download_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubFolder {
    /// Repository owner
    pub user: String,
    /// Repository name
    pub repo: String,
    /// Folder path inside the repository
    pub folder: String,
    /// Branch or ref
    pub branch: String,
}

impl Default for GithubFolder {
    fn default() -> Self {
        Self {
            user: "kariycha".to_string(),
            repo: "nyc_taxi_data_pipeline".to_string(),
            folder: "data/source".to_string(),
            branch: "main".to_string(),
        }
    }
}

impl GithubFolder {
    /// Contents API URL listing the folder
    pub fn listing_url(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/contents/{}?ref={}",
            self.user, self.repo, self.folder, self.branch
        )
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Rotating log file settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory the log files live in
    pub dir: PathBuf,
    /// Size at which a file is rotated
    pub max_bytes: u64,
    /// Number of rotated files kept
    pub backups: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(LOG_DIR),
            max_bytes: LOG_MAX_BYTES,
            backups: LOG_BACKUPS,
        }
    }
}
