//! Upload stage

use super::{log_completed, log_terminated};
use crate::config::S3_PREFIX;
use crate::error::{Result, ResultExt};
use crate::output::{CloudDestination, ObjectSink};
use crate::telemetry::LogSink;
use crate::types::{list_matching_files, Stage};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Object key for `file_name` under `prefix`
///
/// Exactly one `/` separates a non-empty prefix from the name.
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file_name.to_string()
    } else {
        format!("{prefix}/{file_name}")
    }
}

/// Pushes every matching file in a directory to an object store
pub struct Uploader {
    input_dir: PathBuf,
    prefix: String,
    log: LogSink,
}

impl Uploader {
    /// Upload the files in `input_dir` under the default prefix
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            prefix: S3_PREFIX.to_string(),
            log: LogSink::ambient(),
        }
    }

    /// Key prefix inside the bucket
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Log to `log` instead of the ambient subscriber
    #[must_use]
    pub fn with_log_sink(mut self, log: LogSink) -> Self {
        self.log = log;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Upload to `bucket`, returning the keys that succeeded
    ///
    /// No storage client is built when there is nothing to upload.
    pub async fn run(&self, bucket: &str) -> Result<Vec<String>> {
        self.log.scope(self.upload_to_bucket(bucket)).await
    }

    /// Upload into an already constructed sink
    pub async fn run_with_sink(&self, sink: &dyn ObjectSink) -> Result<Vec<String>> {
        self.log.scope(self.upload_to_sink(sink)).await
    }

    async fn upload_to_bucket(&self, bucket: &str) -> Result<Vec<String>> {
        let files = self.list()?;
        if files.is_empty() {
            return Ok(self.nothing_to_upload());
        }

        let destination = match CloudDestination::for_bucket(bucket) {
            Ok(destination) => destination,
            Err(e) => {
                error!("Failed to create storage client for '{bucket}': {e}");
                log_terminated(Stage::Upload);
                return Err(e);
            }
        };
        Ok(self.upload_files(&files, &destination).await)
    }

    async fn upload_to_sink(&self, sink: &dyn ObjectSink) -> Result<Vec<String>> {
        let files = self.list()?;
        if files.is_empty() {
            return Ok(self.nothing_to_upload());
        }
        Ok(self.upload_files(&files, sink).await)
    }

    fn list(&self) -> Result<Vec<PathBuf>> {
        list_matching_files(&self.input_dir).map_err(|e| {
            error!("{e}");
            log_terminated(Stage::Upload);
            e
        })
    }

    fn nothing_to_upload(&self) -> Vec<String> {
        warn!(
            "No Parquet files found in {} to upload.",
            self.input_dir.display()
        );
        log_completed(Stage::Upload);
        Vec::new()
    }

    async fn upload_files(&self, files: &[PathBuf], sink: &dyn ObjectSink) -> Vec<String> {
        let location = sink.location();
        let mut uploaded = Vec::with_capacity(files.len());

        for file in files {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let key = object_key(&self.prefix, &file_name);

            info!("Uploading {file_name} to {location}/{key}");
            match upload_one(sink, file, &key).await {
                Ok(uri) => {
                    info!("Uploaded: {uri}");
                    uploaded.push(key);
                }
                Err(e) => error!("Failed to upload {} to {location}: {e}", file.display()),
            }
        }

        info!("Uploaded {} of {} files.", uploaded.len(), files.len());
        log_completed(Stage::Upload);
        uploaded
    }
}

async fn upload_one(sink: &dyn ObjectSink, file: &Path, key: &str) -> Result<String> {
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    sink.put(key, Bytes::from(data)).await
}
