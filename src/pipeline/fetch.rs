//! Download stage

use super::{log_completed, log_terminated};
use crate::error::{Error, Result};
use crate::output::Table;
use crate::source::FileSource;
use crate::telemetry::LogSink;
use crate::types::{combined_file_name, SourceFile, Stage};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Combines every matching remote file into one local Parquet file
pub struct Fetcher {
    output_dir: PathBuf,
    source: Arc<dyn FileSource>,
    log: LogSink,
}

impl Fetcher {
    /// Fetch from `source` into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>, source: Arc<dyn FileSource>) -> Self {
        Self {
            output_dir: output_dir.into(),
            source,
            log: LogSink::ambient(),
        }
    }

    /// Log to `log` instead of the ambient subscriber
    #[must_use]
    pub fn with_log_sink(mut self, log: LogSink) -> Self {
        self.log = log;
        self
    }

    /// Directory the combined file is written to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the stage
    ///
    /// Returns the combined file, or `None` when the listing had no
    /// matching files. Any listing, retrieval, decode or write failure
    /// aborts the whole batch.
    pub async fn run(&self) -> Result<Option<PathBuf>> {
        self.log.scope(self.fetch()).await
    }

    async fn fetch(&self) -> Result<Option<PathBuf>> {
        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            let err = Error::directory(&self.output_dir, e);
            error!("{err}");
            log_terminated(Stage::Download);
            return Err(err);
        }

        let locator = self.source.locator();
        let listing = match self.source.list().await {
            Ok(listing) => listing,
            Err(e) => {
                error!("Failed to fetch file list from {locator}: {e}");
                log_terminated(Stage::Download);
                return Err(e);
            }
        };

        let matching: Vec<SourceFile> = listing.into_iter().filter(SourceFile::is_matching).collect();
        info!("Found {} Parquet files.", matching.len());

        if matching.is_empty() {
            info!("No Parquet files found in {locator}.");
            log_completed(Stage::Download);
            return Ok(None);
        }

        let mut tables = Vec::with_capacity(matching.len());
        for file in &matching {
            info!(
                "Reading {} from {}",
                file.name,
                file.download_url.as_deref().unwrap_or("<no download url>")
            );
            match self.retrieve(file).await {
                Ok(table) => tables.push(table),
                Err(e) => {
                    error!("Failed to read Parquet file {}: {e}", file.name);
                    log_terminated(Stage::Download);
                    return Err(e);
                }
            }
        }

        let output_path = self.output_dir.join(combined_file_name(&Local::now()));
        match self.save(tables, &output_path) {
            Ok(rows) => info!(
                "Combined Parquet saved to: {} ({rows} rows)",
                output_path.display()
            ),
            Err(e) => {
                error!(
                    "Failed to save file locally '{}': {e}",
                    self.output_dir.display()
                );
                log_terminated(Stage::Download);
                return Err(e);
            }
        }

        log_completed(Stage::Download);
        Ok(Some(output_path))
    }

    async fn retrieve(&self, file: &SourceFile) -> Result<Table> {
        let bytes = self.source.fetch(file).await?;
        Table::from_parquet_bytes(bytes)
    }

    fn save(&self, tables: Vec<Table>, path: &Path) -> Result<usize> {
        let combined = Table::concat(tables)?;
        let result = combined.write_parquet(path);

        // Never leave a truncated combined file for the transform stage
        if result.is_err() && path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove partial file {}: {e}", path.display());
            }
        }
        result
    }
}
