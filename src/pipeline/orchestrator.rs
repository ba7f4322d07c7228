//! Full pipeline run
//!
//! The stages are chained as a small state machine:
//!
//! ```text
//! Start -> Fetched -> Transformed -> Uploaded -> Done
//!   \---------\-----------\------------> Failed
//! ```
//!
//! An empty download or an empty transform ends the run as `Failed`. An
//! upload that stored nothing is only a warning.

use super::{Fetcher, Transformer, Uploader};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::output::ObjectSink;
use crate::source::{FileSource, GithubFolderSource};
use crate::telemetry::{separator, LogSink};
use crate::types::Stage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a successful run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Combined file written by the download stage
    pub combined_file: PathBuf,
    /// Files written by the transform stage
    pub transformed_files: Vec<PathBuf>,
    /// Object keys stored by the upload stage
    pub uploaded_keys: Vec<String>,
}

/// Where a run currently is
#[derive(Debug)]
pub enum PipelineState {
    Start,
    Fetched {
        combined_file: PathBuf,
    },
    Transformed {
        combined_file: PathBuf,
        transformed_files: Vec<PathBuf>,
    },
    Uploaded(PipelineReport),
    Done(PipelineReport),
    Failed(Error),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Start => "start",
            PipelineState::Fetched { .. } => "fetched",
            PipelineState::Transformed { .. } => "transformed",
            PipelineState::Uploaded(_) => "uploaded",
            PipelineState::Done(_) => "done",
            PipelineState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done(_) | PipelineState::Failed(_))
    }
}

/// Process exit status for a finished run or command
pub fn exit_code<T>(result: &Result<T>) -> i32 {
    result.as_ref().map_or_else(Error::exit_code, |_| 0)
}

/// Download, transform and upload in one go
pub struct Pipeline {
    config: PipelineConfig,
    source: Arc<dyn FileSource>,
    sink: Option<Arc<dyn ObjectSink>>,
    log: LogSink,
}

impl Pipeline {
    /// Run `config` against an explicit source
    pub fn new(config: PipelineConfig, source: Arc<dyn FileSource>) -> Self {
        Self {
            config,
            source,
            sink: None,
            log: LogSink::ambient(),
        }
    }

    /// Run `config` against its configured GitHub folder
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        let source = GithubFolderSource::new(&config.source)?;
        Ok(Self::new(config, Arc::new(source)))
    }

    /// Upload into `sink` instead of resolving the configured bucket
    #[must_use]
    pub fn with_object_sink(mut self, sink: Arc<dyn ObjectSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Log every stage to `log`
    #[must_use]
    pub fn with_log_sink(mut self, log: LogSink) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage in order
    ///
    /// Failures come back as [`Error::StageFailed`] naming the stage.
    pub async fn run(&self) -> Result<PipelineReport> {
        self.log.scope(self.drive()).await
    }

    async fn drive(&self) -> Result<PipelineReport> {
        info!("Starting full data pipeline...");

        let mut state = PipelineState::Start;
        while !state.is_terminal() {
            state = self.step(state).await;
            debug!(state = state.name(), "Pipeline state changed");
        }

        match state {
            PipelineState::Done(report) => {
                info!("Pipeline completed successfully.");
                info!("{}", separator('='));
                Ok(report)
            }
            PipelineState::Failed(err) => {
                error!("{err}");
                Err(err)
            }
            other => Err(Error::Other(format!(
                "Pipeline stopped in non-terminal state '{}'",
                other.name()
            ))),
        }
    }

    async fn step(&self, state: PipelineState) -> PipelineState {
        match state {
            PipelineState::Start => match self.fetcher().run().await {
                Ok(Some(combined_file)) => PipelineState::Fetched { combined_file },
                Ok(None) => {
                    error!("No files downloaded. Pipeline exiting.");
                    PipelineState::Failed(Error::stage(Stage::Download, "no files downloaded"))
                }
                Err(e) => PipelineState::Failed(Error::stage(Stage::Download, e.to_string())),
            },

            PipelineState::Fetched { combined_file } => match self.transformer().run() {
                Ok(transformed_files) if transformed_files.is_empty() => {
                    PipelineState::Failed(Error::stage(Stage::Transform, "no files transformed"))
                }
                Ok(transformed_files) => PipelineState::Transformed {
                    combined_file,
                    transformed_files,
                },
                Err(e) => PipelineState::Failed(Error::stage(Stage::Transform, e.to_string())),
            },

            PipelineState::Transformed {
                combined_file,
                transformed_files,
            } => match self.upload().await {
                Ok(uploaded_keys) => {
                    if uploaded_keys.is_empty() {
                        warn!("No files uploaded.");
                    }
                    PipelineState::Uploaded(PipelineReport {
                        combined_file,
                        transformed_files,
                        uploaded_keys,
                    })
                }
                Err(e) => PipelineState::Failed(Error::stage(Stage::Upload, e.to_string())),
            },

            PipelineState::Uploaded(report) => PipelineState::Done(report),

            terminal => terminal,
        }
    }

    fn fetcher(&self) -> Fetcher {
        Fetcher::new(&self.config.data_dir, Arc::clone(&self.source)).with_log_sink(self.log.clone())
    }

    fn transformer(&self) -> Transformer {
        Transformer::new(&self.config.data_dir)
            .with_subdirs(&self.config.processed_subdir, &self.config.error_subdir)
            .with_log_sink(self.log.clone())
    }

    async fn upload(&self) -> Result<Vec<String>> {
        let uploader = Uploader::new(self.config.processed_dir())
            .with_prefix(&self.config.prefix)
            .with_log_sink(self.log.clone());

        match &self.sink {
            Some(sink) => uploader.run_with_sink(sink.as_ref()).await,
            None => uploader.run(&self.config.bucket).await,
        }
    }
}
