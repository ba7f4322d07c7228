//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{LogConfig, PipelineConfig, PIPELINE_LOG_FILE};
use crate::error::{Error, Result};
use crate::pipeline::{Fetcher, Pipeline, Transformer, Uploader};
use crate::source::{DirectUrlSource, FileSource, GithubFolderSource};
use crate::telemetry::LogSink;
use crate::types::Stage;
use std::path::Path;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
    log: LogConfig,
}

impl Runner {
    /// Create a new runner writing logs under the default log directory
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            log: LogConfig::default(),
        }
    }

    /// Write logs under `log.dir` instead
    #[must_use]
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Download {
                output_dir,
                listing_url,
                file_url,
            } => {
                self.download(output_dir, listing_url.as_deref(), file_url.as_deref())
                    .await
            }
            Commands::Transform { input_dir } => self.transform(input_dir),
            Commands::Upload {
                bucket,
                input_dir,
                prefix,
            } => self.upload(bucket, input_dir, prefix).await,
            Commands::Run => self.run_pipeline().await,
        }
    }

    fn stage_log(&self, stage: Stage) -> Result<LogSink> {
        LogSink::to_file(&self.log, stage.log_file_name(), true)
    }

    async fn download(
        &self,
        output_dir: &Path,
        listing_url: Option<&str>,
        file_url: Option<&str>,
    ) -> Result<()> {
        let source: Arc<dyn FileSource> = match (file_url, listing_url) {
            (Some(url), _) => Arc::new(DirectUrlSource::new(url)?),
            (None, Some(url)) => Arc::new(GithubFolderSource::from_listing_url(url)?),
            (None, None) => Arc::new(GithubFolderSource::new(&PipelineConfig::default().source)?),
        };

        let combined = Fetcher::new(output_dir, source)
            .with_log_sink(self.stage_log(Stage::Download)?)
            .run()
            .await?;

        if let Some(path) = combined {
            println!("{}", path.display());
        }
        Ok(())
    }

    fn transform(&self, input_dir: &Path) -> Result<()> {
        let transformed = Transformer::new(input_dir)
            .with_log_sink(self.stage_log(Stage::Transform)?)
            .run()?;

        for path in transformed {
            println!("{}", path.display());
        }
        Ok(())
    }

    async fn upload(&self, bucket: &str, input_dir: &Path, prefix: &str) -> Result<()> {
        let keys = Uploader::new(input_dir)
            .with_prefix(prefix)
            .with_log_sink(self.stage_log(Stage::Upload)?)
            .run(bucket)
            .await?;

        for key in keys {
            println!("{key}");
        }
        Ok(())
    }

    async fn run_pipeline(&self) -> Result<()> {
        let config = PipelineConfig {
            log: self.log.clone(),
            ..PipelineConfig::default()
        };
        let log = LogSink::to_file(&config.log, PIPELINE_LOG_FILE, true)?;

        let report = Pipeline::from_config(config)?
            .with_log_sink(log)
            .run()
            .await?;

        for key in &report.uploaded_keys {
            println!("{key}");
        }
        Ok(())
    }
}

/// Short description of a failed command for stderr
pub fn describe_failure(err: &Error) -> String {
    match err.failed_stage() {
        Some(_) => err.to_string(),
        None => format!("Error: {err}"),
    }
}
