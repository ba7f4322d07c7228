// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # NYC Taxi Pipeline
//!
//! Download NYC taxi trip files, normalize them and push them to object
//! storage.
//!
//! ## Features
//!
//! - **Download**: List a GitHub folder (or take one URL) and combine every Parquet file
//! - **Schema Drift**: Files with different columns are unified by name
//! - **Transform**: Lowercase columns, drop trips without times, coerce times to timestamps
//! - **Quarantine**: Files that fail to transform are moved aside, the rest carry on
//! - **Upload**: S3 by default, with R2, GCS, Azure and local paths also supported
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nyc_taxi_pipeline::{Pipeline, PipelineConfig, Result};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let config = PipelineConfig::default().with_bucket("my-taxi-bucket");
//!     let report = Pipeline::from_config(config)?.run().await?;
//!
//!     for key in &report.uploaded_keys {
//!         println!("{key}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌──────────────┐
//! │   Fetcher    │ -> │  Transformer  │ -> │   Uploader   │
//! │ FileSource   │    │  normalize()  │    │  ObjectSink  │
//! │ Table concat │    │  quarantine   │    │  object_key  │
//! └──────────────┘    └───────────────┘    └──────────────┘
//!          \                  |                   /
//!           └──────────── Pipeline (state machine) ┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Common types and file naming rules
pub mod types;

/// Pipeline configuration and constants
pub mod config;

/// Log sinks and rotating log files
pub mod telemetry;

/// HTTP client
pub mod http;

/// Remote file sources
pub mod source;

/// Parquet tables and object storage
pub mod output;

/// Pipeline stages and orchestration
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::PipelineConfig;
pub use pipeline::{Fetcher, Pipeline, PipelineReport, Transformer, Uploader};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
