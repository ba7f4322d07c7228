//! Pipeline module
//!
//! The three stages and the orchestrator that chains them.
//!
//! # Overview
//!
//! - [`Fetcher`] - list a remote source, combine every matching file into one local file
//! - [`Transformer`] - normalize each file in a directory, quarantining failures
//! - [`Uploader`] - push each processed file to an object store
//! - [`Pipeline`] - run the three in order, failing on empty fetch or transform output
//!
//! Failure isolation differs by stage: one bad remote file aborts the whole
//! download, while transform and upload failures only skip the file.

mod fetch;
mod orchestrator;
mod transform;
mod upload;

pub use fetch::Fetcher;
pub use orchestrator::{exit_code, Pipeline, PipelineReport, PipelineState};
pub use transform::{normalize, Transformer, DROPOFF_COLUMN, PICKUP_COLUMN, TRIP_TIME_TYPE};
pub use upload::{object_key, Uploader};

use crate::telemetry::separator;
use crate::types::Stage;
use tracing::info;

/// Closing lines for a stage that finished normally
fn log_completed(stage: Stage) {
    info!("{stage} completed.");
    info!("{}", separator('-'));
}

/// Closing lines for a stage that hit a fatal error
fn log_terminated(stage: Stage) {
    info!("{stage} terminated.");
    info!("{}", separator('-'));
}
