//! CLI module
//!
//! Command-line interface for running the pipeline stages.
//!
//! # Commands
//!
//! - `download` - Combine every remote Parquet file into one local file
//! - `transform` - Normalize local files, quarantining failures
//! - `upload` - Push processed files to object storage
//! - `run` - All three in order

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::{describe_failure, Runner};
