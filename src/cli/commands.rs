//! CLI commands and argument parsing

use crate::config::{DATA_DIR, S3_PREFIX};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default `upload --input-dir`
const PROCESSED_DIR: &str = "data/processed";

/// NYC taxi trip data pipeline
#[derive(Parser, Debug)]
#[command(name = "nyc-taxi-pipeline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every Parquet file from the source and combine them into one
    Download {
        /// Directory the combined file is written to
        #[arg(short, long, default_value = DATA_DIR)]
        output_dir: PathBuf,

        /// GitHub contents API URL to list (defaults to the configured folder)
        #[arg(long, conflicts_with = "file_url")]
        listing_url: Option<String>,

        /// Download a single file from this URL instead of listing a folder
        #[arg(long)]
        file_url: Option<String>,
    },

    /// Normalize every Parquet file in a directory
    Transform {
        /// Directory holding the raw files
        #[arg(short, long, default_value = DATA_DIR)]
        input_dir: PathBuf,
    },

    /// Upload processed files to object storage
    Upload {
        /// Bucket name, or a s3:// r2:// gs:// az:// URL or local path
        #[arg(short, long)]
        bucket: String,

        /// Directory holding the processed files
        #[arg(short, long, default_value = PROCESSED_DIR)]
        input_dir: PathBuf,

        /// Key prefix inside the bucket
        #[arg(short, long, default_value = S3_PREFIX)]
        prefix: String,
    },

    /// Run download, transform and upload in order
    Run,
}
