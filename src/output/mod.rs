//! Output module
//!
//! Handles Parquet reading and writing and object storage.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Reading Parquet files and buffers into an in-memory [`Table`]
//! - Combining tables whose schemas drifted apart
//! - Writing Parquet files (Snappy by default)
//! - Cloud storage output (S3, R2, GCS, Azure, local)

mod cloud;
mod schema;
mod table;

pub use cloud::{CloudDestination, ObjectSink};
pub use schema::{align_batch, merge_types, unify_schemas};
pub use table::Table;

#[cfg(test)]
mod tests;
