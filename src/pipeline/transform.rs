//! Transform stage
//!
//! Each file in the input directory is normalized independently: column
//! names are lowercased, rows missing a trip time are dropped and the trip
//! time columns are coerced to timestamps. A file that fails any step is
//! moved into the error directory and the stage carries on.

use super::{log_completed, log_terminated};
use crate::config::{ERROR_SUBDIR, PROCESSED_SUBDIR};
use crate::error::{Error, Result};
use crate::output::Table;
use crate::telemetry::LogSink;
use crate::types::{list_matching_files, transformed_file_name, Stage};
use arrow::array::ArrayRef;
use arrow::compute::{and, can_cast_types, cast_with_options, filter_record_batch, is_not_null, CastOptions};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Pickup time column, after lowercasing
pub const PICKUP_COLUMN: &str = "lpep_pickup_datetime";

/// Dropoff time column, after lowercasing
pub const DROPOFF_COLUMN: &str = "lpep_dropoff_datetime";

/// Type the trip time columns are coerced to
pub const TRIP_TIME_TYPE: DataType = DataType::Timestamp(TimeUnit::Nanosecond, None);

/// Schema metadata written by pandas; stale once columns are renamed
const PANDAS_METADATA_KEY: &str = "pandas";

/// Normalize one table
///
/// 1. lowercase every column name
/// 2. drop rows with a null pickup or dropoff time (only when both columns exist)
/// 3. cast non-timestamp trip time columns to [`TRIP_TIME_TYPE`]
///
/// Values that cannot be parsed become null. A column whose type has no
/// timestamp conversion at all is an error.
pub fn normalize(table: Table) -> Result<Table> {
    let table = lowercase_columns(table)?;
    let table = drop_missing_trip_times(table)?;
    coerce_trip_times(table)
}

fn lowercase_columns(table: Table) -> Result<Table> {
    let (schema, batches) = table.into_parts();

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone().with_name(f.name().to_lowercase()))
        .collect();
    let mut metadata = schema.metadata().clone();
    metadata.remove(PANDAS_METADATA_KEY);

    let renamed: SchemaRef = Arc::new(Schema::new_with_metadata(fields, metadata));
    let batches = batches
        .iter()
        .map(|batch| rebuild(&renamed, batch, batch.columns().to_vec()))
        .collect::<Result<Vec<_>>>()?;

    Table::try_new(renamed, batches)
}

fn drop_missing_trip_times(table: Table) -> Result<Table> {
    let schema = table.schema().clone();
    let (Ok(pickup), Ok(dropoff)) = (schema.index_of(PICKUP_COLUMN), schema.index_of(DROPOFF_COLUMN))
    else {
        return Ok(table);
    };

    let (schema, batches) = table.into_parts();
    let mut kept = Vec::with_capacity(batches.len());
    for batch in &batches {
        let mask = and(
            &is_not_null(batch.column(pickup))?,
            &is_not_null(batch.column(dropoff))?,
        )?;
        kept.push(filter_record_batch(batch, &mask)?);
    }

    Table::try_new(schema, kept)
}

fn coerce_trip_times(table: Table) -> Result<Table> {
    let (schema, batches) = table.into_parts();

    let targets: Vec<usize> = [PICKUP_COLUMN, DROPOFF_COLUMN]
        .iter()
        .filter_map(|name| schema.index_of(name).ok())
        .filter(|&idx| !matches!(schema.field(idx).data_type(), DataType::Timestamp(_, _)))
        .collect();

    if targets.is_empty() {
        return Table::try_new(schema, batches);
    }

    for &idx in &targets {
        let field = schema.field(idx);
        if !can_cast_types(field.data_type(), &TRIP_TIME_TYPE) {
            return Err(Error::transform(format!(
                "Column '{}' of type {} cannot be converted to a timestamp",
                field.name(),
                field.data_type()
            )));
        }
    }

    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            if targets.contains(&idx) {
                f.as_ref()
                    .clone()
                    .with_data_type(TRIP_TIME_TYPE)
                    .with_nullable(true)
            } else {
                f.as_ref().clone()
            }
        })
        .collect();
    let coerced: SchemaRef = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));

    let options = CastOptions {
        safe: true,
        ..Default::default()
    };

    let mut out = Vec::with_capacity(batches.len());
    for batch in &batches {
        let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
        for &idx in &targets {
            columns[idx] = cast_with_options(batch.column(idx), &TRIP_TIME_TYPE, &options)?;
        }
        out.push(rebuild(&coerced, batch, columns)?);
    }

    Table::try_new(coerced, out)
}

/// Same rows, new schema
fn rebuild(schema: &SchemaRef, batch: &RecordBatch, columns: Vec<ArrayRef>) -> Result<RecordBatch> {
    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(schema.clone(), columns, &options)?)
}

/// Normalizes every matching file in a directory
pub struct Transformer {
    input_dir: PathBuf,
    processed_subdir: String,
    error_subdir: String,
    log: LogSink,
}

impl Transformer {
    /// Transform the files in `input_dir` into `input_dir/processed`
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            processed_subdir: PROCESSED_SUBDIR.to_string(),
            error_subdir: ERROR_SUBDIR.to_string(),
            log: LogSink::ambient(),
        }
    }

    /// Override the output and quarantine subdirectory names
    #[must_use]
    pub fn with_subdirs(mut self, processed: impl Into<String>, error: impl Into<String>) -> Self {
        self.processed_subdir = processed.into();
        self.error_subdir = error.into();
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

    pub fn processed_dir(&self) -> PathBuf {
        self.input_dir.join(&self.processed_subdir)
    }

    pub fn error_dir(&self) -> PathBuf {
        self.input_dir.join(&self.error_subdir)
    }

    /// Run the stage, returning the transformed files in input order
    ///
    /// Per-file failures are quarantined and skipped. Only directory
    /// problems (creating the output dirs, listing the input, moving a
    /// failed file) are fatal.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        self.log.in_scope(|| self.transform_all())
    }

    fn transform_all(&self) -> Result<Vec<PathBuf>> {
        for dir in [self.processed_dir(), self.error_dir()] {
            if let Err(e) = fs::create_dir_all(&dir) {
                let err = Error::directory(&dir, e);
                error!("{err}");
                log_terminated(Stage::Transform);
                return Err(err);
            }
        }

        let files = match list_matching_files(&self.input_dir) {
            Ok(files) => files,
            Err(e) => {
                error!("{e}");
                log_terminated(Stage::Transform);
                return Err(e);
            }
        };

        if files.is_empty() {
            warn!("No Parquet files found in {}", self.input_dir.display());
            log_completed(Stage::Transform);
            return Ok(Vec::new());
        }

        info!(
            "Found {} Parquet files in {}",
            files.len(),
            self.input_dir.display()
        );

        let mut transformed = Vec::with_capacity(files.len());
        for file in &files {
            match self.transform_file(file) {
                Ok(output) => {
                    info!("Transformed file saved to: {}", output.display());
                    transformed.push(output);
                }
                Err(e) => {
                    error!("Failed to process {}: {e}", file.display());
                    if let Err(e) = self.quarantine(file) {
                        error!("{e}");
                        log_terminated(Stage::Transform);
                        return Err(e);
                    }
                }
            }
        }

        info!(
            "All transformations complete ({} of {} files)",
            transformed.len(),
            files.len()
        );
        log_completed(Stage::Transform);
        Ok(transformed)
    }

    fn transform_file(&self, input: &Path) -> Result<PathBuf> {
        info!("Reading file: {}", input.display());
        let table = Table::read_parquet(input)?;

        info!("Starting data transformation");
        let table = normalize(table)?;
        info!("Transformation complete ({} rows)", table.num_rows());

        let output = self.processed_dir().join(transformed_file_name(input)?);
        if let Err(e) = table.write_parquet(&output) {
            if output.exists() {
                if let Err(rm) = fs::remove_file(&output) {
                    warn!("Failed to remove partial file {}: {rm}", output.display());
                }
            }
            return Err(e);
        }

        Ok(output)
    }

    fn quarantine(&self, input: &Path) -> Result<PathBuf> {
        let error_dir = self.error_dir();
        fs::create_dir_all(&error_dir).map_err(|e| Error::directory(&error_dir, e))?;

        let name = input
            .file_name()
            .ok_or_else(|| Error::transform(format!("Not a file: {}", input.display())))?;
        let destination = error_dir.join(name);
        fs::rename(input, &destination).map_err(|e| Error::directory(&error_dir, e))?;

        info!("Moved failed file to: {}", destination.display());
        Ok(destination)
    }
}
