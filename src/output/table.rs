//! In-memory tables
//!
//! A [`Table`] is an Arrow schema plus the record batches that share it.
//! It is what every stage reads, reshapes and writes.

use super::schema::{align_batch, unify_schemas};
use crate::error::{Error, Result};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::ChunkReader;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// A tabular dataset held in memory
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    /// Create a table, checking every batch carries `schema`
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        if let Some(batch) = batches.iter().find(|b| b.schema() != schema) {
            return Err(Error::output(format!(
                "Batch schema does not match table schema: {:?}",
                batch.schema()
            )));
        }
        Ok(Self { schema, batches })
    }

    /// Create a table from batches, taking the schema of the first
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let schema = batches
            .first()
            .map(RecordBatch::schema)
            .ok_or_else(|| Error::output("No batches to build a table from"))?;
        Self::try_new(schema, batches)
    }

    /// Read a Parquet file
    pub fn read_parquet(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Decode a Parquet file held in memory
    pub fn from_parquet_bytes(bytes: Bytes) -> Result<Self> {
        Self::from_reader(bytes)
    }

    fn from_reader<R: ChunkReader + 'static>(reader: R) -> Result<Self> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let schema = builder.schema().clone();
        let reader = builder.build()?;

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch?);
        }

        Ok(Self { schema, batches })
    }

    /// Concatenate tables in order
    ///
    /// Schemas are unified by column name, see [`unify_schemas`].
    pub fn concat(tables: Vec<Table>) -> Result<Self> {
        if tables.is_empty() {
            return Err(Error::output("No tables to combine"));
        }

        let schemas: Vec<SchemaRef> = tables.iter().map(|t| t.schema.clone()).collect();
        let schema = Arc::new(unify_schemas(&schemas));

        let mut batches = Vec::new();
        for table in tables {
            for batch in &table.batches {
                batches.push(align_batch(batch, &schema)?);
            }
        }

        Ok(Self { schema, batches })
    }

    /// Write a Snappy-compressed Parquet file, returning the row count
    ///
    /// A table without rows still produces a valid file carrying its schema.
    /// An existing file at `path` is truncated.
    pub fn write_parquet(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|e| Error::output(format!("Failed to create {}: {e}", path.display())))?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, self.schema.clone(), Some(props))?;
        for batch in &self.batches {
            writer.write(batch)?;
        }
        writer.close()?;

        Ok(self.num_rows())
    }

    /// The table schema
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// The record batches, in row order
    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    /// Consume the table into its parts
    pub fn into_parts(self) -> (SchemaRef, Vec<RecordBatch>) {
        (self.schema, self.batches)
    }

    /// Total number of rows
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    /// Column names in schema order
    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }
}
