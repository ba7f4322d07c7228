//! Schema unification
//!
//! Monthly trip files drift: columns get added, and a column can be
//! integer in one month and float in the next. Files are combined by
//! column name, widening types where they disagree.

use crate::error::{Error, Result};
use arrow::array::{new_null_array, ArrayRef};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use std::sync::Arc;

/// Unify schemas by column name
///
/// Columns appear in order of first appearance. A column missing from any
/// schema becomes nullable. Conflicting types are merged with
/// [`merge_types`]. Schema-level metadata is dropped since it describes
/// the individual source files.
pub fn unify_schemas(schemas: &[SchemaRef]) -> Schema {
    let mut fields: Vec<Field> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut seen_in: Vec<usize> = Vec::new();

    for schema in schemas {
        for field in schema.fields() {
            match positions.get(field.name()) {
                Some(&idx) => {
                    let existing = &fields[idx];
                    let merged_type = merge_types(existing.data_type(), field.data_type());
                    let nullable = existing.is_nullable() || field.is_nullable();
                    fields[idx] = existing
                        .clone()
                        .with_data_type(merged_type)
                        .with_nullable(nullable);
                    seen_in[idx] += 1;
                }
                None => {
                    positions.insert(field.name().clone(), fields.len());
                    fields.push(field.as_ref().clone());
                    seen_in.push(1);
                }
            }
        }
    }

    // Columns not present everywhere are null-filled
    let fields: Vec<Field> = fields
        .into_iter()
        .zip(seen_in)
        .map(|(field, seen)| {
            if seen < schemas.len() {
                field.with_nullable(true)
            } else {
                field
            }
        })
        .collect();

    Schema::new(fields)
}

/// Reshape a batch to `target`
///
/// Columns are looked up by name, cast when their type differs, and
/// filled with nulls when absent.
pub fn align_batch(batch: &RecordBatch, target: &SchemaRef) -> Result<RecordBatch> {
    let source = batch.schema();
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(target.fields().len());

    for field in target.fields() {
        let column = match source.index_of(field.name()) {
            Ok(idx) => {
                let column = batch.column(idx);
                if column.data_type() == field.data_type() {
                    column.clone()
                } else {
                    cast(column, field.data_type())?
                }
            }
            Err(_) => new_null_array(field.data_type(), batch.num_rows()),
        };
        columns.push(column);
    }

    RecordBatch::try_new(target.clone(), columns).map_err(|e| Error::Output {
        message: format!("Failed to align RecordBatch: {e}"),
    })
}

/// Merge two data types into a compatible type
pub fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        // Same types
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        // Integers widen to Int64
        (a, b) if a.is_integer() && b.is_integer() => DataType::Int64,

        // Mixed numbers become Float64
        (a, b) if a.is_numeric() && b.is_numeric() => DataType::Float64,

        // Timestamps keep the finer unit; the zone survives only if both agree
        (DataType::Timestamp(u1, tz1), DataType::Timestamp(u2, tz2)) => {
            let tz = if tz1 == tz2 { tz1.clone() } else { None };
            DataType::Timestamp(finer_unit(*u1, *u2), tz)
        }

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

fn finer_unit(a: TimeUnit, b: TimeUnit) -> TimeUnit {
    fn rank(unit: TimeUnit) -> u8 {
        match unit {
            TimeUnit::Second => 0,
            TimeUnit::Millisecond => 1,
            TimeUnit::Microsecond => 2,
            TimeUnit::Nanosecond => 3,
        }
    }
    if rank(a) >= rank(b) {
        a
    } else {
        b
    }
}
