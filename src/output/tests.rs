//! Tests for output module

use super::*;
use arrow::array::{Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::array::{TimestampMicrosecondArray, TimestampNanosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::basic::Compression;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::sync::Arc;
use tempfile::tempdir;

fn id_name_batch(ids: &[i64], names: &[Option<&str>]) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(ids.to_vec())),
            Arc::new(StringArray::from(names.to_vec())),
        ],
    )
    .unwrap()
}

fn ids(table: &Table) -> Vec<i64> {
    table
        .batches()
        .iter()
        .flat_map(|b| {
            let col = b
                .column_by_name("id")
                .unwrap()
                .as_any()
                .downcast_ref::<Int64Array>()
                .unwrap();
            col.iter().map(|v| v.unwrap()).collect::<Vec<_>>()
        })
        .collect()
}

// ============================================================================
// Type Merge Tests
// ============================================================================

#[test]
fn test_merge_types() {
    assert_eq!(
        merge_types(&DataType::Int64, &DataType::Int64),
        DataType::Int64
    );
    assert_eq!(
        merge_types(&DataType::Null, &DataType::Utf8),
        DataType::Utf8
    );
    assert_eq!(
        merge_types(&DataType::Int32, &DataType::Int64),
        DataType::Int64
    );
    assert_eq!(
        merge_types(&DataType::Int64, &DataType::Float64),
        DataType::Float64
    );
    assert_eq!(
        merge_types(&DataType::Boolean, &DataType::Int64),
        DataType::Utf8
    );
}

#[test]
fn test_merge_types_timestamps() {
    let micros = DataType::Timestamp(TimeUnit::Microsecond, None);
    let nanos = DataType::Timestamp(TimeUnit::Nanosecond, None);
    assert_eq!(merge_types(&micros, &nanos), nanos);
    assert_eq!(merge_types(&nanos, &micros), nanos);

    let utc_ms = DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()));
    let utc_s = DataType::Timestamp(TimeUnit::Second, Some("UTC".into()));
    assert_eq!(merge_types(&utc_ms, &utc_s), utc_ms);

    let ny_us = DataType::Timestamp(TimeUnit::Microsecond, Some("America/New_York".into()));
    assert_eq!(
        merge_types(&utc_ms, &ny_us),
        DataType::Timestamp(TimeUnit::Microsecond, None)
    );
}

// ============================================================================
// Schema Unification Tests
// ============================================================================

#[test]
fn test_unify_schemas_keeps_first_appearance_order() {
    let s1 = Arc::new(Schema::new(vec![
        Field::new("b", DataType::Int64, false),
        Field::new("a", DataType::Utf8, false),
    ]));
    let s2 = Arc::new(Schema::new(vec![
        Field::new("a", DataType::Utf8, false),
        Field::new("c", DataType::Float64, false),
    ]));

    let unified = unify_schemas(&[s1, s2]);
    let names: Vec<&str> = unified.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, vec!["b", "a", "c"]);

    // Present in both: keeps nullability; missing from one: nullable
    assert!(!unified.field_with_name("a").unwrap().is_nullable());
    assert!(unified.field_with_name("b").unwrap().is_nullable());
    assert!(unified.field_with_name("c").unwrap().is_nullable());
}

#[test]
fn test_unify_schemas_type_promotion() {
    let s1 = Arc::new(Schema::new(vec![Field::new("fare", DataType::Int32, true)]));
    let s2 = Arc::new(Schema::new(vec![Field::new("fare", DataType::Float64, true)]));

    let unified = unify_schemas(&[s1, s2]);
    assert_eq!(
        unified.field_with_name("fare").unwrap().data_type(),
        &DataType::Float64
    );
}

#[test]
fn test_align_batch_casts_and_fills_nulls() {
    let batch = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("fare", DataType::Int32, true)])),
        vec![Arc::new(Int32Array::from(vec![10, 20]))],
    )
    .unwrap();
    let target = Arc::new(Schema::new(vec![
        Field::new("fare", DataType::Float64, true),
        Field::new("tip", DataType::Float64, true),
    ]));

    let aligned = align_batch(&batch, &target).unwrap();
    let fare = aligned
        .column(0)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(fare.value(1), 20.0);
    assert_eq!(aligned.column(1).null_count(), 2);
}

// ============================================================================
// Table Tests
// ============================================================================

#[test]
fn test_table_concat_preserves_order() {
    let t1 = Table::from_batches(vec![id_name_batch(&[1, 2], &[Some("a"), Some("b")])]).unwrap();
    let t2 = Table::from_batches(vec![
        id_name_batch(&[3], &[None]),
        id_name_batch(&[4], &[Some("d")]),
    ])
    .unwrap();

    let combined = Table::concat(vec![t1, t2]).unwrap();
    assert_eq!(combined.num_rows(), 4);
    assert_eq!(ids(&combined), vec![1, 2, 3, 4]);
    assert_eq!(combined.column_names(), vec!["id", "name"]);
}

#[test]
fn test_table_concat_drifted_schemas() {
    let t1 = Table::from_batches(vec![id_name_batch(&[1], &[Some("a")])]).unwrap();
    let extra = RecordBatch::try_new(
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("congestion_surcharge", DataType::Float64, true),
        ])),
        vec![
            Arc::new(Int64Array::from(vec![2])),
            Arc::new(Float64Array::from(vec![2.5])),
        ],
    )
    .unwrap();
    let t2 = Table::from_batches(vec![extra]).unwrap();

    let combined = Table::concat(vec![t1, t2]).unwrap();
    assert_eq!(
        combined.column_names(),
        vec!["id", "name", "congestion_surcharge"]
    );
    assert_eq!(combined.batches()[0].column(2).null_count(), 1);
    assert_eq!(combined.batches()[1].column(1).null_count(), 1);
}

#[test]
fn test_table_concat_mixed_timestamp_units() {
    let micros = Arc::new(Schema::new(vec![Field::new(
        "pickup",
        DataType::Timestamp(TimeUnit::Microsecond, None),
        true,
    )]));
    let nanos = Arc::new(Schema::new(vec![Field::new(
        "pickup",
        DataType::Timestamp(TimeUnit::Nanosecond, None),
        true,
    )]));
    let may = RecordBatch::try_new(
        micros,
        vec![Arc::new(TimestampMicrosecondArray::from(vec![Some(1_000), None]))],
    )
    .unwrap();
    let june = RecordBatch::try_new(
        nanos,
        vec![Arc::new(TimestampNanosecondArray::from(vec![Some(5_000)]))],
    )
    .unwrap();

    let combined = Table::concat(vec![
        Table::from_batches(vec![may]).unwrap(),
        Table::from_batches(vec![june]).unwrap(),
    ])
    .unwrap();

    assert_eq!(
        combined.schema().field(0).data_type(),
        &DataType::Timestamp(TimeUnit::Nanosecond, None)
    );
    let values: Vec<Option<i64>> = combined
        .batches()
        .iter()
        .flat_map(|b| {
            b.column(0)
                .as_any()
                .downcast_ref::<TimestampNanosecondArray>()
                .unwrap()
                .iter()
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(values, vec![Some(1_000_000), None, Some(5_000)]);
}

#[test]
fn test_table_concat_empty_error() {
    assert!(Table::concat(vec![]).is_err());
}

#[test]
fn test_table_try_new_schema_mismatch() {
    let batch = id_name_batch(&[1], &[None]);
    let other = Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, true)]));
    assert!(Table::try_new(other, vec![batch]).is_err());
}

#[test]
fn test_table_write_read_snappy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trips.parquet");

    let table = Table::from_batches(vec![id_name_batch(&[1, 2, 3], &[Some("a"), None, Some("c")])])
        .unwrap();
    let rows = table.write_parquet(&path).unwrap();
    assert_eq!(rows, 3);

    let reader = SerializedFileReader::new(std::fs::File::open(&path).unwrap()).unwrap();
    let column = reader.metadata().row_group(0).column(0).clone();
    assert_eq!(column.compression(), Compression::SNAPPY);

    let read = Table::read_parquet(&path).unwrap();
    assert_eq!(read.num_rows(), 3);
    assert_eq!(ids(&read), vec![1, 2, 3]);
}

#[test]
fn test_table_write_without_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.parquet");
    let schema = id_name_batch(&[], &[]).schema();

    let table = Table::try_new(schema, vec![]).unwrap();
    assert_eq!(table.write_parquet(&path).unwrap(), 0);

    let read = Table::read_parquet(&path).unwrap();
    assert_eq!(read.num_rows(), 0);
    assert_eq!(read.column_names(), vec!["id", "name"]);
}

#[test]
fn test_table_from_parquet_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("buf.parquet");
    Table::from_batches(vec![id_name_batch(&[7], &[Some("x")])])
        .unwrap()
        .write_parquet(&path)
        .unwrap();

    let bytes = Bytes::from(std::fs::read(&path).unwrap());
    let table = Table::from_parquet_bytes(bytes).unwrap();
    assert_eq!(ids(&table), vec![7]);
}

#[test]
fn test_table_from_invalid_bytes() {
    let result = Table::from_parquet_bytes(Bytes::from_static(b"definitely not parquet"));
    assert!(result.is_err());
}

#[test]
fn test_table_write_missing_dir() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing/out.parquet");

    let table = Table::from_batches(vec![id_name_batch(&[1], &[None])]).unwrap();
    let err = table.write_parquet(&path).unwrap_err();
    assert!(err.to_string().contains("missing/out.parquet"));
    assert!(!path.exists());
}
