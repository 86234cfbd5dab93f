//! # Parquet persistence
//!
//! Refined and derived tables are stored as Parquet files, one per sequence:
//!
//! * [`refined`] – long-format landmark coordinates
//!   (`body_pos`, `arm_num`, `dim`, `fr_num`, `time_s`, `coord_pix`),
//! * [`derived`] – one row per frame of [`DerivedTable`](crate::kinematics::DerivedTable).
//!
//! ## Writing
//! -----------------
//! Tables are fully built in memory, written to a sibling `*.tmp` file and renamed into
//! place, so an interrupted run never leaves a truncated output behind.
//!
//! ## Reading
//! -----------------
//! Readers project only the columns they need and fail with an [`ArrowError::SchemaError`]
//! (wrapped in [`GeotaxisError::Arrow`]) when a column is absent or has the wrong type.
use std::fs::{self, File};
use std::sync::Arc;

use arrow_array::{Array, RecordBatch};
use arrow_schema::{ArrowError, Schema};
use camino::{Utf8Path, Utf8PathBuf};
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::arrow::{ArrowWriter, ProjectionMask};

use crate::geotaxis_errors::GeotaxisError;

pub mod derived;
pub mod refined;

pub use derived::{read_derived, write_derived};
pub use refined::{read_refined, write_refined};

/// Rows per record batch when reading.
pub const READ_BATCH_SIZE: usize = 8192;

/// Open `path` for reading, restricted to `columns`.
pub(crate) fn open_projected(
    path: &Utf8Path,
    columns: &[&str],
) -> Result<ParquetRecordBatchReader, GeotaxisError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema_descr = builder.metadata().file_metadata().schema_descr();
    let all_fields = schema_descr.columns();
    let projection_indices = columns
        .iter()
        .map(|name| {
            all_fields
                .iter()
                .position(|f| f.name() == *name)
                .ok_or_else(|| {
                    ArrowError::SchemaError(format!("column '{name}' not found in {path}"))
                })
        })
        .collect::<Result<Vec<usize>, ArrowError>>()?;

    let mask = ProjectionMask::leaves(schema_descr, projection_indices);
    let reader = builder
        .with_projection(mask)
        .with_batch_size(READ_BATCH_SIZE)
        .build()?;
    Ok(reader)
}

/// Column `name` of `batch`, downcast to the concrete array type `T`.
pub(crate) fn typed_column<'a, T: Array + 'static>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a T, GeotaxisError> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| ArrowError::SchemaError(format!("missing column '{name}'")))?;
    column.as_any().downcast_ref::<T>().ok_or_else(|| {
        GeotaxisError::Arrow(ArrowError::SchemaError(format!(
            "column '{name}' has type {}",
            column.data_type()
        )))
    })
}

/// Fail on a null cell in a column declared non-nullable.
pub(crate) fn require_non_null(array: &dyn Array, name: &str) -> Result<(), GeotaxisError> {
    if array.null_count() > 0 {
        Err(GeotaxisError::Arrow(ArrowError::InvalidArgumentError(
            format!("column '{name}' holds {} null values", array.null_count()),
        )))
    } else {
        Ok(())
    }
}

fn temp_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut name = path.file_name().unwrap_or("table").to_string();
    name.push_str(".tmp");
    path.with_file_name(name)
}

/// Write a single record batch to `path`, replacing any previous file.
pub(crate) fn write_batch(
    path: &Utf8Path,
    schema: Arc<Schema>,
    batch: &RecordBatch,
) -> Result<(), GeotaxisError> {
    let tmp = temp_path(path);
    let result = (|| -> Result<(), GeotaxisError> {
        let file = File::create(&tmp)?;
        let mut writer = ArrowWriter::try_new(file, schema, None)?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            fs::rename(&tmp, path)?;
            Ok(())
        }
        Err(e) => {
            // the write error is reported, not the cleanup one
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}
