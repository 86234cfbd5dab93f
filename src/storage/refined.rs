//! Refined tables on disk.
//!
//! | column      | type    | content                         |
//! |-------------|---------|---------------------------------|
//! | `body_pos`  | Utf8    | body-part category (`arm`, …)   |
//! | `arm_num`   | UInt8   | 1-based landmark index          |
//! | `dim`       | Utf8    | `x` or `y`                      |
//! | `fr_num`    | UInt32  | frame number                    |
//! | `time_s`    | Float64 | `fr_num / frame_rate`           |
//! | `coord_pix` | Float64 | coordinate in pixels            |
use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, RecordBatch, StringArray, UInt32Array, UInt8Array};
use arrow_schema::{DataType, Field, Schema};
use camino::Utf8Path;

use super::{open_projected, require_non_null, typed_column, write_batch};
use crate::geotaxis_errors::GeotaxisError;
use crate::tracks::{RefinedRow, RefinedTable};

const COLUMNS: [&str; 6] = ["body_pos", "arm_num", "dim", "fr_num", "time_s", "coord_pix"];

fn refined_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("body_pos", DataType::Utf8, false),
        Field::new("arm_num", DataType::UInt8, false),
        Field::new("dim", DataType::Utf8, false),
        Field::new("fr_num", DataType::UInt32, false),
        Field::new("time_s", DataType::Float64, false),
        Field::new("coord_pix", DataType::Float64, false),
    ]))
}

/// Persist `table` to `path` in long format.
pub fn write_refined(table: &RefinedTable, path: &Utf8Path) -> Result<(), GeotaxisError> {
    let n = table.n_rows();
    let mut body_pos = Vec::with_capacity(n);
    let mut arm_num = Vec::with_capacity(n);
    let mut dim = Vec::with_capacity(n);
    let mut fr_num = Vec::with_capacity(n);
    let mut time_s = Vec::with_capacity(n);
    let mut coord_pix = Vec::with_capacity(n);

    for row in table.rows() {
        body_pos.push(row.body_part.as_str());
        arm_num.push(row.part_index);
        dim.push(row.dim.as_str());
        fr_num.push(row.frame);
        time_s.push(row.time_s);
        coord_pix.push(row.coord_pix);
    }

    let schema = refined_schema();
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(body_pos)),
        Arc::new(UInt8Array::from(arm_num)),
        Arc::new(StringArray::from(dim)),
        Arc::new(UInt32Array::from(fr_num)),
        Arc::new(Float64Array::from(time_s)),
        Arc::new(Float64Array::from(coord_pix)),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    write_batch(path, schema, &batch)
}

/// Load a refined table written by [`write_refined`].
///
/// Rows may come in any order; every landmark must have both x and y rows, checked while rebuilding
/// the table ([`GeotaxisError::IncompleteTrack`] otherwise).
pub fn read_refined(path: &Utf8Path) -> Result<RefinedTable, GeotaxisError> {
    let reader = open_projected(path, &COLUMNS)?;

    let mut rows: Vec<RefinedRow> = Vec::new();
    for maybe_batch in reader {
        let batch = maybe_batch?;

        let body_pos = typed_column::<StringArray>(&batch, "body_pos")?;
        let arm_num = typed_column::<UInt8Array>(&batch, "arm_num")?;
        let dim = typed_column::<StringArray>(&batch, "dim")?;
        let fr_num = typed_column::<UInt32Array>(&batch, "fr_num")?;
        let time_s = typed_column::<Float64Array>(&batch, "time_s")?;
        let coord_pix = typed_column::<Float64Array>(&batch, "coord_pix")?;

        require_non_null(body_pos, "body_pos")?;
        require_non_null(arm_num, "arm_num")?;
        require_non_null(dim, "dim")?;
        require_non_null(fr_num, "fr_num")?;
        require_non_null(time_s, "time_s")?;
        require_non_null(coord_pix, "coord_pix")?;

        rows.reserve(batch.num_rows());
        for i in 0..batch.num_rows() {
            rows.push(RefinedRow {
                body_part: body_pos.value(i).parse()?,
                part_index: arm_num.value(i),
                dim: dim.value(i).parse()?,
                frame: fr_num.value(i),
                time_s: time_s.value(i),
                coord_pix: coord_pix.value(i),
            });
        }
    }

    RefinedTable::from_rows(rows)
}
