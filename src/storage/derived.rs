//! Derived tables on disk.
//!
//! One row per frame. Per-frame columns are non-nullable:
//! `fr_num` (UInt32), `time_s`, `x_cntr_pix`, `y_cntr_pix`, `x_armK_pix`, `y_armK_pix`
//! (Float64, K = 1..5), `armK_id` (UInt8), `head_rad`, `spd_pixs`, `displ_pix` (Float64).
//!
//! The displacement heading is shorter than the sequence, so `t_head_disp` and
//! `head_disp_rad` are nullable and null past their length.
use std::sync::Arc;

use arrow_array::{ArrayRef, Float64Array, RecordBatch, UInt32Array, UInt8Array};
use arrow_schema::{DataType, Field, Schema};
use camino::Utf8Path;

use super::{open_projected, require_non_null, typed_column, write_batch};
use crate::constants::N_ARMS;
use crate::geotaxis_errors::GeotaxisError;
use crate::kinematics::DerivedTable;

fn arm_column(axis: &str, slot: usize) -> String {
    format!("{axis}_arm{}_pix", slot + 1)
}

fn arm_id_column(slot: usize) -> String {
    format!("arm{}_id", slot + 1)
}

/// Column names in file order.
pub fn derived_columns() -> Vec<String> {
    let mut names: Vec<String> = ["fr_num", "time_s", "x_cntr_pix", "y_cntr_pix"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for slot in 0..N_ARMS {
        names.push(arm_column("x", slot));
        names.push(arm_column("y", slot));
    }
    names.extend((0..N_ARMS).map(arm_id_column));
    names.extend(
        ["head_rad", "spd_pixs", "displ_pix", "t_head_disp", "head_disp_rad"]
            .iter()
            .map(|s| s.to_string()),
    );
    names
}

fn derived_schema() -> Arc<Schema> {
    let fields: Vec<Field> = derived_columns()
        .into_iter()
        .map(|name| {
            let (data_type, nullable) = match name.as_str() {
                "fr_num" => (DataType::UInt32, false),
                "t_head_disp" | "head_disp_rad" => (DataType::Float64, true),
                n if n.ends_with("_id") => (DataType::UInt8, false),
                _ => (DataType::Float64, false),
            };
            Field::new(name, data_type, nullable)
        })
        .collect();
    Arc::new(Schema::new(fields))
}

fn padded(values: &[f64], n: usize) -> Float64Array {
    (0..n).map(|i| values.get(i).copied()).collect()
}

/// Persist `table` to `path`.
pub fn write_derived(table: &DerivedTable, path: &Utf8Path) -> Result<(), GeotaxisError> {
    table.validate()?;
    let n = table.len();

    let f64_col = |v: &[f64]| -> ArrayRef { Arc::new(Float64Array::from(v.to_vec())) };

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(table.fr_num.clone())),
        f64_col(&table.time_s),
        f64_col(&table.x_cntr_pix),
        f64_col(&table.y_cntr_pix),
    ];
    for slot in 0..N_ARMS {
        columns.push(f64_col(&table.x_arm_pix[slot]));
        columns.push(f64_col(&table.y_arm_pix[slot]));
    }
    for slot in 0..N_ARMS {
        let ids: Vec<u8> = table.arm_ids.iter().map(|ids| ids[slot]).collect();
        columns.push(Arc::new(UInt8Array::from(ids)));
    }
    columns.push(f64_col(&table.head_rad));
    columns.push(f64_col(&table.spd_pixs));
    columns.push(f64_col(&table.displ_pix));
    columns.push(Arc::new(padded(&table.t_head_disp, n)));
    columns.push(Arc::new(padded(&table.head_disp_rad, n)));

    let schema = derived_schema();
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    write_batch(path, schema, &batch)
}

fn extend_f64(
    target: &mut Vec<f64>,
    batch: &RecordBatch,
    name: &str,
) -> Result<(), GeotaxisError> {
    let col = typed_column::<Float64Array>(batch, name)?;
    require_non_null(col, name)?;
    target.extend_from_slice(col.values());
    Ok(())
}

/// Load a derived table written by [`write_derived`].
pub fn read_derived(path: &Utf8Path) -> Result<DerivedTable, GeotaxisError> {
    let names = derived_columns();
    let projection: Vec<&str> = names.iter().map(String::as_str).collect();
    let reader = open_projected(path, &projection)?;

    let mut table = DerivedTable::default();
    for maybe_batch in reader {
        let batch = maybe_batch?;

        let fr_num = typed_column::<UInt32Array>(&batch, "fr_num")?;
        require_non_null(fr_num, "fr_num")?;
        table.fr_num.extend_from_slice(fr_num.values());

        extend_f64(&mut table.time_s, &batch, "time_s")?;
        extend_f64(&mut table.x_cntr_pix, &batch, "x_cntr_pix")?;
        extend_f64(&mut table.y_cntr_pix, &batch, "y_cntr_pix")?;
        for slot in 0..N_ARMS {
            extend_f64(&mut table.x_arm_pix[slot], &batch, &arm_column("x", slot))?;
            extend_f64(&mut table.y_arm_pix[slot], &batch, &arm_column("y", slot))?;
        }

        let mut id_columns: Vec<&UInt8Array> = Vec::with_capacity(N_ARMS);
        for slot in 0..N_ARMS {
            let name = arm_id_column(slot);
            let col = typed_column::<UInt8Array>(&batch, &name)?;
            require_non_null(col, &name)?;
            id_columns.push(col);
        }
        for row in 0..batch.num_rows() {
            table
                .arm_ids
                .push(std::array::from_fn(|slot| id_columns[slot].value(row)));
        }

        extend_f64(&mut table.head_rad, &batch, "head_rad")?;
        extend_f64(&mut table.spd_pixs, &batch, "spd_pixs")?;
        extend_f64(&mut table.displ_pix, &batch, "displ_pix")?;

        let t_head = typed_column::<Float64Array>(&batch, "t_head_disp")?;
        let head_disp = typed_column::<Float64Array>(&batch, "head_disp_rad")?;
        table.t_head_disp.extend(t_head.iter().flatten());
        table.head_disp_rad.extend(head_disp.iter().flatten());
    }

    table.validate()?;
    Ok(table)
}
