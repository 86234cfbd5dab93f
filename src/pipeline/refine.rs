//! # Refinement pipeline
//!
//! Raw DeepLabCut exports → refined Parquet tables, one sequence at a time:
//!
//! 1. parse `(date, sequence)` from the file name ([`SequenceId::from_raw_name`]),
//! 2. look the pair up in the catalog (exactly one row, else
//!    [`GeotaxisError::CatalogMatch`]),
//! 3. flip height = ROI height when the catalog orientation is `0`, else `0`,
//! 4. read the export and run the [track normalizer](crate::tracks::normalizer),
//! 5. write `<date>_<seq:02>_refined.parquet` into the output directory.
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use super::{ensure_dir, list_inputs, run_batch, BatchOutcome, SequenceId};
use crate::catalog::CatalogLookup;
use crate::geotaxis_errors::GeotaxisError;
use crate::params::RefineParams;
use crate::raw::RawCoordinateFrame;
use crate::storage::write_refined;
use crate::tracks::normalizer::refine_with_params;

/// Refine a single raw export into `out_dir`.
///
/// Arguments
/// -----------------
/// * `raw_path` – DeepLabCut CSV export.
/// * `out_dir` – Destination directory (must exist).
/// * `catalog` – Sequence metadata source.
/// * `params` – Refinement parameters.
///
/// Return
/// ----------
/// * Path of the written refined table.
pub fn refine_file<C: CatalogLookup + ?Sized>(
    raw_path: &Utf8Path,
    out_dir: &Utf8Path,
    catalog: &C,
    params: &RefineParams,
) -> Result<Utf8PathBuf, GeotaxisError> {
    let name = raw_path
        .file_name()
        .ok_or_else(|| GeotaxisError::InvalidFileName(raw_path.to_string()))?;
    let id = SequenceId::from_raw_name(name)?;

    let entry = catalog.lookup(&id.date, id.sequence)?;
    let y_height = entry.flip_height()?;
    debug!(sequence = %id, y_height, "catalog entry resolved");

    let raw = RawCoordinateFrame::from_dlc_csv(raw_path)?;
    let table = refine_with_params(&raw, y_height, params)?;

    let out = out_dir.join(id.refined_file_name());
    write_refined(&table, &out)?;
    info!(
        sequence = %id,
        frames = raw.n_frames(),
        landmarks = table.number_of_landmarks(),
        output = %out,
        "refined table written"
    );
    Ok(out)
}

/// Refine every raw export of `raw_dir` whose name ends with `params.raw_suffix`.
///
/// Return
/// ----------
/// * `Err(GeotaxisError::InputPath)` if `raw_dir` is missing or holds no matching file.
/// * With [`BatchPolicy::FailFast`](crate::params::BatchPolicy::FailFast) the first failure
///   is returned as is; with `Continue` failures are collected in the [`BatchOutcome`].
pub fn refine_all<C: CatalogLookup + ?Sized>(
    raw_dir: &Utf8Path,
    out_dir: &Utf8Path,
    catalog: &C,
    params: &RefineParams,
) -> Result<BatchOutcome, GeotaxisError> {
    let inputs = list_inputs(raw_dir, &params.raw_suffix)?;
    ensure_dir(out_dir)?;
    info!(files = inputs.len(), %raw_dir, %out_dir, %params, "refinement started");

    let outcome = run_batch("refine", inputs, params.batch_policy, |path| {
        refine_file(path, out_dir, catalog, params)
    })?;
    info!(%outcome, "refinement finished");
    Ok(outcome)
}
