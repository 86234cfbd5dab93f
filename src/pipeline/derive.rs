//! # Derivation pipeline
//!
//! Refined Parquet tables → derived Parquet tables. Each file is loaded, passed through the
//! [kinematic derivation engine](crate::kinematics) and written as
//! `<first 13 characters of the name>_derived.parquet`.
use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use super::{derived_file_name, ensure_dir, list_inputs, run_batch, BatchOutcome};
use crate::geotaxis_errors::GeotaxisError;
use crate::kinematics::derive_data;
use crate::params::DeriveParams;
use crate::storage::{read_refined, write_derived};

/// Derive a single refined table into `out_dir`.
///
/// Return
/// ----------
/// * Path of the written derived table, or [`GeotaxisError::InvalidFileName`] when the
///   input name is shorter than the 13-character sequence prefix.
pub fn derive_file(
    refined_path: &Utf8Path,
    out_dir: &Utf8Path,
    params: &DeriveParams,
) -> Result<Utf8PathBuf, GeotaxisError> {
    let name = refined_path
        .file_name()
        .ok_or_else(|| GeotaxisError::InvalidFileName(refined_path.to_string()))?;
    let out = out_dir.join(derived_file_name(name)?);

    let refined = read_refined(refined_path)?;
    let derived = derive_data(&refined, params)?;
    write_derived(&derived, &out)?;

    info!(
        input = name,
        frames = derived.len(),
        output = %out,
        "derived table written"
    );
    Ok(out)
}

/// Derive every refined table of `in_dir` whose name ends with `params.refined_suffix`.
pub fn derive_all(
    in_dir: &Utf8Path,
    out_dir: &Utf8Path,
    params: &DeriveParams,
) -> Result<BatchOutcome, GeotaxisError> {
    let inputs = list_inputs(in_dir, &params.refined_suffix)?;
    ensure_dir(out_dir)?;
    info!(files = inputs.len(), %in_dir, %out_dir, %params, "derivation started");

    let outcome = run_batch("derive", inputs, params.batch_policy, |path| {
        derive_file(path, out_dir, params)
    })?;
    info!(%outcome, "derivation finished");
    Ok(outcome)
}
