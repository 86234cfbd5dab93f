//! # Track normalizer
//!
//! Reshapes a [`RawCoordinateFrame`] into a [`RefinedTable`]: one repaired, orientation-
//! corrected, time-stamped track per requested landmark.
//!
//! For every `(body_part, part_index)`:
//!
//! 1. extract raw `x`/`y`,
//! 2. run [`fix_outlier_track`] with the configured quantile (`0.05` by default),
//! 3. flip vertically: `y' = |y_height − y|` (camera orientations differ between sessions;
//!    `y_height = 0` leaves `y` unchanged),
//! 4. stamp every frame with `time_s = frame / frame_rate`.
//!
//! Any failure (missing landmark, too many outliers) aborts the whole sequence.
use tracing::debug;

use super::outliers::fix_outlier_track;
use super::{RefinedTable, RefinedTrack};
use crate::constants::{Pixel, Seconds};
use crate::geotaxis_errors::GeotaxisError;
use crate::landmarks::{BodyPart, LandmarkKey};
use crate::params::RefineParams;
use crate::raw::RawCoordinateFrame;

/// Build the refined table of one sequence.
///
/// Arguments
/// -----------------
/// * `raw` – Raw coordinates of the sequence.
/// * `body_parts` – Landmark categories to extract (e.g. `arm`, `chip`).
/// * `part_indices` – 1-based landmark indices to extract for every category.
/// * `y_height` – Flip height in pixels (`0` for no flip).
/// * `frame_rate` – Frames per second, used for `time_s`.
/// * `quantile` – Outlier fence quantile.
///
/// Return
/// ----------
/// * A [`RefinedTable`] holding `|body_parts| × |part_indices|` landmarks, each covering
///   every frame of `raw`.
pub fn refine_data(
    raw: &RawCoordinateFrame,
    body_parts: &[BodyPart],
    part_indices: &[u8],
    y_height: Pixel,
    frame_rate: f64,
    quantile: f64,
) -> Result<RefinedTable, GeotaxisError> {
    let frames = raw.frames().to_vec();
    let time_s: Vec<Seconds> = frames.iter().map(|&f| f as f64 / frame_rate).collect();

    let mut table = RefinedTable::new();
    for &body_part in body_parts {
        for &part_index in part_indices {
            let key = LandmarkKey::new(body_part, part_index);
            let (x, y) = raw.landmark_xy(&key)?;

            let repaired = fix_outlier_track(&frames, x, y, quantile)?;
            if !repaired.repaired.is_empty() {
                debug!(
                    landmark = %key,
                    points = ?repaired.repaired,
                    "repaired outlying coordinates"
                );
            }

            let y_flipped: Vec<Pixel> = repaired.y.iter().map(|v| (y_height - v).abs()).collect();
            let track = RefinedTrack::new(frames.clone(), time_s.clone(), repaired.x, y_flipped)?;
            table.insert(key, track);
        }
    }

    Ok(table)
}

/// [`refine_data`] driven by [`RefineParams`].
pub fn refine_with_params(
    raw: &RawCoordinateFrame,
    y_height: Pixel,
    params: &RefineParams,
) -> Result<RefinedTable, GeotaxisError> {
    refine_data(
        raw,
        &params.body_parts,
        &params.part_indices,
        y_height,
        params.frame_rate,
        params.outlier_quantile,
    )
}
