//! # Outlier repair for 2-D landmark tracks
//!
//! Pose estimators occasionally snap a landmark onto a wrong feature for a single frame.
//! Such glitches show up as isolated, abnormally large **frame-to-frame displacements**.
//! This module detects them with Tukey fences on the displacement distribution and
//! repairs the offending point by linear extrapolation (track ends) or interpolation
//! (interior).
//!
//! ## Algorithm
//! -----------------
//! 1. `disp[i] = hypot(x[i+1] − x[i], y[i+1] − y[i])`, `N − 1` values for `N` points.
//! 2. `Q1`, `Q3` = percentiles of `disp` at `q` and `1 − q`; `IQR = Q3 − Q1`;
//!    fences `[Q1 − 1.5·IQR, Q3 + 1.5·IQR]`.
//! 3. Displacements at or beyond a fence are outliers. If `IQR = 0` the fences collapse
//!    onto a single value and only values strictly outside are flagged.
//! 4. More than `N/10` outliers rejects the track ([`GeotaxisError::TooManyOutliers`]).
//! 5. Outliers are carried **by index**, in ascending order. Displacement `i` repairs:
//!    * point `0` if `i = 0`: `p[0] = p[1] − (p[2] − p[1])`,
//!    * point `N−1` if `i = N−2`: `p[N−1] = p[N−2] + (p[N−2] − p[N−3])`,
//!    * point `i+1` otherwise, interpolated from its neighbours against frame numbers.
//!
//!    When the neighbouring displacement (`1`, resp. `N−3`) is out of the fences as well,
//!    the glitch sits on point `1` (resp. `N−2`), which is interpolated instead.
//!
//!    A flagged displacement is re-measured before its repair; if an earlier repair already
//!    brought it back inside the fences it is left alone.
//!
//! ## Example
//! -----------------
//! ```rust
//! use geotaxis::tracks::outliers::fix_outlier_coord;
//!
//! let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
//! let mut y: Vec<f64> = (0..40).map(|i| 0.01 * (i * i) as f64).collect();
//! y[20] += 30.0;
//!
//! let repaired = fix_outlier_coord(&x, &y, 0.25).unwrap();
//! assert_eq!(repaired.repaired, vec![20]);
//! assert!((repaired.y[20] - 4.01).abs() < 1e-9);
//! ```
use crate::constants::{FrameNumber, IQR_FENCE, MAX_OUTLIER_FRACTION};
use crate::geotaxis_errors::GeotaxisError;
use crate::numeric::{interp, percentile};
use crate::params::check_quantile;

/// Tukey fences computed on a displacement sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierFences {
    /// Build the fences from `disp` using the `quantile` / `1 − quantile` percentiles.
    ///
    /// Return
    /// ----------
    /// * `None` if `disp` is empty.
    pub fn from_displacements(disp: &[f64], quantile: f64) -> Option<Self> {
        let q1 = percentile(disp, quantile)?;
        let q3 = percentile(disp, 1.0 - quantile)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - IQR_FENCE * iqr,
            upper: q3 + IQR_FENCE * iqr,
        })
    }

    #[inline]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Whether a displacement lies at or beyond a fence.
    #[inline]
    pub fn is_outlier(&self, d: f64) -> bool {
        if self.iqr() > 0.0 {
            d <= self.lower || d >= self.upper
        } else {
            d < self.lower || d > self.upper
        }
    }
}

/// Result of [`fix_outlier_track`].
#[derive(Debug, Clone, PartialEq)]
pub struct RepairedTrack {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Point indices that were rewritten, in repair order.
    pub repaired: Vec<usize>,
}

/// Frame-to-frame Euclidean displacements of a track (`N − 1` values).
pub fn displacements(x: &[f64], y: &[f64]) -> Vec<f64> {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(wx, wy)| (wx[1] - wx[0]).hypot(wy[1] - wy[0]))
        .collect()
}

/// Indices of the displacements flagged by `fences`.
pub fn flag_outliers(disp: &[f64], fences: &OutlierFences) -> Vec<usize> {
    disp.iter()
        .enumerate()
        .filter(|(_, &d)| fences.is_outlier(d))
        .map(|(i, _)| i)
        .collect()
}

/// Repair the point responsible for displacement `disp_index`, in place.
///
/// Arguments
/// -----------------
/// * `frames` – Frame numbers of the track (increasing), used as interpolation abscissae.
/// * `x`, `y` – Coordinates, same length as `frames`, at least 3 points.
/// * `disp_index` – Index of the anomalous displacement, in `0..N−1`.
///
/// Return
/// ----------
/// * `Some(point_index)` – the rewritten point,
/// * `None` – the track is too short (< 3 points) or `disp_index` is out of range.
pub fn repair_displacement(
    frames: &[FrameNumber],
    x: &mut [f64],
    y: &mut [f64],
    disp_index: usize,
) -> Option<usize> {
    let n = x.len();
    if n < 3 || y.len() != n || frames.len() != n || disp_index + 1 >= n {
        return None;
    }

    if disp_index == 0 {
        x[0] = x[1] - (x[2] - x[1]);
        y[0] = y[1] - (y[2] - y[1]);
        Some(0)
    } else if disp_index == n - 2 {
        x[n - 1] = x[n - 2] + (x[n - 2] - x[n - 3]);
        y[n - 1] = y[n - 2] + (y[n - 2] - y[n - 3]);
        Some(n - 1)
    } else {
        interpolate_point(frames, x, y, disp_index + 1)
    }
}

/// Drop interior point `k` and interpolate it back from its neighbours.
fn interpolate_point(
    frames: &[FrameNumber],
    x: &mut [f64],
    y: &mut [f64],
    k: usize,
) -> Option<usize> {
    if k == 0 || k + 1 >= x.len() {
        return None;
    }
    let at = frames[k] as f64;
    let xp = [frames[k - 1] as f64, frames[k + 1] as f64];
    x[k] = interp(at, &xp, &[x[k - 1], x[k + 1]])?;
    y[k] = interp(at, &xp, &[y[k - 1], y[k + 1]])?;
    Some(k)
}

fn step_length(x: &[f64], y: &[f64], i: usize) -> f64 {
    (x[i + 1] - x[i]).hypot(y[i + 1] - y[i])
}

/// Detect and repair outlying jumps of a landmark track.
///
/// Arguments
/// -----------------
/// * `frames` – Frame numbers (increasing), one per point.
/// * `x`, `y` – Pixel coordinates.
/// * `quantile` – Lower percentile of the fences, in `[0, 0.5)` (e.g. `0.25` for quartiles).
///
/// Return
/// ----------
/// * `Ok(RepairedTrack)` – coordinates of identical length and frame alignment.
/// * `Err(GeotaxisError::TooManyOutliers)` – more than 10% of the points are flagged;
///   the input slices are never modified.
/// * `Err(GeotaxisError::LengthMismatch)` / `InvalidParameter` – malformed input.
///
/// Tracks shorter than 3 points are returned unchanged.
pub fn fix_outlier_track(
    frames: &[FrameNumber],
    x: &[f64],
    y: &[f64],
    quantile: f64,
) -> Result<RepairedTrack, GeotaxisError> {
    if x.len() != y.len() {
        return Err(GeotaxisError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if frames.len() != x.len() {
        return Err(GeotaxisError::InvalidParameter(format!(
            "{} frame numbers for {} points",
            frames.len(),
            x.len()
        )));
    }
    check_quantile(quantile)?;

    let n = x.len();
    let mut out = RepairedTrack {
        x: x.to_vec(),
        y: y.to_vec(),
        repaired: Vec::new(),
    };
    if n < 3 {
        return Ok(out);
    }

    let disp = displacements(x, y);
    let Some(fences) = OutlierFences::from_displacements(&disp, quantile) else {
        return Ok(out);
    };
    let flagged = flag_outliers(&disp, &fences);

    if flagged.len() as f64 > n as f64 * MAX_OUTLIER_FRACTION {
        return Err(GeotaxisError::TooManyOutliers {
            outliers: flagged.len(),
            points: n,
        });
    }

    for i in flagged {
        if !fences.is_outlier(step_length(&out.x, &out.y, i)) {
            continue;
        }
        // An end displacement whose neighbour is also out of the fences points at a spike
        // on the second (or second to last) point, not at the end point itself.
        let spike = if i == 0 && fences.is_outlier(step_length(&out.x, &out.y, 1)) {
            interpolate_point(frames, &mut out.x, &mut out.y, 1)
        } else if i == n - 2 && fences.is_outlier(step_length(&out.x, &out.y, n - 3)) {
            interpolate_point(frames, &mut out.x, &mut out.y, n - 2)
        } else {
            None
        };
        let repaired =
            spike.or_else(|| repair_displacement(frames, &mut out.x, &mut out.y, i));
        if let Some(k) = repaired {
            out.repaired.push(k);
        }
    }

    Ok(out)
}

/// [`fix_outlier_track`] for a track sampled on consecutive frames `0..N`.
pub fn fix_outlier_coord(
    x: &[f64],
    y: &[f64],
    quantile: f64,
) -> Result<RepairedTrack, GeotaxisError> {
    let frames: Vec<FrameNumber> = (0..x.len() as FrameNumber).collect();
    fix_outlier_track(&frames, x, y, quantile)
}
