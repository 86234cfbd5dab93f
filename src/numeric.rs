//! # Numeric kernels shared by the refinement and derivation stages
//!
//! Small, allocation-light helpers used by [`crate::tracks`] and [`crate::kinematics`]:
//!
//! * [`percentile`] – linear-interpolated percentile of an unsorted sample,
//! * [`interp`] – piecewise-linear interpolation against increasing abscissae,
//! * [`running_mean`] – centered moving average with clipped edges,
//! * [`wrap_angle`] / [`angle_distance`] – angle arithmetic on the circle.
//!
//! Conventions
//! -----------------
//! * Percentiles follow the "linear" definition: for a sorted sample `s` of length `n`,
//!   the rank is `r = q·(n−1)` and the value is `s[⌊r⌋] + (r−⌊r⌋)·(s[⌈r⌉] − s[⌊r⌋])`.
//! * [`interp`] clamps to the first/last ordinate outside the abscissa range.
//! * Angles are in **radians**.
use crate::constants::{Radian, DPI};

/// Linear-interpolated percentile of `values` at quantile `q ∈ [0, 1]`.
///
/// Arguments
/// -----------------
/// * `values` – Sample (any order). NaN values are ordered last.
/// * `q` – Quantile in `[0, 1]` (clamped).
///
/// Return
/// ----------
/// * `None` for an empty sample, the percentile otherwise.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Piecewise-linear interpolation of `(xp, fp)` evaluated at `x`.
///
/// `xp` must be increasing. Outside `[xp[0], xp[last]]` the boundary ordinate is
/// returned (no extrapolation).
///
/// Return
/// ----------
/// * `None` if `xp` is empty or the slices differ in length.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    if xp.is_empty() || xp.len() != fp.len() {
        return None;
    }
    let last = xp.len() - 1;
    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[last] {
        return Some(fp[last]);
    }

    // First abscissa strictly greater than x; guaranteed in 1..=last here.
    let hi = xp.partition_point(|&v| v <= x);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span == 0.0 {
        return Some(fp[hi]);
    }
    let t = (x - xp[lo]) / span;
    Some(fp[lo] + t * (fp[hi] - fp[lo]))
}

/// Centered running mean of width `window` with clipped edges.
///
/// For sample `i`, the averaged span is `[i − (N−1)/2, i + (N−1)/2]` for an odd window
/// and `[i − (N−1)/2, i + (N−1)/2 + 1]` for an even one (integer division), clipped to the
/// sequence bounds. Only in-bounds samples enter the mean: no padding, no wrapping.
///
/// A `window` of 0 or 1 returns a copy of the input.
pub fn running_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    if window <= 1 || n == 0 {
        return values.to_vec();
    }

    let half = (window - 1) / 2;
    let extra = if window % 2 == 0 { 1 } else { 0 };

    // Prefix sums make each window O(1).
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0);
    for v in values {
        let last = *prefix.last().unwrap_or(&0.0);
        prefix.push(last + v);
    }

    (0..n)
        .map(|i| {
            let a = i.saturating_sub(half);
            let b = (i + half + extra + 1).min(n);
            (prefix[b] - prefix[a]) / (b - a) as f64
        })
        .collect()
}

/// Wrap an angle into `(−π, π]`.
#[inline]
pub fn wrap_angle(angle: Radian) -> Radian {
    if angle > -std::f64::consts::PI && angle <= std::f64::consts::PI {
        return angle;
    }
    let wrapped = (angle + std::f64::consts::PI).rem_euclid(DPI) - std::f64::consts::PI;
    if wrapped <= -std::f64::consts::PI {
        wrapped + DPI
    } else {
        wrapped
    }
}

/// Absolute angular distance between `a` and `b`, in `[0, π]`.
#[inline]
pub fn angle_distance(a: Radian, b: Radian) -> Radian {
    wrap_angle(a - b).abs()
}

#[cfg(test)]
mod numeric_test {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_percentile_linear() {
        let v = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 1.0), Some(4.0));
        assert_relative_eq!(percentile(&v, 0.25).unwrap(), 1.75);
        assert_relative_eq!(percentile(&v, 0.75).unwrap(), 3.25);
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn test_interp_inside_and_clamped() {
        let xp = [0.0, 1.0, 3.0];
        let fp = [0.0, 10.0, 30.0];
        assert_relative_eq!(interp(2.0, &xp, &fp).unwrap(), 20.0);
        assert_relative_eq!(interp(0.5, &xp, &fp).unwrap(), 5.0);
        assert_eq!(interp(-1.0, &xp, &fp), Some(0.0));
        assert_eq!(interp(9.0, &xp, &fp), Some(30.0));
        assert_eq!(interp(1.0, &[], &[]), None);
    }

    #[test]
    fn test_running_mean_even_window() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        // window 2 -> span [i, i+1]
        let out = running_mean(&v, 2);
        assert_eq!(out, vec![1.5, 2.5, 3.5, 4.5, 5.0]);
    }

    #[test]
    fn test_running_mean_odd_window_clips_edges() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = running_mean(&v, 3);
        assert_eq!(out, vec![1.5, 2.0, 3.0, 4.0, 4.5]);
    }

    #[test]
    fn test_running_mean_window_larger_than_sequence() {
        let v = [1.0, 2.0, 6.0];
        let out = running_mean(&v, 20);
        for x in out {
            assert_relative_eq!(x, 3.0);
        }
    }

    #[test]
    fn test_angle_helpers() {
        assert_relative_eq!(wrap_angle(3.0 * PI), PI);
        assert_relative_eq!(wrap_angle(-PI), PI);
        assert_relative_eq!(angle_distance(PI - 0.1, -PI + 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_distance(0.0, PI / 2.0), PI / 2.0);
    }
}
