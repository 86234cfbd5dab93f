//! # Heading estimators
//!
//! Two complementary headings are computed from the **smoothed** series:
//!
//! * **Orientation heading** ([`orientation_heading`]): direction from the centroid to the
//!   lead arm, one value per frame. Meaningful even when the body is at rest.
//! * **Displacement heading** ([`displacement_heading`]): direction of centroid travel over
//!   a fixed window of `w` frames, `F − (w − 1)` values. Only meaningful while moving.
//!
//! Both are in radians, in `(−π, π]`, measured counter-clockwise from the image `+x` axis.
use itertools::izip;

use crate::constants::{Pixel, Radian, Seconds};

/// `atan2(arm_y − cy, arm_x − cx)` frame by frame.
pub fn orientation_heading(
    arm_x: &[Pixel],
    arm_y: &[Pixel],
    cx: &[Pixel],
    cy: &[Pixel],
) -> Vec<Radian> {
    izip!(arm_x, arm_y, cx, cy)
        .map(|(ax, ay, x, y)| (ay - y).atan2(ax - x))
        .collect()
}

/// Direction of travel between frames `i` and `i + win − 1`.
///
/// Arguments
/// -----------------
/// * `cx`, `cy` – Smoothed centroid coordinates.
/// * `win` – Window length in frames (`≥ 1`).
///
/// Return
/// ----------
/// * `F − (win − 1)` angles, or an empty vector when the sequence is shorter than `win`.
///
/// Note
/// -----------------
/// With `win = 1` the start and end points coincide and every value is `atan2(0, 0) = 0`.
pub fn displacement_heading(cx: &[Pixel], cy: &[Pixel], win: usize) -> Vec<Radian> {
    let n = cx.len().min(cy.len());
    if win == 0 || n < win {
        return Vec::new();
    }
    (0..=n - win)
        .map(|i| {
            let j = i + win - 1;
            (cy[j] - cy[i]).atan2(cx[j] - cx[i])
        })
        .collect()
}

/// Time stamps matching [`displacement_heading`]: the first `F − (win − 1)` entries of
/// `time_s`.
pub fn displacement_heading_times(time_s: &[Seconds], win: usize) -> Vec<Seconds> {
    if win == 0 || time_s.len() < win {
        return Vec::new();
    }
    time_s[..=time_s.len() - win].to_vec()
}
