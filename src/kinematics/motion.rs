//! Speed and cumulative path length of the smoothed centroid.
use itertools::izip;

use crate::constants::{Pixel, Seconds};

fn step_lengths<'a>(cx: &'a [Pixel], cy: &'a [Pixel]) -> impl Iterator<Item = Pixel> + 'a {
    cx.windows(2)
        .zip(cy.windows(2))
        .map(|(x, y)| (x[1] - x[0]).hypot(y[1] - y[0]))
}

/// Instantaneous speed in pixels per second.
///
/// `spd[i] = |c[i+1] − c[i]| / (t[i+1] − t[i])` for every step; the last value is repeated
/// so the output has one entry per frame. A single frame has speed `0`.
pub fn speed(cx: &[Pixel], cy: &[Pixel], time_s: &[Seconds]) -> Vec<f64> {
    let n = cx.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut spd: Vec<f64> = izip!(step_lengths(cx, cy), time_s.windows(2))
                .map(|(d, t)| d / (t[1] - t[0]))
                .collect();
            if let Some(&last) = spd.last() {
                spd.push(last);
            }
            spd
        }
    }
}

/// Cumulative path length, starting at `0` on the first frame.
pub fn cumulative_displacement(cx: &[Pixel], cy: &[Pixel]) -> Vec<Pixel> {
    if cx.is_empty() {
        return Vec::new();
    }
    std::iter::once(0.0)
        .chain(step_lengths(cx, cy).scan(0.0, |acc, d| {
            *acc += d;
            Some(*acc)
        }))
        .collect()
}
