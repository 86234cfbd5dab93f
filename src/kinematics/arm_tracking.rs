//! # Arm identity tracking
//!
//! The five arms of a sea star are geometrically interchangeable and the upstream labels
//! (`arm1` … `arm5`) are not guaranteed to follow the same physical arm. Identity is
//! therefore recovered by **continuity**:
//!
//! * first frame: the lead arm is the one pointing closest to "up" (`π/2`),
//! * every later frame: the lead arm is the one whose angle around the centroid is closest
//!   to the previous lead angle (wrapped angular distance; ties go to the lowest landmark
//!   index).
//!
//! The remaining arms are then ordered **counter-clockwise** from the lead arm, so ordered
//! slot 1 is always the lead and slots 2..5 follow around the body.
//!
//! Limitation
//! -----------------
//! The nearest-previous-angle rule is a local heuristic. It assumes the body rotates much
//! less than the ~72° arm spacing between two frames; fast turns filmed at a low frame rate
//! can swap identities.
use std::f64::consts::FRAC_PI_2;

use nalgebra::Point2;

use crate::constants::{FrameNumber, Radian, DPI, N_ARMS};
use crate::geotaxis_errors::GeotaxisError;
use crate::landmarks::LandmarkKey;
use crate::numeric::angle_distance;
use crate::tracks::RefinedTable;

/// Landmark positions of one frame, in landmark-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLandmarks {
    pub frame: FrameNumber,
    pub chips: [Point2<f64>; N_ARMS],
    pub arms: [Point2<f64>; N_ARMS],
}

/// Geometry of one frame after arm ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub frame: FrameNumber,
    pub centroid: Point2<f64>,
    /// Arm tips in ordered slots (slot 0 = lead arm, then counter-clockwise).
    pub arms: [Point2<f64>; N_ARMS],
    /// Landmark index occupying each ordered slot.
    pub arm_ids: [u8; N_ARMS],
    /// Absolute angle of the lead arm around the centroid.
    pub lead_angle: Radian,
}

fn landmark_at(
    table: &RefinedTable,
    key: LandmarkKey,
    frame: FrameNumber,
) -> Result<Point2<f64>, GeotaxisError> {
    table
        .track(&key)
        .and_then(|t| t.position(frame))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| Point2::new(x, y))
        .ok_or_else(|| GeotaxisError::MissingLandmark {
            frame,
            landmark: key.name(),
        })
}

impl FrameLandmarks {
    /// Gather the five chips and five arm tips of `frame`.
    ///
    /// Return
    /// ----------
    /// * `Err(GeotaxisError::MissingLandmark)` naming the first absent (or non-finite)
    ///   landmark, chips checked before arms.
    pub fn extract(
        table: &RefinedTable,
        arm_indices: &[u8; N_ARMS],
        frame: FrameNumber,
    ) -> Result<Self, GeotaxisError> {
        let mut chips = [Point2::origin(); N_ARMS];
        let mut arms = [Point2::origin(); N_ARMS];
        for (slot, &idx) in arm_indices.iter().enumerate() {
            chips[slot] = landmark_at(table, LandmarkKey::chip(idx), frame)?;
        }
        for (slot, &idx) in arm_indices.iter().enumerate() {
            arms[slot] = landmark_at(table, LandmarkKey::arm(idx), frame)?;
        }
        Ok(Self { frame, chips, arms })
    }

    /// Arithmetic mean of the chip positions.
    pub fn centroid(&self) -> Point2<f64> {
        let sum = self
            .chips
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / N_ARMS as f64)
    }
}

/// Angle of every arm tip around `centroid`.
pub fn arm_angles(arms: &[Point2<f64>; N_ARMS], centroid: &Point2<f64>) -> [Radian; N_ARMS] {
    let mut angles = [0.0; N_ARMS];
    for (angle, arm) in angles.iter_mut().zip(arms) {
        let d = arm - centroid;
        *angle = d.y.atan2(d.x);
    }
    angles
}

/// Index of the angle closest to `reference` (lowest index on ties).
pub fn closest_angle(angles: &[Radian; N_ARMS], reference: Radian) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (k, &a) in angles.iter().enumerate() {
        let d = angle_distance(a, reference);
        if d < best_dist {
            best = k;
            best_dist = d;
        }
    }
    best
}

/// Order arm indices counter-clockwise starting from `lead`.
///
/// Each arm is keyed by its angle relative to the lead, taken modulo `2π`; the lead keeps
/// slot 0 and the others are sorted ascending (stable, so equal angles keep index order).
pub fn order_ccw(angles: &[Radian; N_ARMS], lead: usize) -> [usize; N_ARMS] {
    let mut rest: Vec<(usize, Radian)> = (0..N_ARMS)
        .filter(|&k| k != lead)
        .map(|k| (k, (angles[k] - angles[lead]).rem_euclid(DPI)))
        .collect();
    rest.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut order = [lead; N_ARMS];
    for (slot, (k, _)) in order.iter_mut().skip(1).zip(rest) {
        *slot = k;
    }
    order
}

/// Stateful lead-arm tracker carrying the previous lead angle across frames.
#[derive(Debug, Clone, Default)]
pub struct ArmTracker {
    last_angle: Option<Radian>,
}

impl ArmTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_angle(&self) -> Option<Radian> {
        self.last_angle
    }

    /// Pick the lead arm of a new frame and remember its angle.
    pub fn select_lead(&mut self, angles: &[Radian; N_ARMS]) -> usize {
        let reference = self.last_angle.unwrap_or(FRAC_PI_2);
        let lead = closest_angle(angles, reference);
        self.last_angle = Some(angles[lead]);
        lead
    }

    /// Centroid, lead selection and ordering for one frame.
    pub fn process(&mut self, landmarks: &FrameLandmarks, arm_indices: &[u8; N_ARMS]) -> FrameGeometry {
        let centroid = landmarks.centroid();
        let angles = arm_angles(&landmarks.arms, &centroid);
        let lead = self.select_lead(&angles);
        let order = order_ccw(&angles, lead);

        FrameGeometry {
            frame: landmarks.frame,
            centroid,
            arms: order.map(|k| landmarks.arms[k]),
            arm_ids: order.map(|k| arm_indices[k]),
            lead_angle: angles[lead],
        }
    }
}
