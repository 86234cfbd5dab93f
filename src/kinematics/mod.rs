//! # Kinematic derivation engine
//!
//! Turns the refined landmark tracks of one sequence into per-frame kinematics of the
//! five-armed body:
//!
//! * a stable **centroid** (mean of the five reference chips),
//! * a **consistent arm identity** across frames ([`arm_tracking`]),
//! * **smoothed** centroid and arm positions (centered running mean),
//! * two **headings** ([`heading`]): orientation (centroid → lead arm) and displacement
//!   (direction of travel over a frame window),
//! * **speed** and **cumulative displacement** of the centroid ([`motion`]).
//!
//! ## Overview
//! -----------------
//! 1. Frames are taken from the track of the first arm, in ascending order.
//! 2. For each frame the chips and arm tips are gathered; any missing landmark aborts with
//!    [`GeotaxisError::MissingLandmark`].
//! 3. The [`ArmTracker`] picks the lead arm and orders the others counter-clockwise.
//! 4. After the loop, all positions are smoothed and the headings, speed and displacement
//!    are computed from the smoothed series.
//!
//! ## Example
//! -----------------
//! ```rust,no_run
//! use camino::Utf8Path;
//! use geotaxis::kinematics::derive_data;
//! use geotaxis::params::DeriveParams;
//! use geotaxis::storage::read_refined;
//!
//! let refined = read_refined(Utf8Path::new("2021-07-14_03_refined.parquet")).unwrap();
//! let derived = derive_data(&refined, &DeriveParams::default()).unwrap();
//! println!("{} frames, final displacement {:?}", derived.len(), derived.displ_pix.last());
//! ```
use tracing::trace;

use crate::constants::{FrameNumber, Pixel, Radian, Seconds, ARM_INDICES, N_ARMS};
use crate::geotaxis_errors::GeotaxisError;
use crate::landmarks::LandmarkKey;
use crate::numeric::running_mean;
use crate::params::DeriveParams;
use crate::tracks::RefinedTable;

pub mod arm_tracking;
pub mod heading;
pub mod motion;

pub use arm_tracking::{ArmTracker, FrameGeometry, FrameLandmarks};

/// Per-frame kinematics of one sequence.
///
/// Every vector except `t_head_disp`/`head_disp_rad` holds one entry per frame. Arm columns
/// are indexed by **ordered slot** (slot 0 = lead arm), not by landmark index; `arm_ids`
/// records which landmark occupied each slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedTable {
    pub fr_num: Vec<FrameNumber>,
    pub time_s: Vec<Seconds>,
    pub x_cntr_pix: Vec<Pixel>,
    pub y_cntr_pix: Vec<Pixel>,
    pub x_arm_pix: [Vec<Pixel>; N_ARMS],
    pub y_arm_pix: [Vec<Pixel>; N_ARMS],
    pub arm_ids: Vec<[u8; N_ARMS]>,
    pub head_rad: Vec<Radian>,
    pub spd_pixs: Vec<f64>,
    pub displ_pix: Vec<Pixel>,
    pub t_head_disp: Vec<Seconds>,
    pub head_disp_rad: Vec<Radian>,
}

impl DerivedTable {
    /// Number of frames.
    pub fn len(&self) -> usize {
        self.fr_num.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fr_num.is_empty()
    }

    /// Landmark index of the lead arm, frame by frame.
    pub fn lead_arm_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.arm_ids.iter().map(|ids| ids[0])
    }

    /// Check that every per-frame column has the same length and that the displacement
    /// heading is no longer than the sequence.
    pub fn validate(&self) -> Result<(), GeotaxisError> {
        let n = self.len();
        let per_frame = [
            ("time_s", self.time_s.len()),
            ("x_cntr_pix", self.x_cntr_pix.len()),
            ("y_cntr_pix", self.y_cntr_pix.len()),
            ("arm_ids", self.arm_ids.len()),
            ("head_rad", self.head_rad.len()),
            ("spd_pixs", self.spd_pixs.len()),
            ("displ_pix", self.displ_pix.len()),
        ];
        let arms = self
            .x_arm_pix
            .iter()
            .chain(self.y_arm_pix.iter())
            .map(|c| ("arm", c.len()));

        if let Some((name, len)) = per_frame.into_iter().chain(arms).find(|&(_, l)| l != n) {
            return Err(GeotaxisError::InvalidParameter(format!(
                "derived column {name} holds {len} values for {n} frames"
            )));
        }
        if self.t_head_disp.len() != self.head_disp_rad.len() || self.head_disp_rad.len() > n {
            return Err(GeotaxisError::InvalidParameter(format!(
                "displacement heading holds {} times and {} angles for {n} frames",
                self.t_head_disp.len(),
                self.head_disp_rad.len()
            )));
        }
        Ok(())
    }
}

/// Frames to process, ascending, taken from the first arm's track.
fn frame_set(
    table: &RefinedTable,
    arm_indices: &[u8; N_ARMS],
) -> Result<Vec<FrameNumber>, GeotaxisError> {
    let key = LandmarkKey::arm(arm_indices[0]);
    let track = table
        .track(&key)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GeotaxisError::MissingLandmark {
            frame: 0,
            landmark: key.name(),
        })?;
    let mut frames = track.frames().to_vec();
    frames.sort_unstable();
    Ok(frames)
}

/// Derive the kinematics of one sequence.
///
/// Arguments
/// -----------------
/// * `table` – Refined tracks of the five chips and five arms.
/// * `arm_indices` – Landmark indices of the arms/chips (normally `[1, 2, 3, 4, 5]`).
/// * `frame_rate` – Frames per second (`time_s = frame / frame_rate`).
/// * `heading_win` – Frame span of the displacement heading.
/// * `smoothing_window` – Width of the centered running mean.
///
/// Return
/// ----------
/// * The [`DerivedTable`], or [`GeotaxisError::MissingLandmark`] naming the first frame and
///   landmark that could not be found (an empty table fails on the first arm).
///
/// See also
/// ------------
/// * [`derive_data`] – Same computation driven by [`DeriveParams`].
pub fn derive_kinematics(
    table: &RefinedTable,
    arm_indices: &[u8; N_ARMS],
    frame_rate: f64,
    heading_win: usize,
    smoothing_window: usize,
) -> Result<DerivedTable, GeotaxisError> {
    let frames = frame_set(table, arm_indices)?;
    let n = frames.len();

    let mut tracker = ArmTracker::new();
    let mut cx = Vec::with_capacity(n);
    let mut cy = Vec::with_capacity(n);
    let mut arm_x: [Vec<Pixel>; N_ARMS] = std::array::from_fn(|_| Vec::with_capacity(n));
    let mut arm_y: [Vec<Pixel>; N_ARMS] = std::array::from_fn(|_| Vec::with_capacity(n));
    let mut arm_ids = Vec::with_capacity(n);

    for &frame in &frames {
        let landmarks = FrameLandmarks::extract(table, arm_indices, frame)?;
        let geom = tracker.process(&landmarks, arm_indices);
        trace!(frame, lead = geom.arm_ids[0], angle = geom.lead_angle, "arm order");

        cx.push(geom.centroid.x);
        cy.push(geom.centroid.y);
        for (slot, p) in geom.arms.iter().enumerate() {
            arm_x[slot].push(p.x);
            arm_y[slot].push(p.y);
        }
        arm_ids.push(geom.arm_ids);
    }

    let time_s: Vec<Seconds> = frames.iter().map(|&f| f as f64 / frame_rate).collect();

    let x_cntr_pix = running_mean(&cx, smoothing_window);
    let y_cntr_pix = running_mean(&cy, smoothing_window);
    let x_arm_pix = arm_x.map(|c| running_mean(&c, smoothing_window));
    let y_arm_pix = arm_y.map(|c| running_mean(&c, smoothing_window));

    let head_rad =
        heading::orientation_heading(&x_arm_pix[0], &y_arm_pix[0], &x_cntr_pix, &y_cntr_pix);
    let head_disp_rad = heading::displacement_heading(&x_cntr_pix, &y_cntr_pix, heading_win);
    let t_head_disp = heading::displacement_heading_times(&time_s, heading_win);
    let spd_pixs = motion::speed(&x_cntr_pix, &y_cntr_pix, &time_s);
    let displ_pix = motion::cumulative_displacement(&x_cntr_pix, &y_cntr_pix);

    Ok(DerivedTable {
        fr_num: frames,
        time_s,
        x_cntr_pix,
        y_cntr_pix,
        x_arm_pix,
        y_arm_pix,
        arm_ids,
        head_rad,
        spd_pixs,
        displ_pix,
        t_head_disp,
        head_disp_rad,
    })
}

/// [`derive_kinematics`] over the standard arm set, configured by [`DeriveParams`].
pub fn derive_data(
    table: &RefinedTable,
    params: &DeriveParams,
) -> Result<DerivedTable, GeotaxisError> {
    derive_kinematics(
        table,
        &ARM_INDICES,
        params.frame_rate,
        params.heading_win,
        params.smoothing_window,
    )
}
