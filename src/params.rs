//! # Processing parameters
//!
//! This module defines the configuration of the two batch stages, each with a
//! **fluent builder** that validates values before any file is touched:
//!
//! * [`RefineParams`] – raw → refined (outlier quantile, frame rate, landmark set, file suffix),
//! * [`DeriveParams`] – refined → derived (frame rate, heading window, smoothing window, suffix),
//! * [`BatchPolicy`] – what a batch does when one sequence fails.
//!
//! ## Example
//!
//! ```rust
//! use geotaxis::params::{BatchPolicy, DeriveParams, RefineParams};
//!
//! let refine = RefineParams::builder()
//!     .frame_rate(30.0)
//!     .outlier_quantile(0.05)
//!     .build()
//!     .unwrap();
//!
//! let derive = DeriveParams::builder()
//!     .frame_rate(30.0)
//!     .heading_win(15)
//!     .batch_policy(BatchPolicy::Continue)
//!     .build()
//!     .unwrap();
//! # let _ = (refine, derive);
//! ```
//!
//! Validation rules are listed on each `build` method. Comparisons treat `NaN` as invalid.
use std::cmp::Ordering::{Equal, Greater, Less};
use std::fmt;

use crate::constants::{
    ARM_INDICES, DEFAULT_FRAME_RATE, DERIVED_SUFFIX, HEADING_WINDOW, N_ARMS,
    NORMALIZER_OUTLIER_QUANTILE, RAW_SUFFIX, REFINED_SUFFIX, SMOOTHING_WINDOW,
};
use crate::geotaxis_errors::GeotaxisError;
use crate::landmarks::BodyPart;

/// Failure handling of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// The first failing sequence aborts the whole batch.
    #[default]
    FailFast,
    /// Failing sequences are logged and reported; the batch keeps going.
    Continue,
}

#[inline]
fn gt0(x: f64) -> bool {
    x.partial_cmp(&0.0) == Some(Greater)
}

#[inline]
fn in_open_half(x: f64) -> bool {
    gt0(x) && x.partial_cmp(&0.5) == Some(Less)
}

#[inline]
fn ge0(x: f64) -> bool {
    matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
}

/// Parameters of the refinement stage (raw → refined).
#[derive(Debug, Clone)]
pub struct RefineParams {
    /// Frames per second of the source video.
    pub frame_rate: f64,
    /// Lower quantile used to build the outlier fences (`1 - q` for the upper one).
    pub outlier_quantile: f64,
    /// Body-part categories to extract.
    pub body_parts: Vec<BodyPart>,
    /// 1-based landmark indices to extract for every body part.
    pub part_indices: Vec<u8>,
    /// File-name suffix of raw exports.
    pub raw_suffix: String,
    pub batch_policy: BatchPolicy,
}

impl Default for RefineParams {
    fn default() -> Self {
        RefineParams {
            frame_rate: DEFAULT_FRAME_RATE,
            outlier_quantile: NORMALIZER_OUTLIER_QUANTILE,
            body_parts: vec![BodyPart::Arm, BodyPart::Chip],
            part_indices: ARM_INDICES.to_vec(),
            raw_suffix: RAW_SUFFIX.to_string(),
            batch_policy: BatchPolicy::FailFast,
        }
    }
}

impl RefineParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RefineParamsBuilder {
        RefineParamsBuilder::new()
    }
}

/// Builder for [`RefineParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct RefineParamsBuilder {
    params: RefineParams,
}

impl RefineParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: RefineParams::default(),
        }
    }

    pub fn frame_rate(mut self, v: f64) -> Self {
        self.params.frame_rate = v;
        self
    }
    pub fn outlier_quantile(mut self, v: f64) -> Self {
        self.params.outlier_quantile = v;
        self
    }
    pub fn body_parts(mut self, v: Vec<BodyPart>) -> Self {
        self.params.body_parts = v;
        self
    }
    pub fn part_indices(mut self, v: Vec<u8>) -> Self {
        self.params.part_indices = v;
        self
    }
    pub fn raw_suffix(mut self, v: impl Into<String>) -> Self {
        self.params.raw_suffix = v.into();
        self
    }
    pub fn batch_policy(mut self, v: BatchPolicy) -> Self {
        self.params.batch_policy = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `frame_rate > 0`.
    /// * `0 < outlier_quantile < 0.5` (the lower fence must sit below the upper one).
    /// * `body_parts` and `part_indices` are non-empty.
    /// * every part index lies in `1..=5`.
    /// * `raw_suffix` is non-empty.
    pub fn build(self) -> Result<RefineParams, GeotaxisError> {
        let p = &self.params;

        if !gt0(p.frame_rate) {
            return Err(GeotaxisError::InvalidParameter(
                "frame_rate must be > 0".into(),
            ));
        }
        if !in_open_half(p.outlier_quantile) {
            return Err(GeotaxisError::InvalidParameter(
                "outlier_quantile must lie in (0, 0.5)".into(),
            ));
        }
        if p.body_parts.is_empty() {
            return Err(GeotaxisError::InvalidParameter(
                "body_parts must not be empty".into(),
            ));
        }
        if p.part_indices.is_empty() {
            return Err(GeotaxisError::InvalidParameter(
                "part_indices must not be empty".into(),
            ));
        }
        if let Some(bad) = p
            .part_indices
            .iter()
            .find(|&&i| i == 0 || i as usize > N_ARMS)
        {
            return Err(GeotaxisError::InvalidParameter(format!(
                "part index {bad} outside 1..={N_ARMS}"
            )));
        }
        if p.raw_suffix.is_empty() {
            return Err(GeotaxisError::InvalidParameter(
                "raw_suffix must not be empty".into(),
            ));
        }

        Ok(self.params)
    }
}

/// Parameters of the derivation stage (refined → derived).
#[derive(Debug, Clone)]
pub struct DeriveParams {
    /// Frames per second used to turn frame numbers into seconds.
    pub frame_rate: f64,
    /// Frame span of the displacement-based heading.
    pub heading_win: usize,
    /// Width of the centered running mean applied to positions.
    pub smoothing_window: usize,
    /// File-name suffix of refined tables.
    pub refined_suffix: String,
    pub batch_policy: BatchPolicy,
}

impl Default for DeriveParams {
    fn default() -> Self {
        DeriveParams {
            frame_rate: DEFAULT_FRAME_RATE,
            heading_win: HEADING_WINDOW,
            smoothing_window: SMOOTHING_WINDOW,
            refined_suffix: REFINED_SUFFIX.to_string(),
            batch_policy: BatchPolicy::FailFast,
        }
    }
}

impl DeriveParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DeriveParamsBuilder {
        DeriveParamsBuilder::new()
    }
}

/// Builder for [`DeriveParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct DeriveParamsBuilder {
    params: DeriveParams,
}

impl DeriveParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: DeriveParams::default(),
        }
    }

    pub fn frame_rate(mut self, v: f64) -> Self {
        self.params.frame_rate = v;
        self
    }
    pub fn heading_win(mut self, v: usize) -> Self {
        self.params.heading_win = v;
        self
    }
    pub fn smoothing_window(mut self, v: usize) -> Self {
        self.params.smoothing_window = v;
        self
    }
    pub fn refined_suffix(mut self, v: impl Into<String>) -> Self {
        self.params.refined_suffix = v.into();
        self
    }
    pub fn batch_policy(mut self, v: BatchPolicy) -> Self {
        self.params.batch_policy = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `frame_rate > 0`.
    /// * `heading_win ≥ 1`, `smoothing_window ≥ 1`.
    /// * `refined_suffix` is non-empty and differs from the derived suffix
    ///   (otherwise derived outputs would be picked up as inputs).
    pub fn build(self) -> Result<DeriveParams, GeotaxisError> {
        let p = &self.params;

        if !gt0(p.frame_rate) {
            return Err(GeotaxisError::InvalidParameter(
                "frame_rate must be > 0".into(),
            ));
        }
        if p.heading_win == 0 {
            return Err(GeotaxisError::InvalidParameter(
                "heading_win must be >= 1".into(),
            ));
        }
        if p.smoothing_window == 0 {
            return Err(GeotaxisError::InvalidParameter(
                "smoothing_window must be >= 1".into(),
            ));
        }
        if p.refined_suffix.is_empty() || p.refined_suffix == DERIVED_SUFFIX {
            return Err(GeotaxisError::InvalidParameter(format!(
                "refined_suffix must be non-empty and differ from '{DERIVED_SUFFIX}'"
            )));
        }

        Ok(self.params)
    }
}

impl fmt::Display for RefineParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.body_parts.iter().map(BodyPart::as_str).collect();
        write!(
            f,
            "frame_rate={}, outlier_quantile={}, body_parts={:?}, part_indices={:?}, suffix={}, policy={:?}",
            self.frame_rate,
            self.outlier_quantile,
            parts,
            self.part_indices,
            self.raw_suffix,
            self.batch_policy
        )
    }
}

impl fmt::Display for DeriveParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame_rate={}, heading_win={}, smoothing_window={}, suffix={}, policy={:?}",
            self.frame_rate,
            self.heading_win,
            self.smoothing_window,
            self.refined_suffix,
            self.batch_policy
        )
    }
}

/// Validate a quantile passed directly to [`crate::tracks::outliers::fix_outlier_coord`].
pub(crate) fn check_quantile(q: f64) -> Result<(), GeotaxisError> {
    if ge0(q) && q.partial_cmp(&0.5) == Some(Less) {
        Ok(())
    } else {
        Err(GeotaxisError::InvalidParameter(format!(
            "quantile must lie in [0, 0.5), got {q}"
        )))
    }
}

#[cfg(test)]
mod params_test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(RefineParams::builder().build().is_ok());
        assert!(DeriveParams::builder().build().is_ok());
        let p = DeriveParams::default();
        assert_eq!(p.heading_win, 10);
        assert_eq!(p.smoothing_window, 20);
    }

    #[test]
    fn test_refine_rejects_bad_values() {
        let err = RefineParams::builder().frame_rate(0.0).build().unwrap_err();
        assert_eq!(
            err,
            GeotaxisError::InvalidParameter("frame_rate must be > 0".into())
        );
        assert!(RefineParams::builder()
            .outlier_quantile(f64::NAN)
            .build()
            .is_err());
        assert!(RefineParams::builder()
            .outlier_quantile(0.5)
            .build()
            .is_err());
        assert!(RefineParams::builder()
            .part_indices(vec![1, 6])
            .build()
            .is_err());
        assert!(RefineParams::builder().body_parts(vec![]).build().is_err());
    }

    #[test]
    fn test_derive_rejects_bad_values() {
        assert!(DeriveParams::builder().heading_win(0).build().is_err());
        assert!(DeriveParams::builder().smoothing_window(0).build().is_err());
        assert!(DeriveParams::builder()
            .refined_suffix(DERIVED_SUFFIX)
            .build()
            .is_err());
    }

    #[test]
    fn test_check_quantile() {
        assert!(check_quantile(0.25).is_ok());
        assert!(check_quantile(0.0).is_ok());
        assert!(check_quantile(0.5).is_err());
        assert!(check_quantile(-0.1).is_err());
    }
}
