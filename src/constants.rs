//! # Constants and type definitions for geotaxis
//!
//! This module centralizes the **fixed analysis constants** and the **common type aliases**
//! used throughout the crate.
//!
//! ## Overview
//!
//! - Unit aliases (pixels, seconds, radians, frame numbers)
//! - Landmark layout of the five-armed body
//! - Default processing policies (outlier quantile, smoothing window, heading window)
//! - File naming conventions shared by the pipelines
//! - A fast hash map alias backed by `ahash`

use ahash::RandomState;
use std::collections::HashMap;

// -------------------------------------------------------------------------------------------------
// Units
// -------------------------------------------------------------------------------------------------

/// Image coordinate, in pixels
pub type Pixel = f64;

/// Elapsed time, in seconds
pub type Seconds = f64;

/// Angle in radians
pub type Radian = f64;

/// Angle in degrees
pub type Degree = f64;

/// Zero-based video frame number
pub type FrameNumber = u32;

/// 2π, used to wrap angular differences
pub const DPI: f64 = 2. * std::f64::consts::PI;

// -------------------------------------------------------------------------------------------------
// Body layout
// -------------------------------------------------------------------------------------------------

/// Number of arms (and of reference chips) on the tracked body
pub const N_ARMS: usize = 5;

/// 1-based indices of the tracked arms / chips
pub const ARM_INDICES: [u8; N_ARMS] = [1, 2, 3, 4, 5];

/// Nominal angular spacing between two neighbouring arms (rad)
pub const ARM_SPACING: Radian = DPI / N_ARMS as f64;

// -------------------------------------------------------------------------------------------------
// Processing defaults
// -------------------------------------------------------------------------------------------------

/// Frame rate assumed when none is provided (frames per second)
pub const DEFAULT_FRAME_RATE: f64 = 1.0;

/// Quantile used by the track normalizer when repairing raw landmark tracks
pub const NORMALIZER_OUTLIER_QUANTILE: f64 = 0.05;

/// Default quantile for a standalone outlier repair (quartiles)
pub const DEFAULT_OUTLIER_QUANTILE: f64 = 0.25;

/// Tukey fence multiplier applied to the interquartile range
pub const IQR_FENCE: f64 = 1.5;

/// Maximum fraction of points that may be flagged before a track is rejected
pub const MAX_OUTLIER_FRACTION: f64 = 0.1;

/// Width (frames) of the centered running mean applied to positions
pub const SMOOTHING_WINDOW: usize = 20;

/// Frame span used by the displacement-based heading
pub const HEADING_WINDOW: usize = 10;

// -------------------------------------------------------------------------------------------------
// File naming
// -------------------------------------------------------------------------------------------------

/// Suffix of the raw DeepLabCut exports picked up by the refinement pipeline
pub const RAW_SUFFIX: &str = "filtered.csv";

/// Suffix of persisted refined tables
pub const REFINED_SUFFIX: &str = "refined.parquet";

/// Suffix of persisted derived tables
pub const DERIVED_SUFFIX: &str = "derived.parquet";

/// Length of the `<date>_<seq>` prefix shared by refined and derived file names
pub const SEQUENCE_PREFIX_LEN: usize = 13;

/// Length of the ISO date at the start of every sequence file name
pub const DATE_LEN: usize = 10;

/// Largest sequence number that fits the two-digit `<seq>` field of table names
pub const MAX_SEQUENCE: u32 = 99;

/// Hash map using `ahash` for speed
pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;
