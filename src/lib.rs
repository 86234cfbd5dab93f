//! # geotaxis
//!
//! Refinement and kinematic derivation of pose-estimation tracks recorded during geotaxis
//! experiments on sea stars.
//!
//! Processing runs in two batch stages over directories of files:
//!
//! 1. **Refinement** ([`pipeline::refine`]): DeepLabCut CSV exports are cross-referenced with
//!    the [sequence catalog](catalog), their landmark tracks are repaired
//!    ([`tracks::outliers`]), flipped and time-stamped ([`tracks::normalizer`]) and stored as
//!    Parquet refined tables.
//! 2. **Derivation** ([`pipeline::derive`]): refined tables go through the
//!    [kinematic derivation engine](kinematics) (centroid, arm identity tracking, smoothing,
//!    headings, speed and displacement) and are stored as Parquet derived tables.
//!
//! A [summary report](report) can then be built from the derived tables.
pub mod catalog;
pub mod constants;
pub mod geotaxis_errors;
pub mod kinematics;
pub mod landmarks;
pub mod numeric;
pub mod params;
pub mod pipeline;
pub mod raw;
pub mod report;
pub mod storage;
pub mod tracks;

pub use catalog::{CatalogLookup, SequenceCatalog};
pub use geotaxis_errors::GeotaxisError;
pub use kinematics::{derive_data, DerivedTable};
pub use params::{BatchPolicy, DeriveParams, RefineParams};
pub use pipeline::{derive_all, refine_all, BatchOutcome};
pub use tracks::{RefinedTable, RefinedTrack};
