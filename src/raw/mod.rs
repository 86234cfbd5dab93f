//! # Raw pose-estimation coordinates
//!
//! In-memory form of one upstream pose-estimation export: per-landmark `x`/`y` pixel
//! coordinates (and likelihoods) indexed by frame number, for a single scorer (model)
//! identifier.
//!
//! * [`RawCoordinateFrame`] – the immutable container consumed by the
//!   [`normalizer`](crate::tracks::normalizer).
//! * [`dlc_csv_reader`] – reader for the DeepLabCut CSV export layout.
//! * [`ParseRawError`] – precise diagnostics for malformed exports.
use std::collections::BTreeMap;

use camino::Utf8Path;
use thiserror::Error;

use crate::constants::{FrameNumber, Pixel};
use crate::geotaxis_errors::GeotaxisError;
use crate::landmarks::LandmarkKey;

pub mod dlc_csv_reader;

/// Parsing failures of a raw coordinate export.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseRawError {
    #[error("Missing '{0}' header row")]
    MissingHeader(&'static str),

    #[error("Line {line}: expected {expected} fields, found {found}")]
    RowLength {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Unknown coordinate label '{0}' (expected x, y or likelihood)")]
    UnknownCoord(String),

    #[error("Landmark {landmark} has no '{coord}' column")]
    MissingCoordinate { landmark: String, coord: &'static str },

    #[error("Line {line}: invalid frame number '{value}'")]
    InvalidFrameNumber { line: u64, value: String },

    #[error("Line {line}, column {column}: invalid value '{value}'")]
    InvalidValue {
        line: u64,
        column: usize,
        value: String,
    },
}

/// Coordinates of one landmark across all frames of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLandmark {
    pub x: Vec<Pixel>,
    pub y: Vec<Pixel>,
    pub likelihood: Option<Vec<f64>>,
}

/// Raw coordinates of one sequence, as produced upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCoordinateFrame {
    scorer: String,
    frames: Vec<FrameNumber>,
    landmarks: BTreeMap<String, RawLandmark>,
}

impl RawCoordinateFrame {
    /// Empty container for `frames`.
    pub fn new(scorer: impl Into<String>, frames: Vec<FrameNumber>) -> Self {
        Self {
            scorer: scorer.into(),
            frames,
            landmarks: BTreeMap::new(),
        }
    }

    /// Add a landmark; its columns must have one value per frame.
    pub fn insert_landmark(
        &mut self,
        name: impl Into<String>,
        landmark: RawLandmark,
    ) -> Result<(), GeotaxisError> {
        let n = self.frames.len();
        if landmark.x.len() != landmark.y.len() {
            return Err(GeotaxisError::LengthMismatch {
                x: landmark.x.len(),
                y: landmark.y.len(),
            });
        }
        let lik_len = landmark.likelihood.as_ref().map_or(n, Vec::len);
        if landmark.x.len() != n || lik_len != n {
            return Err(GeotaxisError::InvalidParameter(format!(
                "landmark columns must hold {n} values"
            )));
        }
        self.landmarks.insert(name.into(), landmark);
        Ok(())
    }

    /// Read a DeepLabCut CSV export from disk.
    pub fn from_dlc_csv(path: &Utf8Path) -> Result<Self, GeotaxisError> {
        dlc_csv_reader::read_dlc_csv_file(path)
    }

    pub fn scorer(&self) -> &str {
        &self.scorer
    }

    pub fn frames(&self) -> &[FrameNumber] {
        &self.frames
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn landmark_names(&self) -> impl Iterator<Item = &str> {
        self.landmarks.keys().map(String::as_str)
    }

    pub fn landmark(&self, name: &str) -> Option<&RawLandmark> {
        self.landmarks.get(name)
    }

    /// `x` and `y` columns of a landmark.
    ///
    /// Return
    /// ----------
    /// * `Err(GeotaxisError::LandmarkNotFound)` if the export has no such landmark.
    pub fn landmark_xy(&self, key: &LandmarkKey) -> Result<(&[Pixel], &[Pixel]), GeotaxisError> {
        let name = key.name();
        self.landmarks
            .get(&name)
            .map(|l| (l.x.as_slice(), l.y.as_slice()))
            .ok_or(GeotaxisError::LandmarkNotFound(name))
    }
}
