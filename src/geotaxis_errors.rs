use thiserror::Error;

use crate::constants::FrameNumber;
use crate::raw::ParseRawError;

#[derive(Error, Debug)]
pub enum GeotaxisError {
    #[error("Input path error: {0}")]
    InputPath(String),

    #[error("Catalog lookup for date {date}, sequence {sequence} returned {matches} rows (expected exactly one)")]
    CatalogMatch {
        date: String,
        sequence: u32,
        matches: usize,
    },

    #[error("Too many outliers: {outliers} flagged for {points} points; try a smaller quantile")]
    TooManyOutliers { outliers: usize, points: usize },

    #[error("Frame {frame} is missing landmark {landmark}")]
    MissingLandmark { frame: FrameNumber, landmark: String },

    #[error("Landmark not found in raw source: {0}")]
    LandmarkNotFound(String),

    #[error("Coordinate length mismatch: x has {x} values, y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("Incomplete track for {0}: x and y do not cover the same frames")]
    IncompleteTrack(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Error during the raw coordinate file parsing: {0}")]
    RawParsing(ParseRawError),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

impl From<ParseRawError> for GeotaxisError {
    fn from(err: ParseRawError) -> Self {
        GeotaxisError::RawParsing(err)
    }
}

impl PartialEq for GeotaxisError {
    fn eq(&self, other: &Self) -> bool {
        use GeotaxisError::*;
        match (self, other) {
            (InputPath(a), InputPath(b)) => a == b,
            (
                CatalogMatch {
                    date: d1,
                    sequence: s1,
                    matches: m1,
                },
                CatalogMatch {
                    date: d2,
                    sequence: s2,
                    matches: m2,
                },
            ) => d1 == d2 && s1 == s2 && m1 == m2,
            (
                TooManyOutliers {
                    outliers: o1,
                    points: p1,
                },
                TooManyOutliers {
                    outliers: o2,
                    points: p2,
                },
            ) => o1 == o2 && p1 == p2,
            (
                MissingLandmark {
                    frame: f1,
                    landmark: l1,
                },
                MissingLandmark {
                    frame: f2,
                    landmark: l2,
                },
            ) => f1 == f2 && l1 == l2,
            (LandmarkNotFound(a), LandmarkNotFound(b)) => a == b,
            (LengthMismatch { x: x1, y: y1 }, LengthMismatch { x: x2, y: y2 }) => {
                x1 == x2 && y1 == y2
            }
            (IncompleteTrack(a), IncompleteTrack(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (InvalidFileName(a), InvalidFileName(b)) => a == b,
            (RawParsing(a), RawParsing(b)) => a == b,

            // Wrapped library errors are not comparable: same variant is enough
            (Io(_), Io(_)) => true,
            (Csv(_), Csv(_)) => true,
            (Parquet(_), Parquet(_)) => true,
            (Arrow(_), Arrow(_)) => true,

            _ => false,
        }
    }
}
