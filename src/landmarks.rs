//! # Landmark identifiers
//!
//! A landmark is a tracked anatomical point named by a **body-part category** and a
//! **1-based index**: `arm1` … `arm5` for the arm tips, `chip1` … `chip5` for the
//! reference chips glued around the central disc.
//!
//! * [`BodyPart`] – closed set of categories with their on-disk spelling.
//! * [`Dimension`] – `x` / `y` image axis.
//! * [`LandmarkKey`] – `(BodyPart, index)` pair, the composite key used by
//!   [`RefinedTable`](crate::tracks::RefinedTable).
use std::fmt;
use std::str::FromStr;

use crate::geotaxis_errors::GeotaxisError;

/// Body-part category of a landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyPart {
    Arm,
    Chip,
}

impl BodyPart {
    /// Spelling used in raw exports and persisted tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Arm => "arm",
            BodyPart::Chip => "chip",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyPart {
    type Err = GeotaxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arm" => Ok(BodyPart::Arm),
            "chip" => Ok(BodyPart::Chip),
            other => Err(GeotaxisError::InvalidParameter(format!(
                "unknown body part '{other}'"
            ))),
        }
    }
}

/// Image axis of a coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    X,
    Y,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::X => "x",
            Dimension::Y => "y",
        }
    }
}

impl FromStr for Dimension {
    type Err = GeotaxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Dimension::X),
            "y" => Ok(Dimension::Y),
            other => Err(GeotaxisError::InvalidParameter(format!(
                "unknown dimension '{other}'"
            ))),
        }
    }
}

/// Composite `(body part, index)` key of a landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LandmarkKey {
    pub body_part: BodyPart,
    pub part_index: u8,
}

impl LandmarkKey {
    pub fn new(body_part: BodyPart, part_index: u8) -> Self {
        Self {
            body_part,
            part_index,
        }
    }

    pub fn arm(part_index: u8) -> Self {
        Self::new(BodyPart::Arm, part_index)
    }

    pub fn chip(part_index: u8) -> Self {
        Self::new(BodyPart::Chip, part_index)
    }

    /// Landmark name as written by the pose estimator, e.g. `"arm3"`.
    pub fn name(&self) -> String {
        format!("{}{}", self.body_part, self.part_index)
    }
}

impl fmt::Display for LandmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.body_part, self.part_index)
    }
}
