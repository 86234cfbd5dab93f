//! # Landmark tracks: repair and normalization
//!
//! Turns the raw per-landmark coordinate streams of one video sequence into a
//! **refined table**: outliers repaired, orientation corrected, and organized by an explicit
//! composite key.
//!
//! Modules
//! -----------------
//! * [`outliers`](crate::tracks::outliers) – Tukey-fence detection and linear repair of jumps.
//! * [`normalizer`](crate::tracks::normalizer) – Raw source → [`RefinedTable`] for a set of
//!   landmarks, with vertical flip and frame-rate timing.
//!
//! Data Model
//! -----------------
//! * **Key:** [`LandmarkKey`] = `(BodyPart, part_index)`.
//! * **Value:** [`RefinedTrack`] = frame numbers, times and both coordinate arrays. Holding
//!   `x` and `y` side by side guarantees that both dimensions cover the same frames.
//! * **Row view:** [`RefinedRow`] = the long-format row
//!   `(body_part, part_index, dimension, frame) → coord_pix` used for persistence.
//!
//! Lookups go through `(key, dimension)` for a whole array or `(key, dimension, frame)` for a
//! single value; nothing relies on row order.
use std::collections::{BTreeMap, BTreeSet};

use ahash::RandomState;

use crate::constants::{FastHashMap, FrameNumber, Pixel, Seconds};
use crate::geotaxis_errors::GeotaxisError;
use crate::landmarks::{BodyPart, Dimension, LandmarkKey};

pub mod normalizer;
pub mod outliers;

/// Refined coordinates of one landmark.
#[derive(Debug, Clone)]
pub struct RefinedTrack {
    frames: Vec<FrameNumber>,
    time_s: Vec<Seconds>,
    x: Vec<Pixel>,
    y: Vec<Pixel>,
    by_frame: FastHashMap<FrameNumber, usize>,
}

impl PartialEq for RefinedTrack {
    fn eq(&self, other: &Self) -> bool {
        self.frames == other.frames
            && self.time_s == other.time_s
            && self.x == other.x
            && self.y == other.y
    }
}

impl RefinedTrack {
    /// Build a track from aligned columns.
    ///
    /// Return
    /// ----------
    /// * `Err(GeotaxisError::LengthMismatch)` if `x` and `y` differ in length,
    /// * `Err(GeotaxisError::InvalidParameter)` if `frames`/`time_s` do not match the
    ///   coordinates or a frame number is repeated.
    pub fn new(
        frames: Vec<FrameNumber>,
        time_s: Vec<Seconds>,
        x: Vec<Pixel>,
        y: Vec<Pixel>,
    ) -> Result<Self, GeotaxisError> {
        if x.len() != y.len() {
            return Err(GeotaxisError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if frames.len() != x.len() || time_s.len() != x.len() {
            return Err(GeotaxisError::InvalidParameter(format!(
                "track columns disagree: {} frames, {} times, {} points",
                frames.len(),
                time_s.len(),
                x.len()
            )));
        }

        let mut by_frame =
            FastHashMap::with_capacity_and_hasher(frames.len(), RandomState::default());
        for (i, &f) in frames.iter().enumerate() {
            if by_frame.insert(f, i).is_some() {
                return Err(GeotaxisError::InvalidParameter(format!(
                    "frame {f} appears twice in a track"
                )));
            }
        }

        Ok(Self {
            frames,
            time_s,
            x,
            y,
            by_frame,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[FrameNumber] {
        &self.frames
    }

    pub fn time_s(&self) -> &[Seconds] {
        &self.time_s
    }

    pub fn x(&self) -> &[Pixel] {
        &self.x
    }

    pub fn y(&self) -> &[Pixel] {
        &self.y
    }

    pub fn coords(&self, dim: Dimension) -> &[Pixel] {
        match dim {
            Dimension::X => &self.x,
            Dimension::Y => &self.y,
        }
    }

    /// `(x, y)` at `frame`, if the landmark was tracked on that frame.
    #[inline]
    pub fn position(&self, frame: FrameNumber) -> Option<(Pixel, Pixel)> {
        self.by_frame.get(&frame).map(|&i| (self.x[i], self.y[i]))
    }
}

/// One row of the long-format refined table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedRow {
    pub body_part: BodyPart,
    pub part_index: u8,
    pub dim: Dimension,
    pub frame: FrameNumber,
    pub time_s: Seconds,
    pub coord_pix: Pixel,
}

/// Refined coordinates of one sequence, keyed by landmark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefinedTable {
    tracks: BTreeMap<LandmarkKey, RefinedTrack>,
}

impl RefinedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the track of a landmark.
    pub fn insert(&mut self, key: LandmarkKey, track: RefinedTrack) {
        self.tracks.insert(key, track);
    }

    pub fn track(&self, key: &LandmarkKey) -> Option<&RefinedTrack> {
        self.tracks.get(key)
    }

    /// Whole coordinate array of `key` along `dim`.
    pub fn coords(&self, key: &LandmarkKey, dim: Dimension) -> Option<&[Pixel]> {
        self.tracks.get(key).map(|t| t.coords(dim))
    }

    /// Single value addressed by the full composite key.
    pub fn value(&self, key: &LandmarkKey, dim: Dimension, frame: FrameNumber) -> Option<Pixel> {
        self.tracks
            .get(key)
            .and_then(|t| t.position(frame))
            .map(|(x, y)| match dim {
                Dimension::X => x,
                Dimension::Y => y,
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &LandmarkKey> {
        self.tracks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LandmarkKey, &RefinedTrack)> {
        self.tracks.iter()
    }

    pub fn number_of_landmarks(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Number of long-format rows (`2 × frames` per landmark).
    pub fn n_rows(&self) -> usize {
        self.tracks.values().map(|t| 2 * t.len()).sum()
    }

    /// Long-format rows: per landmark, the `x` block followed by the `y` block.
    pub fn rows(&self) -> impl Iterator<Item = RefinedRow> + '_ {
        self.tracks.iter().flat_map(|(key, track)| {
            [Dimension::X, Dimension::Y].into_iter().flat_map(move |dim| {
                track
                    .frames()
                    .iter()
                    .zip(track.time_s())
                    .zip(track.coords(dim))
                    .map(move |((&frame, &time_s), &coord_pix)| RefinedRow {
                        body_part: key.body_part,
                        part_index: key.part_index,
                        dim,
                        frame,
                        time_s,
                        coord_pix,
                    })
            })
        })
    }

    /// Rebuild a table from long-format rows in any order.
    ///
    /// Return
    /// ----------
    /// * `Err(GeotaxisError::IncompleteTrack)` if a landmark's `x` and `y` rows do not cover
    ///   the same frame numbers,
    /// * `Err(GeotaxisError::InvalidParameter)` if the same `(key, dim, frame)` appears twice.
    pub fn from_rows<I>(rows: I) -> Result<Self, GeotaxisError>
    where
        I: IntoIterator<Item = RefinedRow>,
    {
        type DimRows = BTreeMap<FrameNumber, (Seconds, Pixel)>;
        let mut grouped: BTreeMap<LandmarkKey, (DimRows, DimRows)> = BTreeMap::new();

        for row in rows {
            let key = LandmarkKey::new(row.body_part, row.part_index);
            let entry = grouped.entry(key).or_default();
            let target = match row.dim {
                Dimension::X => &mut entry.0,
                Dimension::Y => &mut entry.1,
            };
            if target
                .insert(row.frame, (row.time_s, row.coord_pix))
                .is_some()
            {
                return Err(GeotaxisError::InvalidParameter(format!(
                    "duplicate row for {key} {} frame {}",
                    row.dim.as_str(),
                    row.frame
                )));
            }
        }

        let mut table = RefinedTable::new();
        for (key, (xs, ys)) in grouped {
            let fx: BTreeSet<_> = xs.keys().collect();
            let fy: BTreeSet<_> = ys.keys().collect();
            if fx != fy {
                return Err(GeotaxisError::IncompleteTrack(key.name()));
            }

            let frames: Vec<FrameNumber> = xs.keys().copied().collect();
            let time_s: Vec<Seconds> = xs.values().map(|&(t, _)| t).collect();
            let x: Vec<Pixel> = xs.values().map(|&(_, v)| v).collect();
            let y: Vec<Pixel> = ys.values().map(|&(_, v)| v).collect();
            table.insert(key, RefinedTrack::new(frames, time_s, x, y)?);
        }

        Ok(table)
    }
}
