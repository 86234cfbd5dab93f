//! # Sequence catalog
//!
//! The experiment log (one CSV row per recorded sequence) provides the metadata the
//! pipelines cannot infer from coordinates: camera orientation, region-of-interest height,
//! and the slope angle of the arena.
//!
//! ## Expected columns
//! -----------------
//! * `date` – ISO date of the session (`YYYY-MM-DD`), matched verbatim against file names,
//! * `trial_num` – sequence number within the session,
//! * `orientation` – `0` when the frame must be flipped vertically,
//! * `roi_h` – height of the region of interest (pixels),
//! * `angle_deg` – slope angle of the arena (degrees).
//!
//! Other columns are ignored. Numeric cells that do not parse are read as empty. Rows after
//! the first row with an empty `date` are ignored (the log keeps free-form notes below the
//! data).
//!
//! ## Lookup
//! -----------------
//! [`CatalogLookup::lookup`] is an exact match on `(date, trial_num)` and must find exactly
//! one row; zero or several matches is a [`GeotaxisError::CatalogMatch`]. Individual fields
//! are read through the closed [`CatalogField`] enum, never by column-name strings.
use std::fs::File;
use std::io;

use camino::Utf8Path;
use serde::Deserialize;
use tracing::debug;

use crate::constants::{Degree, Pixel};
use crate::geotaxis_errors::GeotaxisError;

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(default)]
    date: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    trial_num: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    orientation: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    roi_h: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    angle_deg: Option<f64>,
}

/// Metadata of one recorded sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceCatalogEntry {
    pub date: String,
    pub trial_num: u32,
    pub orientation: Option<i64>,
    pub roi_height: Option<Pixel>,
    pub angle_deg: Option<Degree>,
}

/// Recognized catalog columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogField {
    Date,
    TrialNum,
    Orientation,
    RoiHeight,
    AngleDeg,
}

impl CatalogField {
    /// Column header in the catalog CSV.
    pub fn column_name(&self) -> &'static str {
        match self {
            CatalogField::Date => "date",
            CatalogField::TrialNum => "trial_num",
            CatalogField::Orientation => "orientation",
            CatalogField::RoiHeight => "roi_h",
            CatalogField::AngleDeg => "angle_deg",
        }
    }
}

/// Typed value of a catalog cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Missing,
}

impl CatalogValue {
    /// Numeric view of the value (`Integer` and `Number` only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CatalogValue::Integer(i) => Some(*i as f64),
            CatalogValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl SequenceCatalogEntry {
    pub fn get(&self, field: CatalogField) -> CatalogValue {
        match field {
            CatalogField::Date => CatalogValue::Text(self.date.clone()),
            CatalogField::TrialNum => CatalogValue::Integer(self.trial_num as i64),
            CatalogField::Orientation => self
                .orientation
                .map_or(CatalogValue::Missing, CatalogValue::Integer),
            CatalogField::RoiHeight => self
                .roi_height
                .map_or(CatalogValue::Missing, CatalogValue::Number),
            CatalogField::AngleDeg => self
                .angle_deg
                .map_or(CatalogValue::Missing, CatalogValue::Number),
        }
    }

    /// Vertical flip height for this sequence.
    ///
    /// Orientation `0` means the video is upside down relative to the arena: the flip height is
    /// the ROI height. Any other orientation needs no flip (`0`).
    ///
    /// Return
    /// ----------
    /// * `Err(GeotaxisError::InvalidParameter)` when a flip is required but `roi_h` is empty.
    pub fn flip_height(&self) -> Result<Pixel, GeotaxisError> {
        match self.orientation {
            Some(0) => self.roi_height.ok_or_else(|| {
                GeotaxisError::InvalidParameter(format!(
                    "catalog row {} #{} needs a flip but has no roi_h",
                    self.date, self.trial_num
                ))
            }),
            _ => Ok(0.0),
        }
    }
}

/// Exact-match access to sequence metadata.
pub trait CatalogLookup {
    /// The single entry matching `(date, sequence)`.
    fn lookup(&self, date: &str, sequence: u32) -> Result<&SequenceCatalogEntry, GeotaxisError>;

    /// One field of the entry matching `(date, sequence)`.
    fn value(
        &self,
        date: &str,
        sequence: u32,
        field: CatalogField,
    ) -> Result<CatalogValue, GeotaxisError> {
        self.lookup(date, sequence).map(|e| e.get(field))
    }
}

/// In-memory sequence catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceCatalog {
    entries: Vec<SequenceCatalogEntry>,
}

impl SequenceCatalog {
    pub fn from_entries(entries: Vec<SequenceCatalogEntry>) -> Self {
        Self { entries }
    }

    /// Load the catalog CSV at `path`.
    pub fn from_csv(path: &Utf8Path) -> Result<Self, GeotaxisError> {
        if !path.is_file() {
            return Err(GeotaxisError::InputPath(format!(
                "catalog file not found: {path}"
            )));
        }
        Self::from_reader(File::open(path)?)
    }

    /// Parse catalog CSV text (with header row) from any reader.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, GeotaxisError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for record in rdr.deserialize::<CatalogRecord>() {
            let record = record?;
            let Some(date) = record.date.filter(|d| !d.is_empty()) else {
                break;
            };
            let Some(trial) = record.trial_num else {
                debug!(%date, "catalog row without trial number skipped");
                continue;
            };
            if trial.fract() != 0.0 || !(0.0..=u32::MAX as f64).contains(&trial) {
                debug!(%date, trial, "catalog row with invalid trial number skipped");
                continue;
            }
            entries.push(SequenceCatalogEntry {
                date,
                trial_num: trial as u32,
                orientation: record.orientation.map(|o| o as i64),
                roi_height: record.roi_h,
                angle_deg: record.angle_deg,
            });
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SequenceCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogLookup for SequenceCatalog {
    fn lookup(&self, date: &str, sequence: u32) -> Result<&SequenceCatalogEntry, GeotaxisError> {
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.date == date && e.trial_num == sequence);
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(entry),
            (first, _) => {
                let count = first.map_or(0, |_| 2 + matches.count());
                Err(GeotaxisError::CatalogMatch {
                    date: date.to_string(),
                    sequence,
                    matches: count,
                })
            }
        }
    }
}

#[cfg(test)]
mod catalog_test {
    use super::*;

    const CATALOG: &str = "\
date,trial_num,orientation,roi_h,angle_deg,notes
2021-07-14,3,0,720,30,ok
2021-07-14,4,1,720,45,
2021-07-15,1,0,n/a,60,bad roi
2021-07-16,2,1,700,15,
2021-07-16,2,1,700,15,duplicate
,,,,,
2022-01-01,9,1,1,1,after the blank row
";

    fn catalog() -> SequenceCatalog {
        SequenceCatalog::from_reader(CATALOG.as_bytes()).unwrap()
    }

    #[test]
    fn test_rows_stop_at_blank_date() {
        assert_eq!(catalog().len(), 5);
    }

    #[test]
    fn test_exact_lookup() {
        let cat = catalog();
        let entry = cat.lookup("2021-07-14", 4).unwrap();
        assert_eq!(entry.orientation, Some(1));
        assert_eq!(entry.flip_height().unwrap(), 0.0);
        assert_eq!(
            cat.lookup("2021-07-14", 3).unwrap().flip_height().unwrap(),
            720.0
        );
    }

    #[test]
    fn test_lookup_errors() {
        let cat = catalog();
        assert_eq!(
            cat.lookup("2021-07-14", 8).unwrap_err(),
            GeotaxisError::CatalogMatch {
                date: "2021-07-14".into(),
                sequence: 8,
                matches: 0
            }
        );
        assert_eq!(
            cat.lookup("2021-07-16", 2).unwrap_err(),
            GeotaxisError::CatalogMatch {
                date: "2021-07-16".into(),
                sequence: 2,
                matches: 2
            }
        );
        assert!(cat.lookup("2022-01-01", 9).is_err());
    }

    #[test]
    fn test_invalid_trial_numbers_are_skipped() {
        let text = "\
date,trial_num,orientation,roi_h,angle_deg
2021-07-14,3.7,1,720,30
2021-07-14,-1,1,720,30
2021-07-14,0,1,720,10
2021-07-14,3,1,720,45
";
        let cat = SequenceCatalog::from_reader(text.as_bytes()).unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.lookup("2021-07-14", 3).unwrap().angle_deg, Some(45.0));
        assert_eq!(cat.lookup("2021-07-14", 0).unwrap().angle_deg, Some(10.0));
    }

    #[test]
    fn test_unparsable_roi_requires_value_for_flip() {
        let cat = catalog();
        let entry = cat.lookup("2021-07-15", 1).unwrap();
        assert_eq!(entry.roi_height, None);
        assert!(entry.flip_height().is_err());
    }

    #[test]
    fn test_typed_field_access() {
        let cat = catalog();
        assert_eq!(
            cat.value("2021-07-14", 3, CatalogField::AngleDeg).unwrap(),
            CatalogValue::Number(30.0)
        );
        assert_eq!(
            cat.value("2021-07-14", 3, CatalogField::Date).unwrap(),
            CatalogValue::Text("2021-07-14".into())
        );
        assert_eq!(CatalogField::RoiHeight.column_name(), "roi_h");
    }
}
