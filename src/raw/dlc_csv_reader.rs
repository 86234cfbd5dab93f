//! # DeepLabCut CSV reader
//!
//! Parses the CSV export written by DeepLabCut next to its `.h5` output into a
//! [`RawCoordinateFrame`].
//!
//! ## Expected layout
//! -----------------
//! ```text
//! scorer,DLC_resnet50_seastarJul14shuffle1_100000,DLC_resnet50_...,...
//! bodyparts,arm1,arm1,arm1,chip1,chip1,chip1,...
//! coords,x,y,likelihood,x,y,likelihood,...
//! 0,412.3,188.0,0.998,398.1,240.7,0.999,...
//! 1,412.9,187.4,0.997,398.0,240.9,0.999,...
//! ```
//!
//! * An optional `individuals` row (multi-animal projects) between `scorer` and
//!   `bodyparts` is skipped.
//! * The first column of every data row is the frame number.
//! * Empty cells (untracked points) become `NaN`.
//! * Every landmark needs an `x` and a `y` column; `likelihood` is optional.
//!
//! ## Error Handling
//! -----------------
//! Layout problems surface as [`GeotaxisError::RawParsing`] with a [`ParseRawError`]
//! payload carrying the offending line/column; I/O and CSV-level failures are wrapped
//! as [`GeotaxisError::Io`] / [`GeotaxisError::Csv`].
use std::collections::BTreeMap;
use std::fs::File;
use std::io;

use camino::Utf8Path;
use csv::{ReaderBuilder, StringRecord, StringRecordsIter, Trim};

use super::{ParseRawError, RawCoordinateFrame, RawLandmark};
use crate::constants::FrameNumber;
use crate::geotaxis_errors::GeotaxisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coord {
    X,
    Y,
    Likelihood,
}

#[derive(Debug, Default)]
struct LandmarkColumns {
    x: Option<usize>,
    y: Option<usize>,
    likelihood: Option<usize>,
}

/// Read a DeepLabCut CSV export from `path`.
pub(crate) fn read_dlc_csv_file(path: &Utf8Path) -> Result<RawCoordinateFrame, GeotaxisError> {
    let file = File::open(path)?;
    read_dlc_csv(file)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

fn next_record<R: io::Read>(
    records: &mut StringRecordsIter<'_, R>,
    label: &'static str,
) -> Result<StringRecord, GeotaxisError> {
    match records.next() {
        Some(rec) => Ok(rec?),
        None => Err(ParseRawError::MissingHeader(label).into()),
    }
}

fn expect_label(record: &StringRecord, label: &'static str) -> Result<(), GeotaxisError> {
    if record.get(0) == Some(label) {
        Ok(())
    } else {
        Err(ParseRawError::MissingHeader(label).into())
    }
}

fn parse_frame(record: &StringRecord) -> Result<FrameNumber, ParseRawError> {
    let raw = record.get(0).unwrap_or_default();
    if let Ok(f) = raw.parse::<FrameNumber>() {
        return Ok(f);
    }
    // Some exports write the index as a float ("12.0").
    match raw.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= FrameNumber::MAX as f64 => {
            Ok(v as FrameNumber)
        }
        _ => Err(ParseRawError::InvalidFrameNumber {
            line: line_of(record),
            value: raw.to_string(),
        }),
    }
}

fn parse_value(record: &StringRecord, column: usize) -> Result<f64, ParseRawError> {
    let raw = record.get(column).unwrap_or_default();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| ParseRawError::InvalidValue {
        line: line_of(record),
        column,
        value: raw.to_string(),
    })
}

/// Parse a DeepLabCut CSV export from any reader.
///
/// Arguments
/// -----------------
/// * `reader` – Source of the CSV text.
///
/// Return
/// ----------
/// * The parsed [`RawCoordinateFrame`], landmarks keyed by their body-part name
///   (`"arm1"`, `"chip3"`, …).
pub fn read_dlc_csv<R: io::Read>(reader: R) -> Result<RawCoordinateFrame, GeotaxisError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = rdr.records();

    let scorer_row = next_record(&mut records, "scorer")?;
    expect_label(&scorer_row, "scorer")?;

    let mut parts_row = next_record(&mut records, "bodyparts")?;
    if parts_row.get(0) == Some("individuals") {
        parts_row = next_record(&mut records, "bodyparts")?;
    }
    expect_label(&parts_row, "bodyparts")?;

    let coords_row = next_record(&mut records, "coords")?;
    expect_label(&coords_row, "coords")?;

    let width = coords_row.len();
    if parts_row.len() != width {
        return Err(ParseRawError::RowLength {
            line: line_of(&parts_row),
            expected: width,
            found: parts_row.len(),
        }
        .into());
    }

    // Column layout: landmark name -> column indices of x / y / likelihood.
    let mut layout: BTreeMap<String, LandmarkColumns> = BTreeMap::new();
    for col in 1..width {
        let name = parts_row.get(col).unwrap_or_default();
        let coord = match coords_row.get(col).unwrap_or_default() {
            "x" => Coord::X,
            "y" => Coord::Y,
            "likelihood" => Coord::Likelihood,
            other => return Err(ParseRawError::UnknownCoord(other.to_string()).into()),
        };
        let entry = layout.entry(name.to_string()).or_default();
        match coord {
            Coord::X => entry.x = Some(col),
            Coord::Y => entry.y = Some(col),
            Coord::Likelihood => entry.likelihood = Some(col),
        }
    }

    let mut frames: Vec<FrameNumber> = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); width];
    for rec in records {
        let rec = rec?;
        if rec.iter().all(str::is_empty) {
            continue;
        }
        if rec.len() != width {
            return Err(ParseRawError::RowLength {
                line: line_of(&rec),
                expected: width,
                found: rec.len(),
            }
            .into());
        }
        frames.push(parse_frame(&rec)?);
        for (col, column) in values.iter_mut().enumerate().skip(1) {
            column.push(parse_value(&rec, col)?);
        }
    }

    let scorer = scorer_row.get(1).unwrap_or_default();
    let mut raw = RawCoordinateFrame::new(scorer, frames);
    for (name, cols) in layout {
        let x_col = cols.x.ok_or_else(|| ParseRawError::MissingCoordinate {
            landmark: name.clone(),
            coord: "x",
        })?;
        let y_col = cols.y.ok_or_else(|| ParseRawError::MissingCoordinate {
            landmark: name.clone(),
            coord: "y",
        })?;
        let landmark = RawLandmark {
            x: std::mem::take(&mut values[x_col]),
            y: std::mem::take(&mut values[y_col]),
            likelihood: cols.likelihood.map(|c| std::mem::take(&mut values[c])),
        };
        raw.insert_landmark(name, landmark)?;
    }

    Ok(raw)
}

#[cfg(test)]
mod dlc_csv_test {
    use super::*;
    use crate::landmarks::LandmarkKey;

    const SAMPLE: &str = "\
scorer,DLC_net,DLC_net,DLC_net,DLC_net,DLC_net,DLC_net
bodyparts,arm1,arm1,arm1,chip1,chip1,chip1
coords,x,y,likelihood,x,y,likelihood
0,10.5,20.0,0.99,1.0,2.0,0.98
1,11.5,21.0,0.97,,2.5,0.10
";

    #[test]
    fn test_read_sample() {
        let raw = read_dlc_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(raw.scorer(), "DLC_net");
        assert_eq!(raw.frames(), &[0, 1]);
        let (x, y) = raw.landmark_xy(&LandmarkKey::arm(1)).unwrap();
        assert_eq!(x, &[10.5, 11.5]);
        assert_eq!(y, &[20.0, 21.0]);
        let chip = raw.landmark("chip1").unwrap();
        assert!(chip.x[1].is_nan());
        assert_eq!(chip.likelihood.as_deref(), Some(&[0.98, 0.10][..]));
    }

    #[test]
    fn test_individuals_row_is_skipped() {
        let text = "\
scorer,net,net
individuals,star,star
bodyparts,arm1,arm1
coords,x,y
0,1,2
";
        let raw = read_dlc_csv(text.as_bytes()).unwrap();
        assert_eq!(raw.landmark("arm1").unwrap().likelihood, None);
    }

    #[test]
    fn test_missing_landmark_is_reported() {
        let raw = read_dlc_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            raw.landmark_xy(&LandmarkKey::arm(2)).unwrap_err(),
            GeotaxisError::LandmarkNotFound("arm2".into())
        );
    }

    #[test]
    fn test_bad_value() {
        let text = "\
scorer,net,net
bodyparts,arm1,arm1
coords,x,y
0,1,abc
";
        let err = read_dlc_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            GeotaxisError::RawParsing(ParseRawError::InvalidValue { column: 2, .. })
        ));
    }

    #[test]
    fn test_missing_coords_header() {
        let text = "scorer,net\nbodyparts,arm1\n";
        assert_eq!(
            read_dlc_csv(text.as_bytes()).unwrap_err(),
            GeotaxisError::RawParsing(ParseRawError::MissingHeader("coords"))
        );
    }

    #[test]
    fn test_missing_y_column() {
        let text = "\
scorer,net
bodyparts,arm1
coords,x
0,1
";
        assert_eq!(
            read_dlc_csv(text.as_bytes()).unwrap_err(),
            GeotaxisError::RawParsing(ParseRawError::MissingCoordinate {
                landmark: "arm1".into(),
                coord: "y"
            })
        );
    }
}
