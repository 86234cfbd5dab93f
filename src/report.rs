//! # Sequence summary report
//!
//! Condenses a directory of derived tables into one row per sequence, ordered by the slope
//! angle of the arena, so trajectories recorded at different slopes can be compared at a
//! glance or laid out side by side on a common scale.
//!
//! ## Overview
//! -----------------
//! * [`summarize_table`] – summary of one in-memory [`DerivedTable`].
//! * [`summarize_sequences`] – loads every derived file of a directory, resolves its slope
//!   angle through the catalog and builds a [`SequenceReport`].
//! * [`SequenceReport`] – the summaries plus the common **axis span**
//!   `max(range_x, range_y) · (1 + 2·buffer)` over all sequences. Its `Display` renders a
//!   `comfy-table` table.
//!
//! All presentation settings live in an explicit [`ReportConfig`] value.
//!
//! ## Example
//! -----------------
//! ```rust,no_run
//! use camino::Utf8Path;
//! use geotaxis::catalog::SequenceCatalog;
//! use geotaxis::report::{summarize_sequences, ReportConfig};
//!
//! let catalog = SequenceCatalog::from_csv(Utf8Path::new("catalog.csv")).unwrap();
//! let config = ReportConfig::default().with_precision(1);
//! let report = summarize_sequences(Utf8Path::new("derived"), &catalog, &config).unwrap();
//! println!("{report}");
//! ```
use std::cmp::Ordering;
use std::fmt;

use camino::Utf8Path;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};
use itertools::Itertools;
use tracing::debug;

use crate::catalog::{CatalogField, CatalogLookup};
use crate::constants::{Degree, Pixel, Radian, Seconds, DERIVED_SUFFIX};
use crate::geotaxis_errors::GeotaxisError;
use crate::kinematics::DerivedTable;
use crate::pipeline::{list_inputs, SequenceId};
use crate::storage::read_derived;

/// Order of the report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Shallowest slope first.
    #[default]
    AngleAscending,
    AngleDescending,
}

/// Presentation settings of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// File-name suffix of derived tables.
    pub derived_suffix: String,
    /// Margin added on both sides of the common axis span, as a fraction of the range.
    pub axis_buffer: f64,
    /// Decimal digits of the rendered numbers.
    pub precision: usize,
    pub order: SortOrder,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            derived_suffix: DERIVED_SUFFIX.to_string(),
            axis_buffer: 0.05,
            precision: 2,
            order: SortOrder::AngleAscending,
        }
    }
}

impl ReportConfig {
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.derived_suffix = suffix.into();
        self
    }

    pub fn with_axis_buffer(mut self, buffer: f64) -> Self {
        self.axis_buffer = buffer;
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// Summary of one derived sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSummary {
    pub name: String,
    pub id: SequenceId,
    pub angle_deg: Option<Degree>,
    pub frames: usize,
    pub duration_s: Seconds,
    /// `(min, max)` of the smoothed centroid `x`.
    pub x_extent: (Pixel, Pixel),
    /// `(min, max)` of the smoothed centroid `y`.
    pub y_extent: (Pixel, Pixel),
    pub mean_speed: f64,
    pub max_speed: f64,
    pub total_displacement: Pixel,
    /// `(min, max)` of the orientation heading.
    pub heading_extent: (Radian, Radian),
}

impl SequenceSummary {
    /// Largest of the `x` and `y` ranges.
    pub fn max_range(&self) -> Pixel {
        (self.x_extent.1 - self.x_extent.0).max(self.y_extent.1 - self.y_extent.0)
    }
}

fn extent(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .copied()
        .minmax()
        .into_option()
        .unwrap_or((0.0, 0.0))
}

/// Summarize one derived table.
pub fn summarize_table(
    name: impl Into<String>,
    id: SequenceId,
    angle_deg: Option<Degree>,
    table: &DerivedTable,
) -> SequenceSummary {
    let duration_s = match (table.time_s.first(), table.time_s.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    };
    let mean_speed = if table.spd_pixs.is_empty() {
        0.0
    } else {
        table.spd_pixs.iter().sum::<f64>() / table.spd_pixs.len() as f64
    };

    SequenceSummary {
        name: name.into(),
        id,
        angle_deg,
        frames: table.len(),
        duration_s,
        x_extent: extent(&table.x_cntr_pix),
        y_extent: extent(&table.y_cntr_pix),
        mean_speed,
        max_speed: table.spd_pixs.iter().copied().fold(0.0, f64::max),
        total_displacement: table.displ_pix.last().copied().unwrap_or(0.0),
        heading_extent: extent(&table.head_rad),
    }
}

/// Summaries of a set of sequences and their common axis span.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceReport {
    pub summaries: Vec<SequenceSummary>,
    /// Side length (pixels) of a square axis box that fits every trajectory.
    pub axis_span: Pixel,
    precision: usize,
}

fn compare_angle(a: Option<Degree>, b: Option<Degree>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl SequenceReport {
    /// Order `summaries` and compute the axis span.
    ///
    /// Sequences without an angle come last; equal angles are ordered by name.
    pub fn new(mut summaries: Vec<SequenceSummary>, config: &ReportConfig) -> Self {
        summaries.sort_by(|a, b| {
            let by_angle = match config.order {
                SortOrder::AngleAscending => compare_angle(a.angle_deg, b.angle_deg),
                SortOrder::AngleDescending => match (a.angle_deg, b.angle_deg) {
                    (Some(x), Some(y)) => y.total_cmp(&x),
                    _ => compare_angle(a.angle_deg, b.angle_deg),
                },
            };
            by_angle.then_with(|| a.name.cmp(&b.name))
        });

        let max_range = summaries
            .iter()
            .map(SequenceSummary::max_range)
            .fold(0.0, f64::max);

        Self {
            summaries,
            axis_span: max_range * (1.0 + 2.0 * config.axis_buffer),
            precision: config.precision,
        }
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

/// Load and summarize every derived table of `derived_dir`.
///
/// Arguments
/// -----------------
/// * `derived_dir` – Directory holding `*_derived.parquet` files.
/// * `catalog` – Source of the slope angle (`angle_deg`) of each sequence.
/// * `config` – Suffix, axis buffer, precision and ordering.
///
/// Return
/// ----------
/// * The ordered [`SequenceReport`]; a sequence missing from the catalog is a
///   [`GeotaxisError::CatalogMatch`].
pub fn summarize_sequences<C: CatalogLookup + ?Sized>(
    derived_dir: &Utf8Path,
    catalog: &C,
    config: &ReportConfig,
) -> Result<SequenceReport, GeotaxisError> {
    let files = list_inputs(derived_dir, &config.derived_suffix)?;

    let mut summaries = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_name()
            .ok_or_else(|| GeotaxisError::InvalidFileName(path.to_string()))?;
        let id = SequenceId::from_table_name(name)?;
        let angle = catalog
            .value(&id.date, id.sequence, CatalogField::AngleDeg)?
            .as_f64();
        let table = read_derived(&path)?;
        debug!(sequence = %id, frames = table.len(), "derived table summarized");
        summaries.push(summarize_table(name, id, angle, &table));
    }

    Ok(SequenceReport::new(summaries, config))
}

impl fmt::Display for SequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.precision;
        let num = |v: f64| Cell::new(format!("{v:.p$}")).set_alignment(CellAlignment::Right);
        let range = |(lo, hi): (f64, f64)| {
            Cell::new(format!("{lo:.p$} .. {hi:.p$}")).set_alignment(CellAlignment::Right)
        };

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Sequence"),
            Cell::new("Angle [deg]"),
            Cell::new("Frames"),
            Cell::new("Duration [s]"),
            Cell::new("x [pix]"),
            Cell::new("y [pix]"),
            Cell::new("Mean speed [pix/s]"),
            Cell::new("Max speed [pix/s]"),
            Cell::new("Path [pix]"),
            Cell::new("Heading [rad]"),
        ]);

        for s in &self.summaries {
            let angle = s
                .angle_deg
                .map_or_else(|| "-".to_string(), |a| format!("{a:.p$}"));
            table.add_row(Row::from(vec![
                Cell::new(&s.name),
                Cell::new(angle).set_alignment(CellAlignment::Right),
                Cell::new(s.frames).set_alignment(CellAlignment::Right),
                num(s.duration_s),
                range(s.x_extent),
                range(s.y_extent),
                num(s.mean_speed),
                num(s.max_speed),
                num(s.total_displacement),
                range(s.heading_extent),
            ]));
        }

        writeln!(f, "{table}")?;
        write!(f, "Common axis span: {:.p$} pix", self.axis_span)
    }
}

#[cfg(test)]
mod report_test {
    use super::*;
    use approx::assert_relative_eq;

    fn summary(name: &str, angle: Option<f64>, x: (f64, f64), y: (f64, f64)) -> SequenceSummary {
        SequenceSummary {
            name: name.to_string(),
            id: SequenceId::from_table_name(name).unwrap(),
            angle_deg: angle,
            frames: 10,
            duration_s: 9.0,
            x_extent: x,
            y_extent: y,
            mean_speed: 1.0,
            max_speed: 2.0,
            total_displacement: 9.0,
            heading_extent: (0.0, 1.0),
        }
    }

    #[test]
    fn test_order_and_axis_span() {
        let summaries = vec![
            summary("2021-07-14_02_derived.parquet", Some(45.0), (0.0, 100.0), (0.0, 50.0)),
            summary("2021-07-14_01_derived.parquet", None, (0.0, 10.0), (0.0, 10.0)),
            summary("2021-07-15_01_derived.parquet", Some(15.0), (10.0, 30.0), (0.0, 200.0)),
            summary("2021-07-13_05_derived.parquet", Some(45.0), (0.0, 1.0), (0.0, 1.0)),
        ];
        let report = SequenceReport::new(summaries, &ReportConfig::default());
        let names: Vec<&str> = report.summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "2021-07-15_01_derived.parquet",
                "2021-07-13_05_derived.parquet",
                "2021-07-14_02_derived.parquet",
                "2021-07-14_01_derived.parquet",
            ]
        );
        assert_relative_eq!(report.axis_span, 200.0 * 1.1, epsilon = 1e-9);
    }

    #[test]
    fn test_descending_order_keeps_missing_angles_last() {
        let summaries = vec![
            summary("2021-07-14_01_derived.parquet", None, (0.0, 1.0), (0.0, 1.0)),
            summary("2021-07-14_02_derived.parquet", Some(15.0), (0.0, 1.0), (0.0, 1.0)),
            summary("2021-07-14_03_derived.parquet", Some(60.0), (0.0, 1.0), (0.0, 1.0)),
        ];
        let config = ReportConfig::default().with_order(SortOrder::AngleDescending);
        let report = SequenceReport::new(summaries, &config);
        let angles: Vec<Option<f64>> = report.summaries.iter().map(|s| s.angle_deg).collect();
        assert_eq!(angles, vec![Some(60.0), Some(15.0), None]);
    }

    #[test]
    fn test_summarize_table() {
        let table = DerivedTable {
            fr_num: vec![0, 1, 2],
            time_s: vec![0.0, 0.5, 1.0],
            x_cntr_pix: vec![0.0, 3.0, 3.0],
            y_cntr_pix: vec![0.0, 4.0, 6.0],
            x_arm_pix: Default::default(),
            y_arm_pix: Default::default(),
            arm_ids: vec![[1, 2, 3, 4, 5]; 3],
            head_rad: vec![-0.5, 0.0, 0.25],
            spd_pixs: vec![10.0, 4.0, 4.0],
            displ_pix: vec![0.0, 5.0, 7.0],
            t_head_disp: vec![],
            head_disp_rad: vec![],
        };
        let s = summarize_table(
            "2021-07-14_03_derived.parquet",
            SequenceId::new("2021-07-14", 3),
            Some(30.0),
            &table,
        );
        assert_eq!(s.frames, 3);
        assert_relative_eq!(s.duration_s, 1.0);
        assert_eq!(s.x_extent, (0.0, 3.0));
        assert_eq!(s.y_extent, (0.0, 6.0));
        assert_relative_eq!(s.mean_speed, 6.0);
        assert_relative_eq!(s.max_speed, 10.0);
        assert_relative_eq!(s.total_displacement, 7.0);
        assert_eq!(s.heading_extent, (-0.5, 0.25));
        assert_relative_eq!(s.max_range(), 6.0);
    }

    #[test]
    fn test_display_contains_rows() {
        let report = SequenceReport::new(
            vec![summary("2021-07-14_02_derived.parquet", Some(45.0), (0.0, 1.0), (0.0, 1.0))],
            &ReportConfig::default(),
        );
        let text = report.to_string();
        assert!(text.contains("2021-07-14_02_derived.parquet"));
        assert!(text.contains("45.00"));
        assert!(text.contains("Common axis span: 1.10 pix"));
    }
}
