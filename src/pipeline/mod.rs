//! # Batch pipelines
//!
//! Directory-level drivers of the two processing stages:
//!
//! * [`refine`] – raw DeepLabCut exports → refined Parquet tables,
//! * [`derive`] – refined Parquet tables → derived Parquet tables.
//!
//! Both stages share the machinery of this module:
//!
//! * **Discovery** ([`list_inputs`]): every regular file of a directory whose name ends with
//!   the configured suffix, in lexicographic order. A missing directory or an empty match
//!   is a [`GeotaxisError::InputPath`].
//! * **Naming** ([`SequenceId`]): raw exports are named
//!   `<YYYY-MM-DD>_<seq>DLC_<scorer>...filtered.csv`; refined tables are written as
//!   `<date>_<seq:02>_refined.parquet` and derived tables keep the 13-character
//!   `<date>_<seq>` prefix: `<date>_<seq:02>_derived.parquet`.
//! * **Failure policy** ([`BatchPolicy`]): fail fast (default) or log and continue, the
//!   failures being returned in the [`BatchOutcome`].
//!
//! Files are processed one at a time; an output file is only written once its table is
//! completely computed.
//!
//! ### Progress UI (feature: `progress`)
//! With the `progress` feature, batches render an `indicatif` bar with per-file timing.
use std::fmt;
use std::fs;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use tracing::warn;

use crate::constants::{
    DATE_LEN, DERIVED_SUFFIX, MAX_SEQUENCE, REFINED_SUFFIX, SEQUENCE_PREFIX_LEN,
};
use crate::geotaxis_errors::GeotaxisError;
use crate::params::BatchPolicy;

pub mod derive;
pub mod refine;

#[cfg(feature = "progress")]
pub(crate) mod progress_bar;

pub use derive::{derive_all, derive_file};
pub use refine::{refine_all, refine_file};

static RAW_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<date>.{10}).(?P<seq>\d+)DLC").expect("valid raw file name pattern")
});

/// `(date, sequence)` pair identifying one recorded sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId {
    pub date: String,
    pub sequence: u32,
}

impl SequenceId {
    pub fn new(date: impl Into<String>, sequence: u32) -> Self {
        Self {
            date: date.into(),
            sequence,
        }
    }

    /// Parse a raw export name: date = first 10 characters, sequence = the digits between
    /// character 11 and the `DLC` marker.
    ///
    /// Table names keep a two-digit sequence field, so sequences above 99 are rejected with
    /// [`GeotaxisError::InvalidFileName`].
    ///
    /// ```rust
    /// use geotaxis::pipeline::SequenceId;
    ///
    /// let id = SequenceId::from_raw_name("2021-07-14_3DLC_resnet50_starJul14shuffle1_filtered.csv")
    ///     .unwrap();
    /// assert_eq!(id, SequenceId::new("2021-07-14", 3));
    /// assert_eq!(id.refined_file_name(), "2021-07-14_03_refined.parquet");
    /// ```
    pub fn from_raw_name(name: &str) -> Result<Self, GeotaxisError> {
        let caps = RAW_NAME
            .captures(name)
            .ok_or_else(|| GeotaxisError::InvalidFileName(name.to_string()))?;
        let sequence = caps["seq"]
            .parse::<u32>()
            .ok()
            .filter(|&seq| seq <= MAX_SEQUENCE)
            .ok_or_else(|| GeotaxisError::InvalidFileName(name.to_string()))?;
        Ok(Self::new(&caps["date"], sequence))
    }

    /// Parse the `<date>_<seq>` prefix of a refined or derived table name.
    pub fn from_table_name(name: &str) -> Result<Self, GeotaxisError> {
        let invalid = || GeotaxisError::InvalidFileName(name.to_string());
        let date = name.get(..DATE_LEN).ok_or_else(invalid)?;
        let sequence = name
            .get(DATE_LEN + 1..SEQUENCE_PREFIX_LEN)
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        Ok(Self::new(date, sequence))
    }

    pub fn refined_file_name(&self) -> String {
        format!("{}_{:02}_{REFINED_SUFFIX}", self.date, self.sequence)
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.date, self.sequence)
    }
}

/// Output name of a derived table: the 13-character sequence prefix of the refined name
/// followed by `_derived.parquet`.
pub fn derived_file_name(refined_name: &str) -> Result<String, GeotaxisError> {
    let prefix = refined_name
        .get(..SEQUENCE_PREFIX_LEN)
        .ok_or_else(|| GeotaxisError::InvalidFileName(refined_name.to_string()))?;
    Ok(format!("{prefix}_{DERIVED_SUFFIX}"))
}

/// Input files of `dir` whose name ends with `suffix`, sorted by name.
pub fn list_inputs(dir: &Utf8Path, suffix: &str) -> Result<Vec<Utf8PathBuf>, GeotaxisError> {
    if !dir.is_dir() {
        return Err(GeotaxisError::InputPath(format!(
            "input directory not found: {dir}"
        )));
    }

    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        if entry.file_type()?.is_file() && entry.file_name().ends_with(suffix) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(GeotaxisError::InputPath(format!(
            "no '*{suffix}' file in {dir}"
        )));
    }
    Ok(files)
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Output files, in processing order.
    pub written: Vec<Utf8PathBuf>,
    /// Inputs that failed under [`BatchPolicy::Continue`], with their error.
    pub failed: Vec<(Utf8PathBuf, GeotaxisError)>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) written, {} failed",
            self.written.len(),
            self.failed.len()
        )?;
        for (path, err) in &self.failed {
            write!(f, "\n  {path}: {err}")?;
        }
        Ok(())
    }
}

/// Apply `process` to every input under `policy`.
pub(crate) fn run_batch<F>(
    stage: &'static str,
    inputs: Vec<Utf8PathBuf>,
    policy: BatchPolicy,
    mut process: F,
) -> Result<BatchOutcome, GeotaxisError>
where
    F: FnMut(&Utf8Path) -> Result<Utf8PathBuf, GeotaxisError>,
{
    #[cfg(feature = "progress")]
    let mut progress = progress_bar::BatchProgress::new(stage, inputs.len());

    let mut outcome = BatchOutcome::default();
    for input in inputs {
        match process(&input) {
            Ok(out) => outcome.written.push(out),
            Err(err) => match policy {
                BatchPolicy::FailFast => return Err(err),
                BatchPolicy::Continue => {
                    warn!(stage, file = %input, error = %err, "sequence skipped");
                    outcome.failed.push((input.clone(), err));
                }
            },
        }

        #[cfg(feature = "progress")]
        progress.file_done(input.file_name().unwrap_or_default());
    }

    #[cfg(feature = "progress")]
    progress.finish();

    Ok(outcome)
}

/// Create `dir` (and parents) if needed.
pub(crate) fn ensure_dir(dir: &Utf8Path) -> Result<(), GeotaxisError> {
    fs::create_dir_all(dir)?;
    Ok(())
}
