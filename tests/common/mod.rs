#![allow(dead_code)]
use std::fmt::Write as _;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use geotaxis::landmarks::LandmarkKey;
use geotaxis::tracks::{RefinedTable, RefinedTrack};
use tempfile::TempDir;

/// Integer chip offsets around the centroid (they sum to zero).
pub const CHIP_OFFSETS: [(i64, i64); 5] = [(0, 10), (-10, 3), (-6, -8), (6, -8), (10, 3)];

/// Integer arm offsets, counter-clockwise from the arm pointing up (they sum to zero).
pub const ARM_OFFSETS: [(i64, i64); 5] = [(0, 40), (-38, 12), (-24, -32), (24, -32), (38, 12)];

/// Temporary directory with a UTF-8 path.
pub fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

/// Frame numbers `0..n`.
pub fn frames(n: u32) -> Vec<u32> {
    (0..n).collect()
}

/// Regular five-armed star, rotating by `step` radians per frame around a centroid that
/// moves by `drift` pixels per frame.
///
/// Chips sit on a radius-10 ring, arm tips on a radius-40 ring; arm `k` (1-based) starts at
/// `start + (k − 1)·72°`.
pub fn rotating_star(n_frames: u32, start: f64, step: f64, drift: (f64, f64)) -> RefinedTable {
    let frames = frames(n_frames);
    let time_s: Vec<f64> = frames.iter().map(|&f| f as f64).collect();

    let mut table = RefinedTable::new();
    for k in 0..5u8 {
        let mut chip = (Vec::new(), Vec::new());
        let mut arm = (Vec::new(), Vec::new());
        for &f in &frames {
            let cx = 200.0 + drift.0 * f as f64;
            let cy = 300.0 + drift.1 * f as f64;
            let a = start + k as f64 * std::f64::consts::TAU / 5.0 + step * f as f64;
            chip.0.push(cx + 10.0 * a.cos());
            chip.1.push(cy + 10.0 * a.sin());
            arm.0.push(cx + 40.0 * a.cos());
            arm.1.push(cy + 40.0 * a.sin());
        }
        table.insert(
            LandmarkKey::chip(k + 1),
            RefinedTrack::new(frames.clone(), time_s.clone(), chip.0, chip.1).unwrap(),
        );
        table.insert(
            LandmarkKey::arm(k + 1),
            RefinedTrack::new(frames.clone(), time_s.clone(), arm.0, arm.1).unwrap(),
        );
    }
    table
}

/// Position of landmark `name` (e.g. `"arm2"`) on frame `f` of the translating star used by
/// the raw export fixtures: centroid at `(100 + 3f, 200 + 4f)`.
pub fn translating_position(name: &str, f: u32) -> (f64, f64) {
    let (offsets, idx) = if let Some(i) = name.strip_prefix("arm") {
        (&ARM_OFFSETS, i)
    } else if let Some(i) = name.strip_prefix("chip") {
        (&CHIP_OFFSETS, i)
    } else {
        panic!("unknown landmark {name}")
    };
    let k: usize = idx.parse::<usize>().unwrap() - 1;
    let (ox, oy) = offsets[k];
    ((100 + 3 * f as i64 + ox) as f64, (200 + 4 * f as i64 + oy) as f64)
}

/// Landmark names in export order.
pub fn landmark_names() -> Vec<String> {
    (1..=5)
        .map(|k| format!("arm{k}"))
        .chain((1..=5).map(|k| format!("chip{k}")))
        .collect()
}

/// DeepLabCut CSV export of the translating star.
///
/// `spikes` lists `(landmark, frame, dx)` glitches added to the `x` coordinate.
pub fn dlc_export(n_frames: u32, spikes: &[(&str, u32, f64)]) -> String {
    let names = landmark_names();
    let scorer = "DLC_resnet50_seastarJul14shuffle1_100000";

    let mut text = String::from("scorer");
    for _ in 0..names.len() * 3 {
        write!(text, ",{scorer}").unwrap();
    }
    text.push_str("\nbodyparts");
    for name in &names {
        write!(text, ",{name},{name},{name}").unwrap();
    }
    text.push_str("\ncoords");
    for _ in &names {
        text.push_str(",x,y,likelihood");
    }
    text.push('\n');

    for f in 0..n_frames {
        write!(text, "{f}").unwrap();
        for name in &names {
            let (mut x, y) = translating_position(name, f);
            for (spike_name, spike_frame, dx) in spikes {
                if spike_name == name && *spike_frame == f {
                    x += dx;
                }
            }
            write!(text, ",{x},{y},0.99").unwrap();
        }
        text.push('\n');
    }
    text
}

/// Raw export file name for `date` / `seq`.
pub fn raw_name(date: &str, seq: u32) -> String {
    format!("{date}_{seq}DLC_resnet50_seastarJul14shuffle1_100000_filtered.csv")
}

pub fn write_file(dir: &Utf8Path, name: &str, content: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Catalog used by the pipeline tests.
pub const CATALOG: &str = "\
date,trial_num,orientation,roi_h,angle_deg,notes
2021-07-14,3,0,720,45,flipped
2021-07-14,4,1,720,15,
2021-07-14,5,1,720,30,
";
