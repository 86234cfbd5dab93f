use approx::assert_relative_eq;
use geotaxis::tracks::outliers::{
    displacements, fix_outlier_coord, fix_outlier_track, repair_displacement,
};
use geotaxis::GeotaxisError;

const N: usize = 40;

fn parabola() -> (Vec<f64>, Vec<f64>) {
    let x = (0..N).map(|i| i as f64).collect();
    let y = (0..N).map(|i| 0.01 * (i * i) as f64).collect();
    (x, y)
}

#[test]
fn test_clean_track_is_left_alone() {
    let (x, y) = parabola();
    let out = fix_outlier_coord(&x, &y, 0.25).unwrap();
    assert!(out.repaired.is_empty());
    assert_eq!(out.x, x);
    assert_eq!(out.y, y);
}

#[test]
fn test_repair_is_idempotent() {
    let (x, mut y) = parabola();
    y[20] += 30.0;
    let once = fix_outlier_coord(&x, &y, 0.25).unwrap();
    let twice = fix_outlier_coord(&once.x, &once.y, 0.25).unwrap();
    assert!(twice.repaired.is_empty());
    assert_eq!(twice.x, once.x);
    assert_eq!(twice.y, once.y);
}

#[test]
fn test_interior_spike_is_interpolated() {
    let (x, mut y) = parabola();
    y[20] += 30.0;
    let out = fix_outlier_coord(&x, &y, 0.25).unwrap();
    assert_eq!(out.repaired, vec![20]);
    assert_relative_eq!(out.x[20], 20.0);
    assert_relative_eq!(out.y[20], 4.01, epsilon = 1e-9);
    for i in (0..N).filter(|&i| i != 20) {
        assert_eq!(out.y[i], y[i]);
    }
}

#[test]
fn test_first_point_is_extrapolated() {
    let (x, mut y) = parabola();
    y[0] += 30.0;
    let out = fix_outlier_coord(&x, &y, 0.25).unwrap();
    assert_eq!(out.repaired, vec![0]);
    assert_relative_eq!(out.x[0], 0.0);
    assert_relative_eq!(out.y[0], -0.02, epsilon = 1e-9);
}

#[test]
fn test_last_point_is_extrapolated() {
    let (x, mut y) = parabola();
    y[N - 1] += 30.0;
    let out = fix_outlier_coord(&x, &y, 0.25).unwrap();
    assert_eq!(out.repaired, vec![N - 1]);
    assert_relative_eq!(out.x[N - 1], 39.0);
    assert_relative_eq!(out.y[N - 1], 15.19, epsilon = 1e-9);
}

#[test]
fn test_spike_on_second_point_is_interpolated() {
    let (x, mut y) = parabola();
    y[1] += 30.0;
    let out = fix_outlier_coord(&x, &y, 0.25).unwrap();
    assert_eq!(out.repaired, vec![1]);
    assert_eq!(out.y[0], y[0]);
    assert_eq!(out.y[2], y[2]);
    assert_eq!(out.x[..3], x[..3]);
    assert_relative_eq!(out.y[1], 0.02, epsilon = 1e-9);
}

#[test]
fn test_spike_on_second_to_last_point_is_interpolated() {
    let (x, mut y) = parabola();
    y[N - 2] += 30.0;
    let out = fix_outlier_coord(&x, &y, 0.25).unwrap();
    assert_eq!(out.repaired, vec![N - 2]);
    assert_eq!(out.y[N - 3], y[N - 3]);
    assert_eq!(out.y[N - 1], y[N - 1]);
    assert_relative_eq!(out.y[N - 2], 14.45, epsilon = 1e-9);
}

#[test]
fn test_too_many_outliers_is_rejected() {
    let (x, mut y) = parabola();
    for i in [10, 20, 30] {
        y[i] += 1000.0;
    }
    let snapshot = y.clone();
    let err = fix_outlier_coord(&x, &y, 0.25).unwrap_err();
    assert_eq!(
        err,
        GeotaxisError::TooManyOutliers {
            outliers: 6,
            points: 40
        }
    );
    assert_eq!(y, snapshot);
}

#[test]
fn test_five_point_interior_repair() {
    let frames = [0, 1, 2, 3, 4];
    let mut x = vec![0.0, 1.0, 2.0, 100.0, 4.0];
    let mut y = vec![0.0, 1.0, 2.0, 100.0, 4.0];
    let disp = displacements(&x, &y);
    let worst = disp
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(worst, 2);

    assert_eq!(repair_displacement(&frames, &mut x, &mut y, worst), Some(3));
    assert_relative_eq!(x[3], 3.0);
    assert_relative_eq!(y[3], 3.0);
}

#[test]
fn test_short_tracks_are_returned_unchanged() {
    let out = fix_outlier_coord(&[1.0, 500.0], &[0.0, 0.0], 0.25).unwrap();
    assert_eq!(out.x, vec![1.0, 500.0]);
    assert!(out.repaired.is_empty());
    assert!(fix_outlier_coord(&[], &[], 0.25).unwrap().x.is_empty());
}

#[test]
fn test_frame_offset_does_not_change_repair() {
    let (x, mut y) = parabola();
    y[12] -= 25.0;
    let frames: Vec<u32> = (1000..1000 + N as u32).collect();

    let shifted = fix_outlier_track(&frames, &x, &y, 0.25).unwrap();
    let plain = fix_outlier_coord(&x, &y, 0.25).unwrap();
    assert_eq!(shifted, plain);
    assert_eq!(shifted.repaired, vec![12]);
    assert_relative_eq!(shifted.y[12], 1.45, epsilon = 1e-9);
}

#[test]
fn test_invalid_quantile() {
    let (x, y) = parabola();
    assert!(matches!(
        fix_outlier_coord(&x, &y, 0.75),
        Err(GeotaxisError::InvalidParameter(_))
    ));
}
