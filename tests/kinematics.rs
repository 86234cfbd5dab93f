mod common;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use approx::assert_relative_eq;
use geotaxis::kinematics::{derive_data, derive_kinematics};
use geotaxis::landmarks::LandmarkKey;
use geotaxis::params::DeriveParams;
use geotaxis::tracks::{RefinedTable, RefinedTrack};
use geotaxis::GeotaxisError;

use common::rotating_star;

const ARMS: [u8; 5] = [1, 2, 3, 4, 5];
const DEG: f64 = PI / 180.0;

#[test]
fn test_identity_survives_counter_clockwise_rotation() {
    // arm 1 starts pointing up, the body turns 10° per frame through ±π
    let table = rotating_star(20, FRAC_PI_2, 10.0 * DEG, (0.0, 0.0));
    let derived = derive_kinematics(&table, &ARMS, 1.0, 10, 1).unwrap();

    assert_eq!(derived.len(), 20);
    for ids in &derived.arm_ids {
        assert_eq!(ids, &[1, 2, 3, 4, 5]);
    }
    for (f, &h) in derived.head_rad.iter().enumerate() {
        let expected = geotaxis::numeric::wrap_angle(FRAC_PI_2 + f as f64 * 10.0 * DEG);
        assert_relative_eq!(
            geotaxis::numeric::angle_distance(h, expected),
            0.0,
            epsilon = 1e-9
        );
    }
}

#[test]
fn test_identity_survives_clockwise_rotation() {
    let table = rotating_star(30, FRAC_PI_2 - 5.0 * DEG, -12.0 * DEG, (1.5, -0.5));
    let derived = derive_kinematics(&table, &ARMS, 1.0, 10, 1).unwrap();
    assert!(derived.lead_arm_ids().all(|id| id == 1));
    for ids in &derived.arm_ids {
        assert_eq!(ids, &[1, 2, 3, 4, 5]);
    }
}

#[test]
fn test_first_lead_is_arm_closest_to_vertical() {
    // arm 3 starts at 30° + 144° = 174°, arm 2 at 102°: arm 2 leads
    let table = rotating_star(5, 30.0 * DEG, 0.0, (0.0, 0.0));
    let derived = derive_kinematics(&table, &ARMS, 1.0, 10, 1).unwrap();
    assert_eq!(derived.arm_ids[0], [2, 3, 4, 5, 1]);
}

#[test]
fn test_identity_follows_the_body_when_labels_swap() {
    // From frame 6 on, upstream labels are shifted by one: the physical lead arm is now
    // reported as arm5 and every other arm's label moves accordingly.
    let base = rotating_star(12, FRAC_PI_2, 3.0 * DEG, (0.0, 0.0));
    let mut table = RefinedTable::new();
    for k in 1..=5u8 {
        table.insert(LandmarkKey::chip(k), base.track(&LandmarkKey::chip(k)).unwrap().clone());

        let source = (k % 5) + 1; // arm k shows the body arm k+1 from frame 6 on
        let original = base.track(&LandmarkKey::arm(k)).unwrap();
        let shifted = base.track(&LandmarkKey::arm(source)).unwrap();
        let (x, y): (Vec<f64>, Vec<f64>) = (0..12)
            .map(|i| {
                let t = if i < 6 { original } else { shifted };
                (t.x()[i], t.y()[i])
            })
            .unzip();
        table.insert(
            LandmarkKey::arm(k),
            RefinedTrack::new(original.frames().to_vec(), original.time_s().to_vec(), x, y)
                .unwrap(),
        );
    }

    let derived = derive_kinematics(&table, &ARMS, 1.0, 10, 1).unwrap();
    for f in 0..6 {
        assert_eq!(derived.arm_ids[f], [1, 2, 3, 4, 5]);
    }
    for f in 6..12 {
        assert_eq!(derived.arm_ids[f], [5, 1, 2, 3, 4]);
    }
    // the lead position itself is continuous
    for w in derived.head_rad.windows(2) {
        assert!(geotaxis::numeric::angle_distance(w[0], w[1]) < 4.0 * DEG);
    }
}

#[test]
fn test_centroid_speed_and_displacement() {
    let table = rotating_star(25, 0.3, 2.0 * DEG, (3.0, 4.0));
    let params = DeriveParams::builder()
        .frame_rate(2.0)
        .smoothing_window(1)
        .heading_win(5)
        .build()
        .unwrap();
    let derived = derive_data(&table, &params).unwrap();
    derived.validate().unwrap();

    for (i, (&x, &y)) in derived.x_cntr_pix.iter().zip(&derived.y_cntr_pix).enumerate() {
        assert_relative_eq!(x, 200.0 + 3.0 * i as f64, epsilon = 1e-9);
        assert_relative_eq!(y, 300.0 + 4.0 * i as f64, epsilon = 1e-9);
    }
    assert_eq!(derived.spd_pixs.len(), 25);
    for &s in &derived.spd_pixs {
        assert_relative_eq!(s, 10.0, epsilon = 1e-9);
    }
    for (i, &d) in derived.displ_pix.iter().enumerate() {
        assert_relative_eq!(d, 5.0 * i as f64, epsilon = 1e-9);
    }
    assert_relative_eq!(derived.time_s[3], 1.5);

    assert_eq!(derived.head_disp_rad.len(), 25 - 4);
    assert_eq!(derived.t_head_disp, derived.time_s[..21].to_vec());
    for &h in &derived.head_disp_rad {
        assert_relative_eq!(h, 4.0f64.atan2(3.0), epsilon = 1e-9);
    }
}

#[test]
fn test_smoothed_series_properties() {
    let table = rotating_star(60, 1.0, -1.0 * DEG, (0.7, -0.2));
    let derived = derive_data(&table, &DeriveParams::default()).unwrap();

    assert_eq!(derived.spd_pixs.len(), derived.len());
    assert!(derived.spd_pixs.iter().all(|&s| s >= 0.0));
    assert_eq!(derived.displ_pix[0], 0.0);
    assert!(derived.displ_pix.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(derived.head_disp_rad.len(), 60 - 9);
    assert!(derived
        .head_rad
        .iter()
        .all(|h| (-PI..=PI).contains(h)));
}

/// Regular pentagon around the origin, arm 1 pointing up on the first frame.
fn centred_star(n_frames: u32, step: f64) -> RefinedTable {
    let table = rotating_star(n_frames, FRAC_PI_2, step, (0.0, 0.0));
    let mut centred = RefinedTable::new();
    for (key, track) in table.iter() {
        let x: Vec<f64> = track.x().iter().map(|v| v - 200.0).collect();
        let y: Vec<f64> = track.y().iter().map(|v| v - 300.0).collect();
        centred.insert(
            *key,
            RefinedTrack::new(track.frames().to_vec(), track.time_s().to_vec(), x, y).unwrap(),
        );
    }
    centred
}

#[test]
fn test_symmetric_body_rotating_by_one_arm_spacing() {
    // a 72° step maps the body onto itself: the lead slot keeps its position and is
    // handed over to the next label on every frame
    let centred = centred_star(3, TAU / 5.0);
    let derived = derive_data(&centred, &DeriveParams::default()).unwrap();

    assert_eq!(derived.len(), 3);
    assert_eq!(
        derived.arm_ids,
        vec![[1, 2, 3, 4, 5], [5, 1, 2, 3, 4], [4, 5, 1, 2, 3]]
    );
    for i in 0..3 {
        assert_relative_eq!(derived.x_cntr_pix[i], 0.0, epsilon = 1e-9);
        assert_relative_eq!(derived.y_cntr_pix[i], 0.0, epsilon = 1e-9);
        assert_relative_eq!(derived.head_rad[i], FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(derived.x_arm_pix[0][i], 0.0, epsilon = 1e-9);
        assert_relative_eq!(derived.y_arm_pix[0][i], 40.0, epsilon = 1e-9);
    }
}

#[test]
fn test_static_symmetric_body() {
    // three identical frames
    let centred = centred_star(3, 0.0);

    let derived = derive_data(&centred, &DeriveParams::default()).unwrap();
    assert_eq!(derived.len(), 3);
    assert_eq!(derived.fr_num, vec![0, 1, 2]);
    for i in 0..3 {
        assert_relative_eq!(derived.x_cntr_pix[i], 0.0, epsilon = 1e-9);
        assert_relative_eq!(derived.y_cntr_pix[i], 0.0, epsilon = 1e-9);
        assert_eq!(derived.arm_ids[i][0], 1);
        assert_relative_eq!(derived.head_rad[i], FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(derived.spd_pixs[i], 0.0, epsilon = 1e-9);
    }
    // slot order is counter-clockwise: slot k sits 72°·k after the lead
    for slot in 1..5 {
        let angle = derived.y_arm_pix[slot][0].atan2(derived.x_arm_pix[slot][0]);
        let rel = (angle - FRAC_PI_2).rem_euclid(TAU);
        assert_relative_eq!(rel, slot as f64 * TAU / 5.0, epsilon = 1e-9);
    }
    assert!(derived.head_disp_rad.is_empty());
}

#[test]
fn test_missing_arm_on_one_frame() {
    let mut table = rotating_star(5, FRAC_PI_2, 0.0, (0.0, 0.0));
    let arm3 = table.track(&LandmarkKey::arm(3)).unwrap().clone();
    let keep: Vec<usize> = (0..5).filter(|&i| i != 2).collect();
    table.insert(
        LandmarkKey::arm(3),
        RefinedTrack::new(
            keep.iter().map(|&i| arm3.frames()[i]).collect(),
            keep.iter().map(|&i| arm3.time_s()[i]).collect(),
            keep.iter().map(|&i| arm3.x()[i]).collect(),
            keep.iter().map(|&i| arm3.y()[i]).collect(),
        )
        .unwrap(),
    );

    let err = derive_data(&table, &DeriveParams::default()).unwrap_err();
    assert_eq!(
        err,
        GeotaxisError::MissingLandmark {
            frame: 2,
            landmark: "arm3".into()
        }
    );
}

#[test]
fn test_nan_coordinate_counts_as_missing() {
    let mut table = rotating_star(4, FRAC_PI_2, 0.0, (0.0, 0.0));
    let chip2 = table.track(&LandmarkKey::chip(2)).unwrap().clone();
    let mut x = chip2.x().to_vec();
    x[1] = f64::NAN;
    table.insert(
        LandmarkKey::chip(2),
        RefinedTrack::new(chip2.frames().to_vec(), chip2.time_s().to_vec(), x, chip2.y().to_vec())
            .unwrap(),
    );
    let err = derive_data(&table, &DeriveParams::default()).unwrap_err();
    assert_eq!(
        err,
        GeotaxisError::MissingLandmark {
            frame: 1,
            landmark: "chip2".into()
        }
    );
}
