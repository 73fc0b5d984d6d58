//! End-to-end detection tests on synthetic frames.

use std::f64::consts::SQRT_2;

use super::*;
use crate::kernel::BankOptions;
use crate::scale::ScaleSchedule;
use crate::test_utils::{render_spots, with_noise, Spot};

const SIZE: usize = 256;

/// Profile width whose DoG response peaks at schedule σ `sigma`.
fn profile_sigma(sigma: f64) -> f64 {
    sigma * 1.6f64.sqrt()
}

fn single_spot_frame() -> Plane {
    render_spots(
        SIZE,
        SIZE,
        &[Spot::new(128.0, 128.0, profile_sigma(4.096), 1.0)],
    )
}

fn three_spot_scene(shift: usize) -> (Vec<Spot>, Plane) {
    let spots = vec![
        Spot::new(64.0, (64 + shift) as f64, profile_sigma(1.6), 1.0),
        Spot::new(64.0, (192 + shift) as f64, profile_sigma(2.56), 1.0),
        Spot::new(192.0, (128 + shift) as f64, profile_sigma(4.096), 1.0),
    ];
    let plane = render_spots(SIZE, SIZE, &spots);
    (spots, plane)
}

fn assert_blob_near(blob: &Blob, row: f64, col: f64, sigma: f64) {
    assert!(
        (blob.row as f64 - row).abs() <= 1.0 && (blob.col as f64 - col).abs() <= 1.0,
        "blob at ({}, {}), expected ({}, {})",
        blob.row,
        blob.col,
        row,
        col
    );
    assert!(
        (blob.sigma - sigma).abs() <= 0.1 * sigma,
        "blob sigma {} expected {}",
        blob.sigma,
        sigma
    );
}

// ============================================================================
// Single frame
// ============================================================================

#[test]
fn test_single_blob_at_centre() {
    let detector = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    let blobs = detector.detect(&single_spot_frame()).unwrap();

    assert_eq!(blobs.len(), 1, "{:?}", blobs);
    assert_blob_near(&blobs[0], 128.0, 128.0, 4.096);
    assert!((blobs[0].radius() - blobs[0].sigma * SQRT_2).abs() < 1e-12);
}

#[test]
fn test_single_blob_with_power_of_two_transform() {
    let detector = BlobDetector::new(Config::power_of_two(), (SIZE, SIZE)).unwrap();
    assert_eq!(detector.bank().transform_length(), 512);

    let blobs = detector.detect(&single_spot_frame()).unwrap();
    assert_eq!(blobs.len(), 1);
    assert_blob_near(&blobs[0], 128.0, 128.0, 4.096);
}

#[test]
fn test_single_blob_in_noise() {
    let detector = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    let frame = with_noise(&single_spot_frame(), 0.05, 99);

    let blobs = detector.detect(&frame).unwrap();
    assert!(!blobs.is_empty());
    assert_blob_near(&blobs[0], 128.0, 128.0, 4.096);
}

#[test]
fn test_blobs_at_several_scales() {
    let detector = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    let (spots, frame) = three_spot_scene(0);
    let blobs = detector.detect(&frame).unwrap();

    assert_eq!(blobs.len(), spots.len(), "{:?}", blobs);
    for (spot, sigma) in spots.iter().zip([1.6, 2.56, 4.096]) {
        let blob = blobs
            .iter()
            .find(|b| {
                (b.row as f64 - spot.row).abs() <= 1.0 && (b.col as f64 - spot.col).abs() <= 1.0
            })
            .unwrap_or_else(|| panic!("no blob near {:?} in {:?}", spot, blobs));
        assert_blob_near(blob, spot.row, spot.col, sigma);
    }
}

#[test]
fn test_variants_agree() {
    let (_, frame) = three_spot_scene(5);
    let difference = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    let gaussian = BlobDetector::new(
        Config {
            variant: KernelVariant::Gaussian,
            ..Config::default()
        },
        (SIZE, SIZE),
    )
    .unwrap();
    assert_eq!(gaussian.bank().probe_count(), difference.bank().probe_count() + 1);

    // equal-strength spots may swap order on rounding, so compare by position
    let by_position = |mut blobs: Vec<Blob>| {
        blobs.sort_by_key(|b| (b.row, b.col));
        blobs
    };
    let from_gaussian = by_position(gaussian.detect(&frame).unwrap());
    let from_difference = by_position(difference.detect(&frame).unwrap());
    assert_eq!(from_gaussian.len(), 3);
    assert_eq!(from_gaussian, from_difference);
}

#[test]
fn test_zero_image_has_no_blobs() {
    let detector = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    assert!(detector.detect(&Plane::zeros(SIZE, SIZE)).unwrap().is_empty());

    let absolute = BlobDetector::new(
        Config {
            threshold_rel: None,
            threshold_abs: Some(0.0),
            ..Config::default()
        },
        (SIZE, SIZE),
    )
    .unwrap();
    assert!(absolute.detect(&Plane::zeros(SIZE, SIZE)).unwrap().is_empty());
}

#[test]
fn test_detection_is_deterministic() {
    let detector = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    let frame = with_noise(&three_spot_scene(0).1, 0.1, 4);
    assert_eq!(detector.detect(&frame).unwrap(), detector.detect(&frame).unwrap());
}

#[test]
fn test_higher_threshold_keeps_fewer_blobs() {
    let frame = with_noise(&three_spot_scene(0).1, 0.2, 8);
    let mut previous = usize::MAX;
    for fraction in [0.05, 0.2, 0.5, 0.9] {
        let detector = BlobDetector::new(
            Config {
                threshold_rel: Some(fraction),
                overlap: 1.0,
                ..Config::default()
            },
            (SIZE, SIZE),
        )
        .unwrap();
        let count = detector.detect(&frame).unwrap().len();
        assert!(count <= previous, "{} blobs at {} after {}", count, fraction, previous);
        previous = count;
    }
}

#[test]
fn test_rejects_wrong_frame_shape() {
    let detector = BlobDetector::new(Config::default(), (64, 80)).unwrap();
    assert!(matches!(
        detector.detect(&Plane::zeros(80, 64)),
        Err(DetectionError::ShapeMismatch { .. })
    ));
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    let config = Config {
        min_sigma: 10.0,
        max_sigma: 1.0,
        ..Config::default()
    };
    assert!(matches!(
        BlobDetector::new(config, (SIZE, SIZE)),
        Err(DetectionError::InvalidSigmaRange { .. })
    ));
    assert!(matches!(
        BlobDetector::new(Config::default(), (0, SIZE)),
        Err(DetectionError::EmptyPlane { .. })
    ));
}

#[test]
fn test_from_bank_with_explicit_schedule() {
    let schedule = ScaleSchedule::from_sigmas(vec![2.56, 4.096, 6.5536]).unwrap();
    let bank = KernelBank::build(schedule, (SIZE, SIZE), &BankOptions::default()).unwrap();
    let detector = BlobDetector::from_bank(bank, Thresholds::relative(0.1), 0.0).unwrap();
    assert_eq!(detector.overlap(), 0.0);
    assert_eq!(detector.thresholds(), Thresholds::relative(0.1));

    let blobs = detector.detect(&single_spot_frame()).unwrap();
    assert_eq!(blobs.len(), 1);
    assert_blob_near(&blobs[0], 128.0, 128.0, 4.096);

    let free = detect_blobs(
        &single_spot_frame(),
        detector.bank(),
        detector.thresholds(),
        detector.overlap(),
    )
    .unwrap();
    assert_eq!(free, blobs);
}

#[test]
fn test_from_bank_rejects_invalid_overlap() {
    let bank = BlobDetector::new(Config::default(), (32, 32)).unwrap().bank().clone();
    assert!(matches!(
        BlobDetector::from_bank(bank, Thresholds::default(), -0.5),
        Err(DetectionError::InvalidParameter { name: "overlap", .. })
    ));
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_detect_all_matches_sequential() {
    let detector = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    let frames: Vec<Plane> = (0..4)
        .map(|i| with_noise(&three_spot_scene(i * 3).1, 0.05, i as u64))
        .collect();

    let batch = detector.detect_all(&frames);
    assert_eq!(batch.len(), frames.len());
    for (frame, result) in frames.iter().zip(batch) {
        assert_eq!(result.unwrap(), detector.detect(frame).unwrap());
    }
}

#[test]
fn test_detect_all_reports_failures_per_frame() {
    let detector = BlobDetector::new(Config::default(), (SIZE, SIZE)).unwrap();
    let frames = vec![single_spot_frame(), Plane::zeros(16, 16), single_spot_frame()];

    let results = detector.detect_all(&frames);
    assert_eq!(results[0].as_ref().unwrap().len(), 1);
    assert!(matches!(results[1], Err(DetectionError::ShapeMismatch { .. })));
    assert_eq!(results[2].as_ref().unwrap().len(), 1);
}
