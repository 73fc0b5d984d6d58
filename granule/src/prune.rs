//! Removal of duplicate detections of the same granule across scales.


use std::f64::consts::{PI, SQRT_2};

use crate::blob::Blob;
use crate::spatial::KdTree;

/// Fraction of the smaller disk covered by the intersection of two disks
/// of radii `r1`, `r2` whose centres are `distance` apart.
pub fn disk_overlap(distance: f64, r1: f64, r2: f64) -> f64 {
    if distance > r1 + r2 {
        return 0.0;
    }
    if distance <= (r1 - r2).abs() {
        return 1.0;
    }

    let d = distance;
    let cos1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let cos2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0);

    let a = -d + r2 + r1;
    let b = d - r2 + r1;
    let c = d + r2 - r1;
    let e = d + r2 + r1;
    let area = r1 * r1 * cos1.acos() + r2 * r2 * cos2.acos() - 0.5 * (a * b * c * e).abs().sqrt();

    area / (PI * r1.min(r2).powi(2))
}

/// [`disk_overlap`] of the disks two blobs cover.
pub fn blob_overlap(a: &Blob, b: &Blob) -> f64 {
    disk_overlap(a.position().distance(b.position()), a.radius(), b.radius())
}

/// Drop blobs whose disk overlaps a larger one by more than `overlap`.
///
/// Candidate pairs are visited in ascending `(i, j)` order. Of an
/// overlapping pair the smaller σ is removed; on equal σ the later blob is,
/// so with response-sorted input the weaker detection goes. A removed blob
/// never removes another. Survivors keep their input order, which makes the
/// operation idempotent.
pub fn prune_blobs(blobs: Vec<Blob>, overlap: f64) -> Vec<Blob> {
    if blobs.len() < 2 {
        return blobs;
    }

    let positions: Vec<_> = blobs.iter().map(Blob::position).collect();
    let Some(tree) = KdTree::build(&positions) else {
        return blobs;
    };

    let max_sigma = blobs.iter().map(|b| b.sigma).fold(0.0, f64::max);
    let mut alive = vec![true; blobs.len()];
    for (i, j) in tree.pairs_within(2.0 * SQRT_2 * max_sigma) {
        if !(alive[i] && alive[j]) {
            continue;
        }
        if blob_overlap(&blobs[i], &blobs[j]) > overlap {
            if blobs[j].sigma > blobs[i].sigma {
                alive[i] = false;
            } else {
                alive[j] = false;
            }
        }
    }

    let before = blobs.len();
    let kept: Vec<Blob> = blobs
        .into_iter()
        .zip(alive)
        .filter_map(|(blob, keep)| keep.then_some(blob))
        .collect();
    log::trace!("Pruned {} of {} blobs", before - kept.len(), before);
    kept
}
