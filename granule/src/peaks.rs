//! Scale-space local maxima of a DoG response volume.


use serde::{Deserialize, Serialize};

use crate::convolve::ResponseVolume;
use crate::error::{DetectionError, Result};
use crate::scale::ScaleSchedule;

/// Detection floor for [`extract_peaks`].
///
/// `relative` is a fraction of the volume maximum and wins over `absolute`
/// when both are set. With neither set the floor is the volume minimum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub absolute: Option<f64>,
    pub relative: Option<f64>,
}

impl Thresholds {
    pub fn absolute(value: f64) -> Self {
        Self {
            absolute: Some(value),
            relative: None,
        }
    }

    pub fn relative(fraction: f64) -> Self {
        Self {
            absolute: None,
            relative: Some(fraction),
        }
    }

    /// Threshold value for a volume spanning `[min, max]`.
    pub fn resolve(&self, min: f64, max: f64) -> f64 {
        match (self.relative, self.absolute) {
            (Some(fraction), _) => fraction * max,
            (None, Some(value)) => value,
            (None, None) => min,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(value) = self.absolute {
            if !value.is_finite() {
                return Err(DetectionError::InvalidParameter {
                    name: "threshold_abs",
                    reason: format!("must be finite, got {}", value),
                });
            }
        }
        if let Some(fraction) = self.relative {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(DetectionError::InvalidParameter {
                    name: "threshold_rel",
                    reason: format!("must be in [0, 1], got {}", fraction),
                });
            }
        }
        Ok(())
    }
}

/// A local maximum of the rescaled response volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub row: usize,
    pub col: usize,
    pub scale_index: usize,
    /// Schedule σ at `scale_index`.
    pub sigma: f64,
    /// Rescaled response at the peak.
    pub response: f64,
}

/// Find voxels that are maxima of their 3x3x3 neighbourhood.
///
/// The volume is first multiplied by `1 / (ratio - 1)`, which puts DoG
/// responses on the same scale as a scale-normalized Laplacian so thresholds
/// stay comparable across σ ratios. Border voxels compare against their
/// in-bounds neighbours only. Plateaus report every voxel of the plateau,
/// except that a constant volume has no peaks at all.
///
/// The result is sorted by response, strongest first; equal responses keep
/// (row, col, scale) order. No peaks is `Ok(vec![])`.
pub fn extract_peaks(
    mut volume: ResponseVolume,
    schedule: &ScaleSchedule,
    thresholds: Thresholds,
) -> Result<Vec<Peak>> {
    let (depth, rows, cols) = (volume.depth(), volume.rows(), volume.cols());
    if depth > schedule.len() {
        return Err(DetectionError::ScaleCountMismatch {
            planes: depth,
            sigmas: schedule.len(),
        });
    }

    volume.scale(1.0 / (schedule.ratio() - 1.0));

    let Some((min, max)) = volume.min_max() else {
        return Ok(Vec::new());
    };
    // every voxel of a constant volume ties with its neighbours
    if min == max {
        return Ok(Vec::new());
    }
    let threshold = thresholds.resolve(min, max);
    if max <= threshold {
        return Ok(Vec::new());
    }

    let sigmas = schedule.sigmas();
    let mut peaks = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            for scale in 0..depth {
                let value = volume.get(scale, row, col);
                if value > threshold && is_local_max(&volume, scale, row, col, value) {
                    peaks.push(Peak {
                        row,
                        col,
                        scale_index: scale,
                        sigma: sigmas[scale],
                        response: value,
                    });
                }
            }
        }
    }

    peaks.sort_by(|a, b| b.response.total_cmp(&a.response));

    log::trace!(
        "{} peaks above {:.4} in a {}x{}x{} volume",
        peaks.len(),
        threshold,
        depth,
        rows,
        cols
    );

    Ok(peaks)
}

fn is_local_max(volume: &ResponseVolume, scale: usize, row: usize, col: usize, value: f64) -> bool {
    let scales = scale.saturating_sub(1)..(scale + 2).min(volume.depth());
    let rows = row.saturating_sub(1)..(row + 2).min(volume.rows());
    let cols = col.saturating_sub(1)..(col + 2).min(volume.cols());

    for s in scales {
        for r in rows.clone() {
            for c in cols.clone() {
                if volume.get(s, r, c) > value {
                    return false;
                }
            }
        }
    }
    true
}
