//! Per-video detector facade.

#[cfg(test)]
mod tests;

use rayon::prelude::*;

use crate::blob::Blob;
use crate::config::Config;
use crate::error::{DetectionError, Result};
use crate::kernel::{KernelBank, KernelVariant};
use crate::peaks::{extract_peaks, Thresholds};
use crate::plane::Plane;
use crate::prune::prune_blobs;

/// Granule detector for frames of one fixed shape.
///
/// Holds the kernel bank built for that shape, so the costly kernel
/// transforms happen once per video rather than once per frame.
///
/// # Example
///
/// ```
/// use granule::{BlobDetector, Config, Plane};
///
/// let detector = BlobDetector::new(Config::default(), (64, 64)).unwrap();
/// let blobs = detector.detect(&Plane::zeros(64, 64)).unwrap();
/// assert!(blobs.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BlobDetector {
    bank: KernelBank,
    thresholds: Thresholds,
    overlap: f64,
}

impl BlobDetector {
    /// Validate `config` and build the kernel bank for `(rows, cols)` frames.
    pub fn new(config: Config, shape: (usize, usize)) -> Result<Self> {
        config.validate()?;
        let bank = KernelBank::build(config.scale_schedule()?, shape, &config.bank_options())?;
        Self::from_bank(bank, config.thresholds(), config.overlap)
    }

    /// Reuse an existing bank, e.g. one built with an explicit σ list.
    pub fn from_bank(bank: KernelBank, thresholds: Thresholds, overlap: f64) -> Result<Self> {
        thresholds.validate()?;
        if !(0.0..=1.0).contains(&overlap) {
            return Err(DetectionError::InvalidParameter {
                name: "overlap",
                reason: format!("must be in [0, 1], got {}", overlap),
            });
        }
        Ok(Self {
            bank,
            thresholds,
            overlap,
        })
    }

    pub fn bank(&self) -> &KernelBank {
        &self.bank
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn overlap(&self) -> f64 {
        self.overlap
    }

    /// Detect granules in a single frame.
    pub fn detect(&self, image: &Plane) -> Result<Vec<Blob>> {
        detect_blobs(image, &self.bank, self.thresholds, self.overlap)
    }

    /// Detect granules in many frames in parallel.
    ///
    /// Results are in frame order. A failing frame does not stop the others.
    pub fn detect_all(&self, frames: &[Plane]) -> Vec<Result<Vec<Blob>>> {
        frames.par_iter().map(|frame| self.detect(frame)).collect()
    }
}

/// Convolve, find scale-space peaks and prune overlapping detections.
///
/// A plain Gaussian bank is turned into DoG planes first, so both kernel
/// variants give the same blobs. The result is sorted by response, strongest
/// first. An empty list means nothing was detected.
pub fn detect_blobs(
    image: &Plane,
    bank: &KernelBank,
    thresholds: Thresholds,
    overlap: f64,
) -> Result<Vec<Blob>> {
    let mut volume = bank.convolve(image)?;
    if bank.variant() == KernelVariant::Gaussian {
        volume = volume.differences();
    }

    let peaks = extract_peaks(volume, bank.schedule(), thresholds)?;
    let peak_count = peaks.len();
    let blobs = prune_blobs(peaks.into_iter().map(Blob::from).collect(), overlap);

    log::debug!(
        "Detected {} blobs ({} peaks before pruning) in {}x{} frame",
        blobs.len(),
        peak_count,
        image.rows(),
        image.cols()
    );

    Ok(blobs)
}
