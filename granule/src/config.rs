//! Detector configuration.
//!
//! [`Config`] is a flat struct with parameters grouped by comments into
//! sections. It derives serde traits so callers can embed it in their own
//! configuration files; reading those files is up to the caller.

use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, Result};
use crate::kernel::{BankOptions, KernelVariant, DEFAULT_TRUNCATE_LENGTH};
use crate::peaks::Thresholds;
use crate::plan::TransformSize;
use crate::scale::{ScaleSchedule, DEFAULT_SIGMA_RATIO};

/// Granule detection configuration.
///
/// # Example
///
/// ```
/// use granule::Config;
///
/// let config = Config {
///     max_sigma: 6.0,
///     threshold_rel: Some(0.05),
///     ..Config::default()
/// };
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // -- Scale space --
    /// Smallest Gaussian σ probed, in pixels.
    pub min_sigma: f64,
    /// Largest σ probed. The schedule may overshoot it by up to one ratio step.
    pub max_sigma: f64,
    /// Ratio between consecutive σ values. Must be > 1.
    pub sigma_ratio: f64,

    // -- Kernels --
    /// Kernel cut-off in multiples of the largest σ.
    pub truncate_length: f64,
    /// Plain Gaussian stack or pre-subtracted DoG kernels.
    pub variant: KernelVariant,
    /// Transform length selection.
    pub transform_size: TransformSize,

    // -- Peaks --
    /// Absolute response floor. Ignored when `threshold_rel` is set.
    pub threshold_abs: Option<f64>,
    /// Response floor as a fraction of the strongest response in the frame.
    pub threshold_rel: Option<f64>,

    // -- Pruning --
    /// Blobs overlapping a larger one by more than this fraction of their
    /// area are dropped. 0 keeps only non-touching disks, 1 disables pruning.
    pub overlap: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Scale space
            min_sigma: 1.0,
            max_sigma: 10.0,
            sigma_ratio: DEFAULT_SIGMA_RATIO,

            // Kernels
            truncate_length: DEFAULT_TRUNCATE_LENGTH,
            variant: KernelVariant::Difference,
            transform_size: TransformSize::default(),

            // Peaks
            threshold_abs: None,
            threshold_rel: Some(0.1),

            // Pruning
            overlap: 0.0,
        }
    }
}

impl Config {
    /// Check every parameter, including that the σ range yields a schedule.
    pub fn validate(&self) -> Result<()> {
        self.scale_schedule()?;

        if !(self.truncate_length.is_finite() && self.truncate_length > 0.0) {
            return Err(DetectionError::InvalidParameter {
                name: "truncate_length",
                reason: format!("must be a positive finite value, got {}", self.truncate_length),
            });
        }
        if let TransformSize::Fixed(0) = self.transform_size {
            return Err(DetectionError::InvalidParameter {
                name: "transform_size",
                reason: "fixed transform length must be non-zero".to_string(),
            });
        }
        self.thresholds().validate()?;
        if !(0.0..=1.0).contains(&self.overlap) {
            return Err(DetectionError::InvalidParameter {
                name: "overlap",
                reason: format!("must be in [0, 1], got {}", self.overlap),
            });
        }
        Ok(())
    }

    /// Pad to plain powers of two, skipping the 3·2^n and 5·2^n lengths.
    ///
    /// Matches the transform sizes of a plain radix-2 FFT, at the cost of up
    /// to twice the padded area.
    pub fn power_of_two() -> Self {
        Self {
            transform_size: TransformSize::Auto {
                allow_factor_3: false,
                allow_factor_5: false,
            },
            ..Self::default()
        }
    }

    pub fn scale_schedule(&self) -> Result<ScaleSchedule> {
        ScaleSchedule::generate(self.min_sigma, self.max_sigma, self.sigma_ratio)
    }

    pub fn bank_options(&self) -> BankOptions {
        BankOptions {
            truncate_length: self.truncate_length,
            transform_size: self.transform_size,
            variant: self.variant,
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            absolute: self.threshold_abs,
            relative: self.threshold_rel,
        }
    }
}
