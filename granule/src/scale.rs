//! Geometric σ progression probed by the detector.

use common::FloatExt;

use crate::error::{DetectionError, Result};

pub const DEFAULT_SIGMA_RATIO: f64 = 1.6;

/// Upper bound on the number of σ values a generated schedule may hold.
pub const MAX_SCALES: usize = 1024;

/// Relative tolerance when checking that an explicit schedule is geometric.
const GEOMETRIC_TOLERANCE: f64 = 1e-6;

/// Strictly increasing geometric sequence of Gaussian standard deviations.
///
/// Always holds at least two values, since every DoG plane needs a pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSchedule {
    sigmas: Vec<f64>,
    ratio: f64,
}

impl ScaleSchedule {
    /// Generate `min_sigma * ratio^i` for `i in 0..=k`, where `k` is the
    /// smallest integer with `min_sigma * ratio^k >= max_sigma`.
    ///
    /// The last value may overshoot `max_sigma`. Ratios so close to 1 that the
    /// schedule would exceed [`MAX_SCALES`] values are rejected.
    pub fn generate(min_sigma: f64, max_sigma: f64, ratio: f64) -> Result<Self> {
        ensure_positive_finite("min_sigma", min_sigma)?;
        ensure_positive_finite("max_sigma", max_sigma)?;
        if !ratio.is_finite() || ratio <= 1.0 {
            return Err(DetectionError::InvalidParameter {
                name: "sigma_ratio",
                reason: format!("must be a finite value greater than 1, got {}", ratio),
            });
        }
        if max_sigma <= min_sigma {
            return Err(DetectionError::InvalidSigmaRange {
                min_sigma,
                max_sigma,
            });
        }

        let too_many_scales = |steps: f64| DetectionError::InvalidParameter {
            name: "sigma_ratio",
            reason: format!(
                "{} needs {} steps to reach max_sigma, at most {} scales are allowed",
                ratio, steps, MAX_SCALES
            ),
        };

        let steps = ((max_sigma / min_sigma).ln() / ratio.ln()).ceil().max(1.0);
        if !(steps.is_finite() && steps < MAX_SCALES as f64) {
            return Err(too_many_scales(steps));
        }
        let mut k = steps as usize;
        // ceil of a rounded logarithm can land one step short
        while min_sigma * ratio.powi(k as i32) < max_sigma {
            if k + 1 >= MAX_SCALES {
                return Err(too_many_scales((k + 1) as f64));
            }
            k += 1;
        }

        let sigmas = (0..=k).map(|i| min_sigma * ratio.powi(i as i32)).collect();
        Ok(Self { sigmas, ratio })
    }

    /// Use an explicit list of σ values.
    ///
    /// The amplitude rescaling done before thresholding assumes a constant
    /// ratio between neighbours, so non-geometric lists are rejected.
    pub fn from_sigmas(sigmas: Vec<f64>) -> Result<Self> {
        if sigmas.len() < 2 {
            return Err(DetectionError::InvalidParameter {
                name: "sigmas",
                reason: format!("need at least 2 values, got {}", sigmas.len()),
            });
        }
        for &sigma in &sigmas {
            ensure_positive_finite("sigmas", sigma)?;
        }

        let ratio = sigmas[1] / sigmas[0];
        if ratio <= 1.0 {
            return Err(DetectionError::InvalidParameter {
                name: "sigmas",
                reason: "values must be strictly increasing".to_string(),
            });
        }
        for (index, pair) in sigmas.windows(2).enumerate().skip(1) {
            let found = pair[1] / pair[0];
            if !found.relative_eq(ratio, GEOMETRIC_TOLERANCE) {
                return Err(DetectionError::NonGeometricSchedule {
                    index,
                    expected: ratio,
                    found,
                });
            }
        }

        Ok(Self { sigmas, ratio })
    }

    #[inline]
    pub fn sigmas(&self) -> &[f64] {
        &self.sigmas
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sigmas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sigmas.is_empty()
    }

    /// Ratio between consecutive values.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    #[inline]
    pub fn max_sigma(&self) -> f64 {
        self.sigmas[self.sigmas.len() - 1]
    }

    /// Consecutive `(σ_i, σ_{i+1})` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.sigmas.windows(2).map(|w| (w[0], w[1]))
    }
}

fn ensure_positive_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DetectionError::InvalidParameter {
            name,
            reason: format!("must be a positive finite value, got {}", value),
        })
    }
}
