//! Frequency-domain Gaussian and DoG kernels for a fixed image geometry.
//!
//! A [`KernelBank`] is built once per (image shape, σ schedule) and then
//! reused for every frame of a video. It is never mutated afterwards, so it
//! can be shared freely between threads.


use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};

use crate::error::{DetectionError, Result};
use crate::plan::{min_transform_length, TransformSize};
use crate::plane::Plane;
use crate::scale::ScaleSchedule;
use crate::spectrum::{RealFft2d, Spectrum};

/// Default kernel cut-off, in standard deviations of the largest σ.
pub const DEFAULT_TRUNCATE_LENGTH: f64 = 4.0;

/// Which spatial kernel each probe of the bank holds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KernelVariant {
    /// One Gaussian per σ; the response volume holds blurred copies.
    Gaussian,
    /// One pre-subtracted `G(σ_i) - G(σ_{i+1})` per consecutive pair, which
    /// saves an inverse transform per pair.
    #[default]
    #[serde(alias = "delta", alias = "dog")]
    Difference,
}

impl KernelVariant {
    /// Number of kernels (and response planes) for `schedule`.
    pub fn probe_count(&self, schedule: &ScaleSchedule) -> usize {
        match self {
            KernelVariant::Gaussian => schedule.len(),
            KernelVariant::Difference => schedule.len() - 1,
        }
    }

    /// Spatial `size x size` kernel for probe `probe`.
    pub fn spatial_kernel(&self, schedule: &ScaleSchedule, probe: usize, size: usize) -> Vec<f64> {
        let sigmas = schedule.sigmas();
        match self {
            KernelVariant::Gaussian => gaussian_kernel_2d(size, sigmas[probe]),
            KernelVariant::Difference => {
                let mut kernel = gaussian_kernel_2d(size, sigmas[probe]);
                let wider = gaussian_kernel_2d(size, sigmas[probe + 1]);
                for (k, w) in kernel.iter_mut().zip(wider) {
                    *k -= w;
                }
                kernel
            }
        }
    }
}

impl fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

impl FromStr for KernelVariant {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaussian" | "plain" => Ok(KernelVariant::Gaussian),
            "difference" | "delta" | "dog" => Ok(KernelVariant::Difference),
            _ => Err(DetectionError::UnknownVariant(s.to_string())),
        }
    }
}

/// Isotropic 2D Gaussian sampled on a `size x size` grid, row-major.
///
/// Centred on index `(size - 1) / 2` along both axes and normalized by
/// `2πσ²`, so it integrates (rather than sums) to one.
///
/// Callers pass σ values from a validated [`ScaleSchedule`].
pub(crate) fn gaussian_kernel_2d(size: usize, sigma: f64) -> Vec<f64> {
    debug_assert!(sigma > 0.0, "Sigma must be positive");

    let center = ((size.max(1) - 1) / 2) as f64;
    let two_sigma_sq = 2.0 * sigma * sigma;
    let factor = PI * two_sigma_sq;

    let axis: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - center;
            d * d
        })
        .collect();

    let mut kernel = Vec::with_capacity(size * size);
    for &dy2 in &axis {
        for &dx2 in &axis {
            kernel.push((-(dx2 + dy2) / two_sigma_sq).exp() / factor);
        }
    }
    kernel
}

/// `floor(truncate_length * 2 * max_sigma + 1)`.
///
/// Fails when the kernel would have no spatial extent beyond its centre.
pub fn base_kernel_size(max_sigma: f64, truncate_length: f64) -> Result<usize> {
    let size = (truncate_length * 2.0 * max_sigma + 1.0).floor();
    if !(size.is_finite() && size >= 3.0) {
        return Err(DetectionError::DegenerateKernel { size });
    }
    Ok(size as usize)
}

/// Options for [`KernelBank::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankOptions {
    pub truncate_length: f64,
    pub transform_size: TransformSize,
    pub variant: KernelVariant,
}

impl Default for BankOptions {
    fn default() -> Self {
        Self {
            truncate_length: DEFAULT_TRUNCATE_LENGTH,
            transform_size: TransformSize::default(),
            variant: KernelVariant::default(),
        }
    }
}

/// Precomputed half-spectrum kernels for one image geometry.
#[derive(Debug, Clone)]
pub struct KernelBank {
    schedule: ScaleSchedule,
    variant: KernelVariant,
    rows: usize,
    cols: usize,
    base_kernel_size: usize,
    fft: RealFft2d,
    kernels: Vec<Spectrum>,
}

impl KernelBank {
    /// Derive kernel size and transform length, then precompute the kernels.
    pub fn build(
        schedule: ScaleSchedule,
        (rows, cols): (usize, usize),
        options: &BankOptions,
    ) -> Result<Self> {
        let kernel_size = base_kernel_size(schedule.max_sigma(), options.truncate_length)?;
        let transform_length = options
            .transform_size
            .resolve(rows.max(cols), kernel_size);

        Self::from_parts(
            schedule,
            (rows, cols),
            transform_length,
            kernel_size,
            options.variant,
        )
    }

    /// Build with an explicit transform length and kernel size.
    pub fn from_parts(
        schedule: ScaleSchedule,
        (rows, cols): (usize, usize),
        transform_length: usize,
        base_kernel_size: usize,
        variant: KernelVariant,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(DetectionError::EmptyPlane { rows, cols });
        }
        if base_kernel_size < 3 {
            return Err(DetectionError::DegenerateKernel {
                size: base_kernel_size as f64,
            });
        }
        let required = base_kernel_size.max(rows).max(cols);
        if transform_length < required {
            return Err(DetectionError::TransformTooSmall {
                transform_length,
                required,
            });
        }
        if transform_length < min_transform_length(rows.max(cols), base_kernel_size) {
            log::warn!(
                "Transform length {} is below {}, edges of {}x{} frames with kernel {} will wrap around",
                transform_length,
                min_transform_length(rows.max(cols), base_kernel_size),
                rows,
                cols,
                base_kernel_size
            );
        }

        let fft = RealFft2d::new(transform_length);
        let n = transform_length;
        let k = base_kernel_size;

        let mut padded = vec![0.0; n * n];
        let kernels = (0..variant.probe_count(&schedule))
            .map(|probe| {
                let spatial = variant.spatial_kernel(&schedule, probe, k);
                for (row, values) in spatial.chunks_exact(k).enumerate() {
                    padded[row * n..row * n + k].copy_from_slice(values);
                }
                fft.forward(&padded)
            })
            .collect();

        log::debug!(
            "Built {} {} kernels of size {} on a {}x{} transform for {}x{} frames",
            variant.probe_count(&schedule),
            variant,
            k,
            n,
            n,
            rows,
            cols
        );

        Ok(Self {
            schedule,
            variant,
            rows,
            cols,
            base_kernel_size,
            fft,
            kernels,
        })
    }

    #[inline]
    pub fn schedule(&self) -> &ScaleSchedule {
        &self.schedule
    }

    #[inline]
    pub fn variant(&self) -> KernelVariant {
        self.variant
    }

    /// Image shape `(rows, cols)` the bank was built for.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn base_kernel_size(&self) -> usize {
        self.base_kernel_size
    }

    #[inline]
    pub fn transform_length(&self) -> usize {
        self.fft.size()
    }

    /// Offset between the padded response and the image footprint.
    #[inline]
    pub fn crop_offset(&self) -> usize {
        (self.base_kernel_size - 1) / 2
    }

    #[inline]
    pub fn kernels(&self) -> &[Spectrum] {
        &self.kernels
    }

    #[inline]
    pub fn probe_count(&self) -> usize {
        self.kernels.len()
    }

    #[inline]
    pub(crate) fn fft(&self) -> &RealFft2d {
        &self.fft
    }

    pub(crate) fn check_shape(&self, image: &Plane) -> Result<()> {
        if image.shape() != (self.rows, self.cols) {
            return Err(DetectionError::ShapeMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                actual_rows: image.rows(),
                actual_cols: image.cols(),
            });
        }
        Ok(())
    }
}
