//! FFT convolution of one frame against every kernel of a bank.


use crate::error::Result;
use crate::kernel::KernelBank;
use crate::plane::Plane;

/// Stack of per-probe response planes, indexed `(scale, row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseVolume {
    depth: usize,
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ResponseVolume {
    pub fn zeros(depth: usize, rows: usize, cols: usize) -> Self {
        Self {
            depth,
            rows,
            cols,
            data: vec![0.0; depth * rows * cols],
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, scale: usize, row: usize, col: usize) -> f64 {
        self.data[(scale * self.rows + row) * self.cols + col]
    }

    #[inline]
    pub fn plane(&self, scale: usize) -> &[f64] {
        let len = self.rows * self.cols;
        &self.data[scale * len..(scale + 1) * len]
    }

    #[inline]
    pub fn plane_mut(&mut self, scale: usize) -> &mut [f64] {
        let len = self.rows * self.cols;
        &mut self.data[scale * len..(scale + 1) * len]
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// `(min, max)` ignoring NaNs, or `None` for an empty volume.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Difference of adjacent planes, `plane(i) - plane(i + 1)`.
    ///
    /// Turns a stack of Gaussian blurs into the DoG stack that a
    /// [`crate::KernelVariant::Difference`] bank produces directly.
    pub fn differences(&self) -> ResponseVolume {
        let depth = self.depth.saturating_sub(1);
        let mut out = ResponseVolume::zeros(depth, self.rows, self.cols);
        for scale in 0..depth {
            let (narrow, wide) = (self.plane(scale), self.plane(scale + 1));
            for ((o, &a), &b) in out.plane_mut(scale).iter_mut().zip(narrow).zip(wide) {
                *o = a - b;
            }
        }
        out
    }
}

/// Convolve `image` with every kernel in `bank`.
///
/// The image is zero padded to the transform length, transformed once,
/// multiplied by each kernel spectrum and transformed back. Each plane is
/// then cropped to the image footprint at offset `(K - 1) / 2`, which
/// realizes a constant-zero boundary. Crop indices wrap modulo the transform
/// length, so a forced short transform degrades to periodic boundaries.
pub fn convolve(bank: &KernelBank, image: &Plane) -> Result<ResponseVolume> {
    bank.check_shape(image)?;

    let fft = bank.fft();
    let n = bank.transform_length();
    let (rows, cols) = image.shape();
    let offset = bank.crop_offset();

    let mut padded = vec![0.0; n * n];
    for row in 0..rows {
        padded[row * n..row * n + cols].copy_from_slice(image.row(row));
    }
    let image_spectrum = fft.forward(&padded);

    let mut product = fft.zero_spectrum();
    let mut volume = ResponseVolume::zeros(bank.probe_count(), rows, cols);
    for (scale, kernel) in bank.kernels().iter().enumerate() {
        image_spectrum.multiply_into(kernel, &mut product);
        fft.inverse_into(&product, &mut padded);

        let plane = volume.plane_mut(scale);
        for (row, out_row) in plane.chunks_exact_mut(cols).enumerate() {
            let src_row = (row + offset) % n;
            for (col, out) in out_row.iter_mut().enumerate() {
                *out = padded[src_row * n + (col + offset) % n];
            }
        }
    }

    Ok(volume)
}

impl KernelBank {
    /// See [`convolve`].
    pub fn convolve(&self, image: &Plane) -> Result<ResponseVolume> {
        convolve(self, image)
    }
}
