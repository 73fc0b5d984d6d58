//! Real-input 2D FFT on square buffers.
//!
//! Only the non-redundant half of the spectrum is stored: for a real `n x n`
//! signal, column `k` and `n - k` of every row spectrum are complex
//! conjugates, so `n / 2 + 1` columns are kept. Rows are transformed first,
//! then the retained columns.

use std::fmt;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Half spectrum of a real `n x n` signal, row-major `n x (n / 2 + 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    size: usize,
    data: Vec<Complex<f64>>,
}

impl Spectrum {
    /// Side length of the spatial signal.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored columns.
    #[inline]
    pub fn half_width(&self) -> usize {
        half_width(self.size)
    }

    #[inline]
    pub fn data(&self) -> &[Complex<f64>] {
        &self.data
    }

    /// Element-wise product, written into `out`.
    pub fn multiply_into(&self, other: &Spectrum, out: &mut Spectrum) {
        assert_eq!(self.size, other.size, "Spectrum size mismatch");
        assert_eq!(self.size, out.size, "Output spectrum size mismatch");
        for ((o, &a), &b) in out.data.iter_mut().zip(&self.data).zip(&other.data) {
            *o = a * b;
        }
    }
}

/// Forward and inverse plans for one transform length.
///
/// Plans are immutable and shared, so one instance can serve any number of
/// threads.
#[derive(Clone)]
pub struct RealFft2d {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for RealFft2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealFft2d").field("size", &self.size).finish()
    }
}

impl RealFft2d {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be positive");

        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        Self {
            size,
            forward,
            inverse,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// An all-zero spectrum of the right shape, for use as an output buffer.
    pub fn zero_spectrum(&self) -> Spectrum {
        Spectrum {
            size: self.size,
            data: vec![Complex::new(0.0, 0.0); self.size * half_width(self.size)],
        }
    }

    /// Forward transform of a row-major `size x size` real signal.
    pub fn forward(&self, signal: &[f64]) -> Spectrum {
        let n = self.size;
        let hw = half_width(n);
        assert_eq!(signal.len(), n * n, "Signal length mismatch");

        let mut spectrum = self.zero_spectrum();
        let mut line = vec![Complex::new(0.0, 0.0); n];

        // Rows
        for (row, values) in signal.chunks_exact(n).enumerate() {
            for (c, &v) in line.iter_mut().zip(values) {
                *c = Complex::new(v, 0.0);
            }
            self.forward.process(&mut line);
            spectrum.data[row * hw..(row + 1) * hw].copy_from_slice(&line[..hw]);
        }

        // Retained columns
        self.process_columns(&mut spectrum, &self.forward, &mut line);

        spectrum
    }

    /// Inverse transform back to a real `size x size` signal, normalized so
    /// that `inverse(forward(x)) == x`.
    pub fn inverse(&self, spectrum: &Spectrum) -> Vec<f64> {
        let mut output = vec![0.0; self.size * self.size];
        self.inverse_into(spectrum, &mut output);
        output
    }

    /// Like [`RealFft2d::inverse`], writing into a caller-owned buffer.
    pub fn inverse_into(&self, spectrum: &Spectrum, output: &mut [f64]) {
        let n = self.size;
        let hw = half_width(n);
        assert_eq!(spectrum.size, n, "Spectrum size mismatch");
        assert_eq!(output.len(), n * n, "Output length mismatch");

        let mut work = spectrum.clone();
        let mut line = vec![Complex::new(0.0, 0.0); n];

        self.process_columns(&mut work, &self.inverse, &mut line);

        let norm = 1.0 / (n * n) as f64;
        for (row, out_row) in output.chunks_exact_mut(n).enumerate() {
            let half = &work.data[row * hw..(row + 1) * hw];
            line[..hw].copy_from_slice(half);
            // Rebuild the conjugate-symmetric upper half of the row spectrum
            for k in hw..n {
                line[k] = half[n - k].conj();
            }
            self.inverse.process(&mut line);
            for (o, c) in out_row.iter_mut().zip(&line) {
                *o = c.re * norm;
            }
        }
    }

    fn process_columns(
        &self,
        spectrum: &mut Spectrum,
        fft: &Arc<dyn Fft<f64>>,
        line: &mut [Complex<f64>],
    ) {
        let n = self.size;
        let hw = half_width(n);
        for col in 0..hw {
            for (row, c) in line.iter_mut().enumerate() {
                *c = spectrum.data[row * hw + col];
            }
            fft.process(line);
            for (row, &c) in line.iter().enumerate() {
                spectrum.data[row * hw + col] = c;
            }
        }
    }
}

#[inline]
fn half_width(size: usize) -> usize {
    size / 2 + 1
}
