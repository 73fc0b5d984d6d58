//! Synthetic frames and reference computations shared by unit tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::plane::Plane;

/// A Gaussian-profile granule to render into a synthetic frame.
#[derive(Debug, Clone, Copy)]
pub struct Spot {
    pub row: f64,
    pub col: f64,
    pub sigma: f64,
    pub amplitude: f64,
}

impl Spot {
    pub fn new(row: f64, col: f64, sigma: f64, amplitude: f64) -> Self {
        Self {
            row,
            col,
            sigma,
            amplitude,
        }
    }
}

/// Zero background with the given spots added.
pub fn render_spots(rows: usize, cols: usize, spots: &[Spot]) -> Plane {
    Plane::from_fn(rows, cols, |r, c| {
        spots
            .iter()
            .map(|s| {
                let dr = r as f64 - s.row;
                let dc = c as f64 - s.col;
                s.amplitude * (-(dr * dr + dc * dc) / (2.0 * s.sigma * s.sigma)).exp()
            })
            .sum()
    })
}

pub fn impulse(rows: usize, cols: usize, row: usize, col: usize) -> Plane {
    let mut plane = Plane::zeros(rows, cols);
    plane[(row, col)] = 1.0;
    plane
}

/// Uniform noise in `[0, amplitude)` added to `plane`, reproducible per seed.
pub fn with_noise(plane: &Plane, amplitude: f64, seed: u64) -> Plane {
    let mut rng = StdRng::seed_from_u64(seed);
    Plane::from_fn(plane.rows(), plane.cols(), |r, c| {
        plane.get(r, c) + amplitude * rng.random::<f64>()
    })
}

/// Spatial "same"-size convolution with a zero boundary, kernel centred on
/// `(size - 1) / 2`. Slow; only for cross-checking the FFT path.
pub fn direct_convolve(image: &Plane, kernel: &[f64], size: usize) -> Plane {
    assert_eq!(kernel.len(), size * size);
    let offset = ((size - 1) / 2) as isize;
    let (rows, cols) = image.shape();

    Plane::from_fn(rows, cols, |r, c| {
        let mut sum = 0.0;
        for ky in 0..size {
            let y = r as isize + offset - ky as isize;
            if y < 0 || y >= rows as isize {
                continue;
            }
            for kx in 0..size {
                let x = c as isize + offset - kx as isize;
                if x < 0 || x >= cols as isize {
                    continue;
                }
                sum += image.get(y as usize, x as usize) * kernel[ky * size + kx];
            }
        }
        sum
    })
}
