use std::f64::consts::SQRT_2;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::peaks::Peak;

/// A detected granule: centre pixel and the σ of the DoG scale it peaked at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub row: usize,
    pub col: usize,
    pub sigma: f64,
}

impl Blob {
    pub fn new(row: usize, col: usize, sigma: f64) -> Self {
        Self { row, col, sigma }
    }

    /// Radius of the disk the granule covers, `σ·√2`.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.sigma * SQRT_2
    }

    /// Centre as `(x, y) = (col, row)`.
    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.col as f64, self.row as f64)
    }
}

impl From<Peak> for Blob {
    fn from(peak: Peak) -> Self {
        Self {
            row: peak.row,
            col: peak.col,
            sigma: peak.sigma,
        }
    }
}
