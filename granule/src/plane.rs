//! Row-major 2D intensity buffer.

use std::ops::{Deref, Index, IndexMut};

use crate::error::{DetectionError, Result};

/// A single-channel image plane, origin at the top-left corner.
///
/// Indexing is `(row, col)`, matching the layout the downstream boundary
/// extraction expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pixels: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Plane {
    pub fn new(rows: usize, cols: usize, pixels: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(DetectionError::EmptyPlane { rows, cols });
        }
        if pixels.len() != rows * cols {
            return Err(DetectionError::PixelCountMismatch {
                rows,
                cols,
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels, rows, cols })
    }

    /// Build a plane from a dynamically shaped array, as handed over by
    /// frame readers that do not know the dimensionality up front.
    pub fn from_shape(shape: &[usize], pixels: Vec<f64>) -> Result<Self> {
        match *shape {
            [rows, cols] => Self::new(rows, cols, pixels),
            _ => Err(DetectionError::NotTwoDimensional { ndim: shape.len() }),
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            pixels: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut pixels = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                pixels.push(f(row, col));
            }
        }
        Self { pixels, rows, cols }
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
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols);
        self.pixels[row * self.cols + col]
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.pixels[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub fn pixels(&self) -> &[f64] {
        &self.pixels
    }

    #[inline]
    pub fn into_vec(self) -> Vec<f64> {
        self.pixels
    }
}

impl Index<(usize, usize)> for Plane {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        &self.pixels[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Plane {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        &mut self.pixels[row * self.cols + col]
    }
}

impl Deref for Plane {
    type Target = [f64];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.pixels
    }
}

impl AsRef<[f64]> for Plane {
    #[inline]
    fn as_ref(&self) -> &[f64] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_pixel_count() {
        let err = Plane::new(2, 3, vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            DetectionError::PixelCountMismatch {
                rows: 2,
                cols: 3,
                actual: 5
            }
        );
    }

    #[test]
    fn test_new_rejects_empty_side() {
        assert!(matches!(
            Plane::new(0, 4, vec![]),
            Err(DetectionError::EmptyPlane { rows: 0, cols: 4 })
        ));
    }

    #[test]
    fn test_from_shape_requires_two_dimensions() {
        assert_eq!(
            Plane::from_shape(&[2, 2, 2], vec![0.0; 8]).unwrap_err(),
            DetectionError::NotTwoDimensional { ndim: 3 }
        );
        assert_eq!(
            Plane::from_shape(&[4], vec![0.0; 4]).unwrap_err(),
            DetectionError::NotTwoDimensional { ndim: 1 }
        );

        let plane = Plane::from_shape(&[2, 3], (0..6).map(f64::from).collect()).unwrap();
        assert_eq!(plane.shape(), (2, 3));
    }

    #[test]
    fn test_row_major_indexing() {
        let mut plane = Plane::from_fn(3, 4, |r, c| (r * 10 + c) as f64);
        assert_eq!(plane.get(2, 1), 21.0);
        assert_eq!(plane[(1, 3)], 13.0);
        assert_eq!(plane.row(1), &[10.0, 11.0, 12.0, 13.0]);

        plane[(0, 0)] = -1.0;
        assert_eq!(plane.pixels()[0], -1.0);
    }
}
