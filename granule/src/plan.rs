//! Transform length selection.
//!
//! Zero padding an image of side `L` for a kernel of side `K` needs at least
//! `L + K - 1` samples to avoid circular wraparound. When that lands just past
//! a power of two, jumping to the next power doubles the work, so lengths of
//! the form `3·2^n` and `5·2^n` below that power are tried first.

use serde::{Deserialize, Serialize};

/// How the transform length of a kernel bank is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSize {
    /// Smallest fast length that avoids wraparound, see [`plan_transform_length`].
    Auto {
        allow_factor_3: bool,
        allow_factor_5: bool,
    },
    /// Caller-chosen length. Lengths below `L + K - 1` are allowed and trade
    /// edge artifacts for speed, e.g. `L.next_power_of_two()`.
    Fixed(usize),
}

impl Default for TransformSize {
    fn default() -> Self {
        Self::Auto {
            allow_factor_3: true,
            allow_factor_5: true,
        }
    }
}

impl TransformSize {
    pub fn resolve(&self, largest_image_dimension: usize, base_kernel_size: usize) -> usize {
        match *self {
            TransformSize::Auto {
                allow_factor_3,
                allow_factor_5,
            } => plan_transform_length(
                largest_image_dimension,
                base_kernel_size,
                allow_factor_3,
                allow_factor_5,
            ),
            TransformSize::Fixed(length) => length,
        }
    }
}

/// Pick the padded square transform length for the given image and kernel.
pub fn plan_transform_length(
    largest_image_dimension: usize,
    base_kernel_size: usize,
    allow_factor_3: bool,
    allow_factor_5: bool,
) -> usize {
    let min_required = min_transform_length(largest_image_dimension, base_kernel_size);
    let power_of_two = min_required.next_power_of_two();
    let factor_3 = 3 * power_of_two / 4;
    let factor_5 = 5 * power_of_two / 8;

    if allow_factor_5 && factor_5 >= min_required {
        log::info!(
            "Using 5*2^n transform length {} >= {}",
            factor_5,
            min_required
        );
        factor_5
    } else if allow_factor_3 && factor_3 >= min_required {
        log::info!(
            "Using 3*2^n transform length {} >= {}",
            factor_3,
            min_required
        );
        factor_3
    } else {
        log::info!(
            "Falling back to power of two transform length {} from {}",
            power_of_two,
            min_required
        );
        power_of_two
    }
}

/// Smallest length that emulates a constant-zero boundary.
#[inline]
pub fn min_transform_length(largest_image_dimension: usize, base_kernel_size: usize) -> usize {
    (largest_image_dimension + base_kernel_size).saturating_sub(1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_never_below_min_required() {
        for image_dim in (1..300).chain([511, 512, 513, 1000, 1024, 1025, 2048]) {
            for kernel in [1, 2, 3, 9, 17, 33, 41, 81, 161] {
                for (allow_3, allow_5) in [(true, true), (true, false), (false, true), (false, false)] {
                    let n = plan_transform_length(image_dim, kernel, allow_3, allow_5);
                    assert!(
                        n >= image_dim + kernel - 1,
                        "plan({}, {}) = {} too small",
                        image_dim,
                        kernel,
                        n
                    );
                }
            }
        }
    }

    #[test]
    fn test_plan_prefers_factor_5() {
        // 1024 + 41 - 1 = 1064 -> P = 2048, 5P/8 = 1280, 3P/4 = 1536
        assert_eq!(plan_transform_length(1024, 41, true, true), 1280);
        assert_eq!(plan_transform_length(1024, 41, true, false), 1536);
        assert_eq!(plan_transform_length(1024, 41, false, false), 2048);
    }

    #[test]
    fn test_plan_falls_back_to_factor_3() {
        // 1024 + 401 - 1 = 1424 -> 5P/8 = 1280 too small, 3P/4 = 1536 fits
        assert_eq!(plan_transform_length(1024, 401, true, true), 1536);
        assert_eq!(plan_transform_length(1024, 401, false, true), 2048);
    }

    #[test]
    fn test_plan_falls_back_to_power_of_two() {
        // 256 + 257 - 1 = 512 -> P = 512 and both candidates are smaller
        assert_eq!(plan_transform_length(256, 257, true, true), 512);
        // 200 + 41 - 1 = 240 -> P = 256, 5P/8 = 160, 3P/4 = 192
        assert_eq!(plan_transform_length(200, 41, true, true), 256);
    }

    #[test]
    fn test_plan_accepts_exact_candidate() {
        // 1280 is exactly min_required
        assert_eq!(plan_transform_length(1200, 81, true, true), 1280);
    }

    #[test]
    fn test_transform_size_resolve() {
        assert_eq!(TransformSize::default().resolve(1024, 41), 1280);
        assert_eq!(
            TransformSize::Auto {
                allow_factor_3: false,
                allow_factor_5: false
            }
            .resolve(1024, 41),
            2048
        );
        // fixed lengths bypass the heuristic, even when too short to avoid wraparound
        assert_eq!(TransformSize::Fixed(1024).resolve(1024, 41), 1024);
    }

    #[test]
    fn test_min_transform_length() {
        assert_eq!(min_transform_length(256, 33), 288);
        assert_eq!(min_transform_length(1, 1), 1);
    }
}
