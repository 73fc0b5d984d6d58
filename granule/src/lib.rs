//! FFT-accelerated Difference-of-Gaussians granule detection.
//!
//! Finds bright blob-like features (membrane granules, vesicles) in 2D
//! microscopy frames. A [`KernelBank`] holds the frequency-domain DoG kernels
//! for one frame shape and is reused across a whole video; each frame is
//! transformed once, multiplied by every kernel and transformed back, which
//! replaces the repeated spatial blurs of a classic `blob_dog` detector while
//! keeping its zero-boundary and amplitude-scaling semantics.
//!
//! ```
//! use granule::{BlobDetector, Config, Plane};
//!
//! let frame = Plane::from_fn(128, 128, |r, c| {
//!     let (dr, dc) = (r as f64 - 64.0, c as f64 - 40.0);
//!     (-(dr * dr + dc * dc) / 32.0).exp()
//! });
//!
//! let detector = BlobDetector::new(Config::default(), frame.shape()).unwrap();
//! let blobs = detector.detect(&frame).unwrap();
//! assert_eq!((blobs[0].row, blobs[0].col), (64, 40));
//! ```

mod blob;
mod config;
mod convolve;
mod detector;
mod error;
mod kernel;
mod peaks;
mod plan;
mod plane;
mod prune;
mod scale;
mod spatial;
mod spectrum;

#[cfg(test)]
mod test_utils;

pub use blob::Blob;
pub use config::Config;
pub use convolve::{convolve, ResponseVolume};
pub use detector::{detect_blobs, BlobDetector};
pub use error::{DetectionError, Result};
pub use kernel::{
    base_kernel_size, BankOptions, KernelBank, KernelVariant, DEFAULT_TRUNCATE_LENGTH,
};
pub use peaks::{extract_peaks, Peak, Thresholds};
pub use plan::{min_transform_length, plan_transform_length, TransformSize};
pub use plane::Plane;
pub use prune::{blob_overlap, disk_overlap, prune_blobs};
pub use scale::{ScaleSchedule, DEFAULT_SIGMA_RATIO};
pub use spatial::KdTree;
pub use spectrum::{RealFft2d, Spectrum};
