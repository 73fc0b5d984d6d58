use thiserror::Error;

/// Errors raised while configuring or running the detector.
///
/// An empty detection list is not an error; see [`crate::detect_blobs`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    #[error("max_sigma ({max_sigma}) must be greater than min_sigma ({min_sigma})")]
    InvalidSigmaRange { min_sigma: f64, max_sigma: f64 },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Sigma schedule is not geometric: ratio {found} at index {index}, expected {expected}")]
    NonGeometricSchedule {
        index: usize,
        expected: f64,
        found: f64,
    },

    #[error("Unknown kernel variant '{0}', expected 'gaussian' or 'difference'")]
    UnknownVariant(String),

    #[error("Expected a 2D image, got {ndim} dimensions")]
    NotTwoDimensional { ndim: usize },

    #[error("Pixel count {actual} does not match shape {rows}x{cols}")]
    PixelCountMismatch {
        rows: usize,
        cols: usize,
        actual: usize,
    },

    #[error("Image shape {rows}x{cols} has an empty side")]
    EmptyPlane { rows: usize, cols: usize },

    #[error(
        "Image shape {actual_rows}x{actual_cols} differs from the kernel bank geometry {expected_rows}x{expected_cols}"
    )]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    #[error("Response volume has {planes} planes but the sigma schedule only has {sigmas}")]
    ScaleCountMismatch { planes: usize, sigmas: usize },

    #[error("Kernel size {size} has no spatial extent")]
    DegenerateKernel { size: f64 },

    #[error("Transform length {transform_length} is smaller than required {required}")]
    TransformTooSmall {
        transform_length: usize,
        required: usize,
    },
}

pub type Result<T> = std::result::Result<T, DetectionError>;
