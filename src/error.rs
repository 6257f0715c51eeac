use thiserror::Error;

/// Error type for mask generation operations
///
/// Every variant describes malformed input. Segmentation and feathering are
/// deterministic, so none of these are worth retrying.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaskError {
    /// The image has zero width or zero height
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// Raw pixel data does not hold exactly `width * height` RGBA pixels
    ///
    /// This error is returned when a pixel buffer is built from raw bytes
    /// whose length is not `width * height * 4`.
    #[error("Pixel buffer length mismatch for {width}x{height}: expected {expected} bytes, got {actual}")]
    BufferLengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// The fill threshold is negative or not a finite number
    #[error("Fuzz must be a finite, non-negative color distance, got {0}")]
    InvalidFuzz(f64),

    /// A flood fill seed lies outside the image
    #[error("Seed ({x}, {y}) is outside the {width}x{height} image")]
    SeedOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// The blur region does not fit inside the image
    ///
    /// The region is given as `(x, y, width, height)`.
    #[error("Blur region {region:?} does not fit inside the {width}x{height} image")]
    RegionOutOfBounds {
        /// Requested region (x, y, width, height)
        region: (u32, u32, u32, u32),
        width: u32,
        height: u32,
    },

    /// Image and mask dimensions do not match
    #[error("Image and mask dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// Error type for decoding source assets and encoding masks
#[derive(Debug, Error)]
pub enum CodecError {
    /// The image could not be decoded, encoded or written
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// The decoded image was rejected by mask generation
    #[error(transparent)]
    Mask(#[from] MaskError),
}
