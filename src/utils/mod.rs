//! Internal utility functions for backdrop-mask.
//!
//! This module contains validation and buffer helpers shared by the mask stages.

use image::{ImageBuffer, Rgba};

use crate::error::MaskError;
use crate::Image;

/// Number of bytes in one RGBA pixel.
pub const RGBA_CHANNELS: usize = 4;

/// Builds a pixel buffer from raw RGBA bytes.
///
/// Unlike [`ImageBuffer::from_raw`], which accepts oversized buffers and empty
/// images, this requires exactly `width * height * 4` bytes and non-zero
/// dimensions.
///
/// # Errors
///
/// * `MaskError::EmptyImage` - When `width` or `height` is zero
/// * `MaskError::BufferLengthMismatch` - When the byte count is wrong
///
/// # Examples
///
/// ```
/// use backdrop_mask::pixel_buffer_from_raw;
///
/// let image = pixel_buffer_from_raw(2, 1, vec![255; 8]).unwrap();
/// assert_eq!(image.dimensions(), (2, 1));
///
/// assert!(pixel_buffer_from_raw(2, 1, vec![255; 7]).is_err());
/// ```
pub fn pixel_buffer_from_raw(
    width: u32,
    height: u32,
    bytes: Vec<u8>,
) -> Result<Image<Rgba<u8>>, MaskError> {
    validate_non_empty_image(width, height)?;

    let expected = pixel_count(width, height) * RGBA_CHANNELS;
    let actual = bytes.len();
    // `from_raw` accepts oversized buffers, the length has to match exactly
    ImageBuffer::from_raw(width, height, bytes)
        .filter(|_| actual == expected)
        .ok_or(MaskError::BufferLengthMismatch {
            width,
            height,
            expected,
            actual,
        })
}

/// Validates that an image has non-zero dimensions.
#[inline]
pub fn validate_non_empty_image(width: u32, height: u32) -> Result<(), MaskError> {
    if width == 0 || height == 0 {
        Err(MaskError::EmptyImage)
    } else {
        Ok(())
    }
}

/// Validates that two images have matching dimensions.
///
/// # Arguments
///
/// * `expected` - Dimensions of the reference image
/// * `actual` - Dimensions of the image being checked against it
pub fn validate_matching_dimensions(
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), MaskError> {
    if expected != actual {
        Err(MaskError::DimensionMismatch { expected, actual })
    } else {
        Ok(())
    }
}

/// Number of pixels in a `width` x `height` image.
#[inline]
pub fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Rounds half up and clamps into the byte range, the way a clamped canvas
/// byte array stores floating-point writes.
#[inline]
pub fn round_to_u8(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}
