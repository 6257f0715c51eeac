//! Test utilities for backdrop-mask
//!
//! This module provides common fixtures for testing the mask stages.
//! It is only compiled when running tests.

use image::Rgba;

use crate::Image;

/// Creates an image with a solid frame around a solid inner rectangle.
///
/// # Arguments
/// * `width` - Width of the image
/// * `height` - Height of the image
/// * `border` - Thickness of the frame in pixels
/// * `frame` - Color of the frame
/// * `inner` - Color of everything inside the frame
pub fn create_framed_image(
    width: u32,
    height: u32,
    border: u32,
    frame: Rgba<u8>,
    inner: Rgba<u8>,
) -> Image<Rgba<u8>> {
    Image::from_fn(width, height, |x, y| {
        let inside = x >= border
            && y >= border
            && x < width.saturating_sub(border)
            && y < height.saturating_sub(border);
        if inside {
            inner
        } else {
            frame
        }
    })
}

/// Collects the alpha channel of an image row-major.
pub fn alpha_channel(image: &Image<Rgba<u8>>) -> Vec<u8> {
    image.pixels().map(|pixel| pixel[3]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_framed_image_with_valid_input_creates_image() {
        let image = create_framed_image(
            5,
            4,
            1,
            Rgba([0, 0, 0, 255]),
            Rgba([9, 9, 9, 255]),
        );
        assert_eq!(image.dimensions(), (5, 4));
        assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([9, 9, 9, 255]));
        assert_eq!(image.get_pixel(3, 2), &Rgba([9, 9, 9, 255]));
        assert_eq!(image.get_pixel(4, 2), &Rgba([0, 0, 0, 255]));
        assert_eq!(image.get_pixel(2, 3), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn alpha_channel_reads_fourth_byte() {
        let image: Image<Rgba<u8>> = Image::from_pixel(2, 1, Rgba([1, 2, 3, 4]));
        assert_eq!(alpha_channel(&image), vec![4, 4]);
    }
}
