use image::Rgba;

use crate::backdrop_mask::flood_fill::SegmentationMask;
use crate::Image;

/// Pixel written where the fill reached the background
pub const CUT_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Pixel written where the image is kept
pub const KEPT_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Converts a segmentation into a binary RGBA mask
///
/// Background pixels become fully transparent black and everything else
/// opaque black. Only the alpha channel carries information downstream.
///
/// # Examples
///
/// ```
/// use backdrop_mask::{rasterize, SegmentationMask};
///
/// let segmentation = SegmentationMask::from_flags(2, 1, vec![1, 0]).unwrap();
/// let mask = rasterize(&segmentation);
/// assert_eq!(mask.get_pixel(0, 0).0, [0, 0, 0, 0]);
/// assert_eq!(mask.get_pixel(1, 0).0, [0, 0, 0, 255]);
/// ```
pub fn rasterize(segmentation: &SegmentationMask) -> Image<Rgba<u8>> {
    let (width, height) = segmentation.dimensions();
    Image::from_fn(width, height, |x, y| {
        if segmentation.is_background(x, y) {
            CUT_PIXEL
        } else {
            KEPT_PIXEL
        }
    })
}

impl SegmentationMask {
    /// Rasterizes this segmentation, see [`rasterize`]
    pub fn to_alpha_mask(&self) -> Image<Rgba<u8>> {
        rasterize(self)
    }
}
