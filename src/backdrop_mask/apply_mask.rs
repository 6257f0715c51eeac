use image::Rgba;
use imageproc::map::map_colors2;

use crate::error::MaskError;
use crate::utils::validate_matching_dimensions;
use crate::Image;

/// Trait for compositing a generated mask over its source image
///
/// This previews what a page does with the mask as a CSS `mask-image`: the
/// source keeps its colors and its alpha is scaled by the mask alpha.
pub trait ApplyMask {
    /// Returns a copy of the image with the mask applied
    ///
    /// # Errors
    ///
    /// * `MaskError::DimensionMismatch` - When image and mask sizes differ
    ///
    /// # Examples
    ///
    /// ```
    /// use backdrop_mask::{ApplyMask, Image};
    /// use image::Rgba;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgba<u8>> = Image::from_pixel(2, 2, Rgba([200, 10, 10, 255]));
    /// let mask: Image<Rgba<u8>> = Image::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
    ///
    /// let masked = image.apply_mask(&mask)?;
    /// assert_eq!(masked.get_pixel(0, 0)[3], 0);
    /// # Ok(())
    /// # }
    /// ```
    fn apply_mask(&self, mask: &Image<Rgba<u8>>) -> Result<Image<Rgba<u8>>, MaskError>;

    /// Applies the mask in place
    ///
    /// # Errors
    ///
    /// * `MaskError::DimensionMismatch` - When image and mask sizes differ
    fn apply_mask_mut(&mut self, mask: &Image<Rgba<u8>>) -> Result<&mut Self, MaskError>;
}

impl ApplyMask for Image<Rgba<u8>> {
    fn apply_mask(&self, mask: &Image<Rgba<u8>>) -> Result<Image<Rgba<u8>>, MaskError> {
        validate_matching_dimensions(self.dimensions(), mask.dimensions())?;

        Ok(map_colors2(
            self,
            mask,
            |Rgba([red, green, blue, alpha]), Rgba([_, _, _, coverage])| {
                Rgba([red, green, blue, scale_alpha(alpha, coverage)])
            },
        ))
    }

    fn apply_mask_mut(&mut self, mask: &Image<Rgba<u8>>) -> Result<&mut Self, MaskError> {
        validate_matching_dimensions(self.dimensions(), mask.dimensions())?;

        self.pixels_mut()
            .zip(mask.pixels())
            .for_each(|(pixel, Rgba([_, _, _, coverage]))| {
                pixel[3] = scale_alpha(pixel[3], *coverage);
            });

        Ok(self)
    }
}

#[inline]
fn scale_alpha(alpha: u8, coverage: u8) -> u8 {
    let product = u16::from(alpha) * u16::from(coverage);
    ((product + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_alpha() {
        assert_eq!(scale_alpha(255, 255), 255);
        assert_eq!(scale_alpha(255, 0), 0);
        assert_eq!(scale_alpha(0, 255), 0);
        assert_eq!(scale_alpha(255, 128), 128);
        assert_eq!(scale_alpha(128, 128), 64);
    }

    #[test]
    fn test_apply_mask_keeps_colors() {
        let mut image: Image<Rgba<u8>> = Image::new(2, 1);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 255, 0, 200]));

        let mut mask: Image<Rgba<u8>> = Image::new(2, 1);
        mask.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        mask.put_pixel(1, 0, Rgba([0, 0, 0, 0]));

        let result = image.apply_mask(&mask).unwrap();
        assert_eq!(result.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(result.get_pixel(1, 0), &Rgba([0, 255, 0, 0]));
    }

    #[test]
    fn test_apply_mask_mut_matches_copy() {
        let image: Image<Rgba<u8>> = Image::from_pixel(3, 3, Rgba([10, 20, 30, 180]));
        let mask: Image<Rgba<u8>> = Image::from_pixel(3, 3, Rgba([0, 0, 0, 100]));

        let copied = image.apply_mask(&mask).unwrap();
        let mut in_place = image.clone();
        in_place.apply_mask_mut(&mask).unwrap();
        assert_eq!(copied, in_place);
    }

    #[test]
    fn test_apply_mask_dimension_mismatch() {
        let image: Image<Rgba<u8>> = Image::new(3, 3);
        let mask: Image<Rgba<u8>> = Image::new(3, 2);
        assert_eq!(
            image.apply_mask(&mask),
            Err(MaskError::DimensionMismatch {
                expected: (3, 3),
                actual: (3, 2),
            })
        );
    }
}
