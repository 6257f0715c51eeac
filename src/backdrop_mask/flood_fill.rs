//! Background segmentation by perceptual flood fill.
//!
//! The fill compares every candidate pixel against one reference color,
//! sampled once from pixel (0, 0), and walks the image in vertical spans using
//! an explicit work stack.

use image::{Rgb, Rgba};

use crate::backdrop_mask::color_distance::{rgb_to_lab, Lab};
use crate::error::MaskError;
use crate::utils::{pixel_count, validate_non_empty_image};
use crate::Image;

/// Fuzz used by the fill primitive when the caller has no preference
pub const DEFAULT_FILL_FUZZ: f64 = 32.0;

const UNVISITED: u8 = 0;
const BACKGROUND: u8 = 1;

/// Per-pixel result of a flood fill
///
/// One flag byte per pixel, row-major: `0` for foreground (never reached) and
/// `1` for background reached by the fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationMask {
    width: u32,
    height: u32,
    flags: Vec<u8>,
}

impl SegmentationMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flags: vec![UNVISITED; pixel_count(width, height)],
        }
    }

    /// Builds a mask from raw flag bytes; any non-zero byte marks background.
    ///
    /// # Errors
    ///
    /// * `MaskError::EmptyImage` - When either dimension is zero
    /// * `MaskError::BufferLengthMismatch` - When `flags` does not hold one
    ///   byte per pixel
    pub fn from_flags(width: u32, height: u32, flags: Vec<u8>) -> Result<Self, MaskError> {
        validate_non_empty_image(width, height)?;
        let expected = pixel_count(width, height);
        if flags.len() != expected {
            return Err(MaskError::BufferLengthMismatch {
                width,
                height,
                expected,
                actual: flags.len(),
            });
        }
        let flags = flags
            .into_iter()
            .map(|flag| if flag == UNVISITED { UNVISITED } else { BACKGROUND })
            .collect();
        Ok(Self {
            width,
            height,
            flags,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the fill reached pixel (x, y)
    ///
    /// # Panics
    ///
    /// Panics when (x, y) lies outside the mask.
    #[inline]
    pub fn is_background(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.flags[self.index(x, y)] != UNVISITED
    }

    /// Number of pixels the fill reached
    pub fn background_count(&self) -> usize {
        self.flags.iter().filter(|&&flag| flag != UNVISITED).count()
    }

    /// Row-major flag bytes
    pub fn as_raw(&self) -> &[u8] {
        &self.flags
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn is_marked(&self, x: u32, y: u32) -> bool {
        self.flags[self.index(x, y)] != UNVISITED
    }

    #[inline]
    fn mark(&mut self, x: u32, y: u32) {
        let index = self.index(x, y);
        self.flags[index] = BACKGROUND;
    }
}

/// The four image corners in fill order: top-left, top-right, bottom-left,
/// bottom-right
pub fn corner_seeds(width: u32, height: u32) -> [(u32, u32); 4] {
    let right = width.saturating_sub(1);
    let bottom = height.saturating_sub(1);
    [(0, 0), (right, 0), (0, bottom), (right, bottom)]
}

/// Marks every pixel reachable from `seeds` through 4-connected neighbours
/// whose color distance to pixel (0, 0) is below `fuzz`
///
/// Seeds are popped from a LIFO stack, so the last seed is filled first. The
/// marked set does not depend on that order.
///
/// # Errors
///
/// * `MaskError::EmptyImage` - When the image has no pixels
/// * `MaskError::InvalidFuzz` - When `fuzz` is negative or not finite
/// * `MaskError::SeedOutOfBounds` - When a seed lies outside the image
pub fn segment(
    image: &Image<Rgba<u8>>,
    fuzz: f64,
    seeds: &[(u32, u32)],
) -> Result<SegmentationMask, MaskError> {
    let (width, height) = image.dimensions();
    validate_non_empty_image(width, height)?;
    validate_fuzz(fuzz)?;
    if let Some(&(x, y)) = seeds.iter().find(|(x, y)| *x >= width || *y >= height) {
        return Err(MaskError::SeedOutOfBounds {
            x,
            y,
            width,
            height,
        });
    }

    let reference = rgb_to_lab(rgb_of(image.get_pixel(0, 0)));
    let mut mask = SegmentationMask::new(width, height);
    let mut stack: Vec<(u32, u32)> = seeds.to_vec();

    let qualifies = |mask: &SegmentationMask, x: u32, y: u32| {
        !mask.is_marked(x, y) && within_fuzz(image, &reference, x, y, fuzz)
    };

    while let Some((x, mut y)) = stack.pop() {
        while y > 0 && qualifies(&mask, x, y - 1) {
            y -= 1;
        }

        while y < height && qualifies(&mask, x, y) {
            if x > 0 && qualifies(&mask, x - 1, y) {
                stack.push((x - 1, y));
            }
            if x + 1 < width && qualifies(&mask, x + 1, y) {
                stack.push((x + 1, y));
            }
            mask.mark(x, y);
            y += 1;
        }
    }

    tracing::debug!(
        width,
        height,
        fuzz,
        seeds = seeds.len(),
        background = mask.background_count(),
        "flood fill finished"
    );

    Ok(mask)
}

/// Rejects thresholds that cannot be compared against a color distance.
pub(crate) fn validate_fuzz(fuzz: f64) -> Result<(), MaskError> {
    if fuzz.is_finite() && fuzz >= 0.0 {
        Ok(())
    } else {
        Err(MaskError::InvalidFuzz(fuzz))
    }
}

#[inline]
fn rgb_of(pixel: &Rgba<u8>) -> Rgb<u8> {
    let Rgba([red, green, blue, _]) = *pixel;
    Rgb([red, green, blue])
}

#[inline]
fn within_fuzz(image: &Image<Rgba<u8>>, reference: &Lab, x: u32, y: u32, fuzz: f64) -> bool {
    rgb_to_lab(rgb_of(image.get_pixel(x, y))).delta_e(reference) < fuzz
}

/// Trait providing background segmentation by flood fill
pub trait FloodFill {
    /// Fills from the given seeds only
    fn flood_fill(&self, fuzz: f64, seeds: &[(u32, u32)]) -> Result<SegmentationMask, MaskError>;

    /// Fills from the four image corners
    fn flood_fill_corners(&self, fuzz: f64) -> Result<SegmentationMask, MaskError>;

    /// Fills from `seeds` followed by the four corners
    fn flood_fill_with_corners(
        &self,
        fuzz: f64,
        seeds: &[(u32, u32)],
    ) -> Result<SegmentationMask, MaskError>;
}

impl FloodFill for Image<Rgba<u8>> {
    fn flood_fill(&self, fuzz: f64, seeds: &[(u32, u32)]) -> Result<SegmentationMask, MaskError> {
        segment(self, fuzz, seeds)
    }

    fn flood_fill_corners(&self, fuzz: f64) -> Result<SegmentationMask, MaskError> {
        self.flood_fill_with_corners(fuzz, &[])
    }

    fn flood_fill_with_corners(
        &self,
        fuzz: f64,
        seeds: &[(u32, u32)],
    ) -> Result<SegmentationMask, MaskError> {
        let (width, height) = self.dimensions();
        let mut all_seeds = seeds.to_vec();
        all_seeds.extend(corner_seeds(width, height));
        segment(self, fuzz, &all_seeds)
    }
}
