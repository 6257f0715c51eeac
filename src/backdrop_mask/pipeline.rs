use image::Rgba;

use crate::backdrop_mask::box_blur::{box_blur, BoxBlurOptions, EaseAlpha};
use crate::backdrop_mask::flood_fill::{corner_seeds, segment, validate_fuzz};
use crate::backdrop_mask::rasterize::rasterize;
use crate::error::MaskError;
use crate::Image;

/// Fuzz used by the mask pipeline
pub const DEFAULT_MASK_FUZZ: f64 = 50.0;

/// Feathering radius used by the mask pipeline
pub const DEFAULT_BLUR_RADIUS: u32 = 2;

/// Fourth-power alpha curve
///
/// Suppresses the soft mid-range halo of the blur and gives a crisper cutoff
/// than a linear average.
pub fn quartic_ease(coverage: f64) -> f64 {
    coverage.powi(4)
}

/// Configuration for [`generate_mask_with`]
///
/// # Examples
///
/// ```
/// use backdrop_mask::MaskOptions;
///
/// let options = MaskOptions::new().fuzz(20.0).blur_radius(0);
/// assert_eq!(options.fuzz, 20.0);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MaskOptions {
    /// Color distance below which a pixel joins the background
    pub fuzz: f64,
    /// Feathering radius, 0 skips feathering
    pub blur_radius: u32,
    /// Number of feathering passes
    pub blur_iterations: u32,
    /// Curve for the feathered alpha, `None` for linear
    pub ease_alpha: Option<EaseAlpha>,
    /// Preserve fully transparent pixels while feathering
    pub mask_mode: bool,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            fuzz: DEFAULT_MASK_FUZZ,
            blur_radius: DEFAULT_BLUR_RADIUS,
            blur_iterations: 1,
            ease_alpha: Some(quartic_ease),
            mask_mode: false,
        }
    }
}

impl MaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn fuzz(mut self, fuzz: f64) -> Self {
        self.fuzz = fuzz;
        self
    }

    #[inline]
    pub fn blur_radius(mut self, radius: u32) -> Self {
        self.blur_radius = radius;
        self
    }

    #[inline]
    pub fn blur_iterations(mut self, iterations: u32) -> Self {
        self.blur_iterations = iterations;
        self
    }

    #[inline]
    pub fn ease_alpha(mut self, ease: EaseAlpha) -> Self {
        self.ease_alpha = Some(ease);
        self
    }

    /// Use the plain window average for the feathered alpha.
    #[inline]
    pub fn linear_alpha(mut self) -> Self {
        self.ease_alpha = None;
        self
    }

    #[inline]
    pub fn mask_mode(mut self, enabled: bool) -> Self {
        self.mask_mode = enabled;
        self
    }

    /// Checks the options without running the pipeline.
    ///
    /// A zero radius is valid and means no feathering.
    pub fn validate(&self) -> Result<(), MaskError> {
        validate_fuzz(self.fuzz)
    }

    fn blur_options(&self) -> BoxBlurOptions {
        BoxBlurOptions {
            iterations: self.blur_iterations,
            region: None,
            mask_mode: self.mask_mode,
            ease_alpha: self.ease_alpha,
        }
    }
}

/// Generates a feathered background mask with the default options
///
/// The result has the same size as `image`; its color channels are black and
/// its alpha is 0 where the background was cut away and 255 where the image
/// stays visible.
///
/// # Errors
///
/// * `MaskError::EmptyImage` - When the image has no pixels
pub fn generate_mask(image: &Image<Rgba<u8>>) -> Result<Image<Rgba<u8>>, MaskError> {
    generate_mask_with(image, &MaskOptions::default())
}

/// Generates a feathered background mask
///
/// The background is flood filled from the four corners, rasterized into a
/// binary mask and feathered with a box blur.
///
/// # Errors
///
/// * `MaskError::EmptyImage` - When the image has no pixels
/// * `MaskError::InvalidFuzz` - When `options.fuzz` is negative or not finite
pub fn generate_mask_with(
    image: &Image<Rgba<u8>>,
    options: &MaskOptions,
) -> Result<Image<Rgba<u8>>, MaskError> {
    options.validate()?;

    let (width, height) = image.dimensions();
    let segmentation = segment(image, options.fuzz, &corner_seeds(width, height))?;
    let mut mask = rasterize(&segmentation);
    box_blur(&mut mask, options.blur_radius, &options.blur_options())?;

    tracing::debug!(
        width,
        height,
        fuzz = options.fuzz,
        background = segmentation.background_count(),
        "mask generated"
    );

    Ok(mask)
}

/// Trait providing background mask generation
pub trait GenerateMask {
    /// Generates a mask with the default options
    fn generate_mask(&self) -> Result<Image<Rgba<u8>>, MaskError>;

    /// Generates a mask with the given options
    fn generate_mask_with(&self, options: &MaskOptions) -> Result<Image<Rgba<u8>>, MaskError>;
}

impl GenerateMask for Image<Rgba<u8>> {
    fn generate_mask(&self) -> Result<Image<Rgba<u8>>, MaskError> {
        generate_mask(self)
    }

    fn generate_mask_with(&self, options: &MaskOptions) -> Result<Image<Rgba<u8>>, MaskError> {
        generate_mask_with(self, options)
    }
}
