//! Separable sliding-window box blur used to feather alpha masks.
//!
//! Each pass keeps running sums per row (then per column) and updates them by
//! adding the sample entering the window and subtracting the one leaving it,
//! so the cost per pass does not depend on the radius. Repeating the pass
//! approximates a Gaussian blur.

use image::imageops;
use image::Rgba;

use crate::error::MaskError;
use crate::utils::{pixel_count, round_to_u8, validate_non_empty_image, RGBA_CHANNELS};
use crate::Image;

/// Curve applied to the normalised blurred alpha (0 to 1) before it is scaled
/// back to a byte
pub type EaseAlpha = fn(f64) -> f64;

/// Rectangle of an image the blur is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn covers(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }

    fn validate(&self, width: u32, height: u32) -> Result<(), MaskError> {
        let fits_x = self.x.checked_add(self.width).is_some_and(|right| right <= width);
        let fits_y = self.y.checked_add(self.height).is_some_and(|bottom| bottom <= height);
        if self.width == 0 || self.height == 0 || !fits_x || !fits_y {
            return Err(MaskError::RegionOutOfBounds {
                region: (self.x, self.y, self.width, self.height),
                width,
                height,
            });
        }
        Ok(())
    }
}

/// Options for [`box_blur`]
///
/// Defaults: one iteration over the whole image, no mask mode and a linear
/// alpha curve.
#[derive(Debug, Clone, Copy)]
pub struct BoxBlurOptions {
    /// Number of horizontal + vertical pass pairs
    pub iterations: u32,
    /// Part of the image to blur, `None` for the whole image
    pub region: Option<Region>,
    /// Keep pixels whose alpha was 0 before the pass fully transparent
    pub mask_mode: bool,
    /// Optional curve for the blurred alpha
    pub ease_alpha: Option<EaseAlpha>,
}

impl Default for BoxBlurOptions {
    fn default() -> Self {
        Self {
            iterations: 1,
            region: None,
            mask_mode: false,
            ease_alpha: None,
        }
    }
}

impl BoxBlurOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    #[inline]
    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    #[inline]
    pub fn mask_mode(mut self, enabled: bool) -> Self {
        self.mask_mode = enabled;
        self
    }

    #[inline]
    pub fn ease_alpha(mut self, ease: EaseAlpha) -> Self {
        self.ease_alpha = Some(ease);
        self
    }
}

/// Blurs an RGBA image in place with a box of `2 * radius + 1` pixels
///
/// A radius of 0 leaves the image untouched. Colors are accumulated
/// premultiplied by alpha, so fully transparent neighbours do not bleed into
/// opaque edges. Window averages are divided by `(2 * radius)^2` and clamped
/// to the byte range.
///
/// # Errors
///
/// * `MaskError::EmptyImage` - When the image has no pixels
/// * `MaskError::RegionOutOfBounds` - When the region does not fit the image
///
/// # Examples
///
/// ```
/// use backdrop_mask::{box_blur, BoxBlurOptions, Image};
/// use image::Rgba;
///
/// let mut image: Image<Rgba<u8>> = Image::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
/// image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
///
/// box_blur(&mut image, 1, &BoxBlurOptions::default()).unwrap();
/// assert!(image.get_pixel(0, 0)[3] > 0);
/// ```
pub fn box_blur(
    image: &mut Image<Rgba<u8>>,
    radius: u32,
    options: &BoxBlurOptions,
) -> Result<(), MaskError> {
    if radius < 1 {
        return Ok(());
    }

    let (width, height) = image.dimensions();
    validate_non_empty_image(width, height)?;

    match options.region {
        Some(region) if !region.covers(width, height) => {
            region.validate(width, height)?;
            let mut view =
                imageops::crop_imm(&*image, region.x, region.y, region.width, region.height)
                    .to_image();
            blur_pixels(&mut view, region.width, region.height, radius, options);
            imageops::replace(image, &view, i64::from(region.x), i64::from(region.y));
        }
        _ => blur_pixels(&mut **image, width, height, radius, options),
    }

    Ok(())
}

/// Trait providing in-place box blur feathering
pub trait BoxBlur {
    /// Blurs the image in place, see [`box_blur`]
    fn box_blur_mut(&mut self, radius: u32, options: &BoxBlurOptions)
        -> Result<&mut Self, MaskError>;

    /// Blurs the image and returns it
    fn box_blurred(mut self, radius: u32, options: &BoxBlurOptions) -> Result<Self, MaskError>
    where
        Self: Sized,
    {
        self.box_blur_mut(radius, options)?;
        Ok(self)
    }
}

impl BoxBlur for Image<Rgba<u8>> {
    fn box_blur_mut(
        &mut self,
        radius: u32,
        options: &BoxBlurOptions,
    ) -> Result<&mut Self, MaskError> {
        box_blur(self, radius, options)?;
        Ok(self)
    }
}

type Sample = [f64; RGBA_CHANNELS];

/// Column or row accumulated premultiplied sums, one entry per pixel
struct RunningSums {
    channels: [Vec<f64>; RGBA_CHANNELS],
}

impl RunningSums {
    fn new(len: usize) -> Self {
        Self {
            channels: std::array::from_fn(|_| vec![0.0; len]),
        }
    }

    #[inline]
    fn get(&self, index: usize) -> Sample {
        std::array::from_fn(|c| self.channels[c][index])
    }

    #[inline]
    fn set(&mut self, index: usize, sample: Sample) {
        for (channel, value) in self.channels.iter_mut().zip(sample) {
            channel[index] = value;
        }
    }
}

#[inline]
fn premultiplied(pixels: &[u8], pixel: usize) -> Sample {
    let offset = pixel * RGBA_CHANNELS;
    let alpha = f64::from(pixels[offset + 3]);
    [
        alpha * f64::from(pixels[offset]) / 255.0,
        alpha * f64::from(pixels[offset + 1]) / 255.0,
        alpha * f64::from(pixels[offset + 2]) / 255.0,
        alpha,
    ]
}

#[inline]
fn slide(sum: &mut Sample, entering: Sample, leaving: Sample) {
    for c in 0..RGBA_CHANNELS {
        sum[c] += entering[c] - leaving[c];
    }
}

#[inline]
fn accumulate(sum: &mut Sample, sample: Sample) {
    for (total, value) in sum.iter_mut().zip(sample) {
        *total += value;
    }
}

#[inline]
fn scaled(sample: Sample, factor: f64) -> Sample {
    sample.map(|value| value * factor)
}

/// Sum of the window centred on index 0, with indices past `last` clamped
fn initial_window(sample: impl Fn(usize) -> Sample, radius: usize, last: usize) -> Sample {
    let inside = radius.min(last);
    let mut sum = scaled(sample(0), (radius + 1) as f64);
    for i in 1..=inside {
        accumulate(&mut sum, sample(i));
    }
    if radius > inside {
        accumulate(&mut sum, scaled(sample(last), (radius - inside) as f64));
    }
    sum
}

fn blur_pixels(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    radius: u32,
    options: &BoxBlurOptions,
) {
    let mut sums = RunningSums::new(pixel_count(width, height));
    let width = width as usize;
    let height = height as usize;
    let radius = radius as usize;

    for _ in 0..options.iterations {
        horizontal_pass(pixels, width, height, radius, &mut sums);
        vertical_pass(pixels, width, height, radius, &sums, options);
    }

    tracing::debug!(
        width,
        height,
        radius,
        iterations = options.iterations,
        "box blur finished"
    );
}

fn horizontal_pass(
    pixels: &[u8],
    width: usize,
    height: usize,
    radius: usize,
    sums: &mut RunningSums,
) {
    let last_column = width - 1;

    for y in 0..height {
        let row = y * width;

        // Window [-radius, radius] around column 0, clamped to the row
        let mut sum = initial_window(|i| premultiplied(pixels, row + i), radius, last_column);

        for x in 0..width {
            sums.set(row + x, sum);
            let entering = row + (x + radius + 1).min(last_column);
            let leaving = row + x.saturating_sub(radius);
            slide(
                &mut sum,
                premultiplied(pixels, entering),
                premultiplied(pixels, leaving),
            );
        }
    }
}

fn vertical_pass(
    pixels: &mut [u8],
    width: usize,
    height: usize,
    radius: usize,
    sums: &RunningSums,
    options: &BoxBlurOptions,
) {
    let last_row = height - 1;
    let diameter = 2.0 * radius as f64;
    let area = diameter * diameter;

    for x in 0..width {
        let mut sum = initial_window(|i| sums.get(i * width + x), radius, last_row);

        for y in 0..height {
            let offset = (y * width + x) * RGBA_CHANNELS;
            store_average(&mut pixels[offset..offset + RGBA_CHANNELS], sum, area, options);

            let entering = (y + radius + 1).min(last_row) * width + x;
            let leaving = y.saturating_sub(radius) * width + x;
            slide(&mut sum, sums.get(entering), sums.get(leaving));
        }
    }
}

/// Writes one blurred pixel back, undoing the premultiplication.
fn store_average(pixel: &mut [u8], sum: Sample, area: f64, options: &BoxBlurOptions) {
    if options.mask_mode && pixel[3] == 0 {
        pixel[..3].fill(0);
        return;
    }

    let coverage = sum[3] / area / 255.0;
    let eased = options.ease_alpha.map_or(coverage, |ease| ease(coverage));
    // Unclamped so colors are divided by the same alpha they were summed with
    let alpha = (eased * 255.0).round();
    pixel[3] = round_to_u8(alpha);

    if alpha > 0.0 {
        let unpremultiply = 255.0 / alpha;
        for c in 0..3 {
            pixel[c] = round_to_u8(sum[c] / area * unpremultiply);
        }
    } else {
        pixel[..3].fill(0);
    }
}
