mod backdrop_mask;
mod error;
mod utils;

#[cfg(test)]
mod test_utils;

use image::{ImageBuffer, Pixel};

pub use backdrop_mask::apply_mask::ApplyMask;
pub use backdrop_mask::batch::{BatchReport, MaskBatch, MaskContext};
pub use backdrop_mask::box_blur::{box_blur, BoxBlur, BoxBlurOptions, EaseAlpha, Region};
pub use backdrop_mask::codec::{
    decode_source, encode_mask_png, mask_path_for, write_mask, MASK_SUFFIX,
};
pub use backdrop_mask::color_distance::{color_distance, rgb_to_lab, Lab};
pub use backdrop_mask::flood_fill::{
    corner_seeds, segment, FloodFill, SegmentationMask, DEFAULT_FILL_FUZZ,
};
pub use backdrop_mask::pipeline::{
    generate_mask, generate_mask_with, quartic_ease, GenerateMask, MaskOptions,
    DEFAULT_BLUR_RADIUS, DEFAULT_MASK_FUZZ,
};
pub use backdrop_mask::rasterize::{rasterize, CUT_PIXEL, KEPT_PIXEL};
pub use error::{CodecError, MaskError};
pub use utils::pixel_buffer_from_raw;

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
