//! Decoding source assets and encoding masks.
//!
//! Masks are stored as PNG files named after their source image with a
//! `--mask.png` suffix, next to the source.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba};

use crate::error::CodecError;
use crate::utils::validate_non_empty_image;
use crate::Image;

/// Suffix appended to the source file stem to name its mask
pub const MASK_SUFFIX: &str = "--mask.png";

/// Path of the mask that belongs to `source`
///
/// # Examples
///
/// ```
/// use backdrop_mask::mask_path_for;
/// use std::path::Path;
///
/// assert_eq!(
///     mask_path_for("processed/img/intro.gif"),
///     Path::new("processed/img/intro--mask.png")
/// );
/// ```
pub fn mask_path_for(source: impl AsRef<Path>) -> PathBuf {
    let source = source.as_ref();
    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}{MASK_SUFFIX}"))
}

/// Decodes a raster asset into an RGBA pixel buffer
///
/// Animated GIFs yield their first frame.
///
/// # Errors
///
/// * `CodecError::Image` - When the bytes are not a supported image
/// * `CodecError::Mask` - When the decoded image is empty
pub fn decode_source(bytes: &[u8]) -> Result<Image<Rgba<u8>>, CodecError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    validate_non_empty_image(image.width(), image.height())?;
    Ok(image)
}

/// Encodes a mask as PNG bytes
///
/// # Errors
///
/// * `CodecError::Image` - When encoding fails
pub fn encode_mask_png(mask: &Image<Rgba<u8>>) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    mask.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Writes a mask as PNG next to `source` and returns the path written
///
/// # Errors
///
/// * `CodecError::Image` - When encoding or writing fails
pub fn write_mask(
    source: impl AsRef<Path>,
    mask: &Image<Rgba<u8>>,
) -> Result<PathBuf, CodecError> {
    let path = mask_path_for(source);
    mask.save_with_format(&path, ImageFormat::Png)?;
    tracing::debug!(path = %path.display(), "mask written");
    Ok(path)
}
