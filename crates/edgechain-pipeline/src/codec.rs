//! In-memory bridge between encoded image bytes and [`FlatImage`].
//!
//! The filters never see encoded data. This module decodes whatever the
//! `image` crate understands (PNG, JPEG, BMP) into an RGB [`FlatImage`]
//! and encodes a grayscale or RGB [`FlatImage`] back to PNG. No file
//! system access happens here; callers supply and receive byte buffers.

use image::{ExtendedColorType, GrayImage, ImageEncoder, RgbImage};

use crate::flat::FlatImage;
use crate::types::{COMPONENT_GRAYSCALE, COMPONENT_RGB, Dimensions, PipelineError};

/// Decode raw image bytes into a three-component RGB image.
///
/// Alpha is discarded and other color types are converted to RGB.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty,
/// [`PipelineError::ImageDecode`] if the data cannot be decoded.
pub fn decode_rgb(bytes: &[u8]) -> Result<FlatImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let decoded = image::load_from_memory(bytes)?;
    from_rgb_image(&decoded.to_rgb8())
}

/// Copy an [`RgbImage`] into a three-component [`FlatImage`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimensions`] for an empty image.
pub fn from_rgb_image(image: &RgbImage) -> Result<FlatImage, PipelineError> {
    FlatImage::from_raw(
        image_dimensions(image.width(), image.height())?,
        COMPONENT_RGB,
        image.as_raw().clone(),
    )
}

/// Copy a [`GrayImage`] into a single-component [`FlatImage`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimensions`] for an empty image.
pub fn from_gray_image(image: &GrayImage) -> Result<FlatImage, PipelineError> {
    FlatImage::from_raw(
        image_dimensions(image.width(), image.height())?,
        COMPONENT_GRAYSCALE,
        image.as_raw().clone(),
    )
}

/// Copy a single-component [`FlatImage`] into a [`GrayImage`].
///
/// # Errors
///
/// Returns [`PipelineError::UnsupportedComponents`] unless the image has
/// one component, [`PipelineError::InvalidDimensions`] if a side does not
/// fit in `u32`.
pub fn to_gray_image(image: &FlatImage) -> Result<GrayImage, PipelineError> {
    if image.components() != COMPONENT_GRAYSCALE {
        return Err(PipelineError::UnsupportedComponents(image.components()));
    }
    let (width, height) = u32_dimensions(image)?;
    GrayImage::from_raw(width, height, image.data().to_vec()).ok_or(
        PipelineError::BufferLength {
            expected: image.dimensions().pixel_count(),
            actual: image.data().len(),
        },
    )
}

/// Encode a grayscale or RGB [`FlatImage`] as PNG.
///
/// # Errors
///
/// Returns [`PipelineError::UnsupportedComponents`] for component counts
/// other than 1 or 3, [`PipelineError::ImageEncode`] if encoding fails.
pub fn encode_png(image: &FlatImage) -> Result<Vec<u8>, PipelineError> {
    let color = match image.components() {
        COMPONENT_GRAYSCALE => ExtendedColorType::L8,
        COMPONENT_RGB => ExtendedColorType::Rgb8,
        other => return Err(PipelineError::UnsupportedComponents(other)),
    };
    let (width, height) = u32_dimensions(image)?;
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    encoder
        .write_image(image.data(), width, height, color)
        .map_err(|e| PipelineError::ImageEncode(e.to_string()))?;
    Ok(buf)
}

fn image_dimensions(width: u32, height: u32) -> Result<Dimensions, PipelineError> {
    let invalid = |_| PipelineError::InvalidDimensions {
        width: usize::MAX,
        height: usize::MAX,
        components: 0,
    };
    Ok(Dimensions::new(
        usize::try_from(width).map_err(invalid)?,
        usize::try_from(height).map_err(invalid)?,
    ))
}

fn u32_dimensions(image: &FlatImage) -> Result<(u32, u32), PipelineError> {
    let invalid = || PipelineError::InvalidDimensions {
        width: image.width(),
        height: image.height(),
        components: image.components(),
    };
    let width = u32::try_from(image.width()).map_err(|_| invalid())?;
    let height = u32::try_from(image.height()).map_err(|_| invalid())?;
    Ok((width, height))
}
