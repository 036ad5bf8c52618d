use crate::{NormalizeError, PaddingTransform};
use common_types::ImageAsset;
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use image::RgbImage;
use tracing::debug;

/// Resize an RGB buffer to exactly `width` x `height`.
pub fn resize_rgb(src: &RgbImage, width: u32, height: u32) -> Result<RgbImage, NormalizeError> {
    if width == 0 || height == 0 {
        return Err(NormalizeError::InvalidDimensions { width, height });
    }
    if src.dimensions() == (width, height) {
        return Ok(src.clone());
    }

    let (src_w, src_h) = src.dimensions();
    let src_image = Image::from_vec_u8(src_w, src_h, src.as_raw().clone(), PixelType::U8x3)?;
    let mut dst_image = Image::new(width, height, PixelType::U8x3);
    Resizer::new().resize(&src_image, &mut dst_image, None)?;

    RgbImage::from_raw(width, height, dst_image.into_vec())
        .ok_or(NormalizeError::InvalidDimensions { width, height })
}

/// Bring a synthesized frame back to the exact padded size `transform` expects.
///
/// Synthesis services often answer at their own resolution. That is fine as long as
/// the frame kept the padded aspect ratio; anything else cannot be cropped back
/// reliably and is a `DimensionMismatch`.
pub fn fit_to_padded(
    image: &ImageAsset,
    transform: &PaddingTransform,
    tolerance: f64,
) -> Result<ImageAsset, NormalizeError> {
    let (padded_width, padded_height) = transform.padded_dimensions();
    let (width, height) = image.dimensions();
    if (width, height) == (padded_width, padded_height) {
        return Ok(image.clone());
    }

    let expected_ratio = f64::from(padded_width) / f64::from(padded_height);
    if ((image.aspect_ratio() - expected_ratio) / expected_ratio).abs() > tolerance {
        return Err(NormalizeError::DimensionMismatch {
            expected_width: padded_width,
            expected_height: padded_height,
            actual_width: width,
            actual_height: height,
        });
    }

    debug!("Resampling synthesized {width}x{height} frame to {padded_width}x{padded_height}");
    let resized = resize_rgb(image.pixels(), padded_width, padded_height)?;
    Ok(ImageAsset::from_rgb(resized, image.format())?)
}
