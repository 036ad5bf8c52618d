use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageAssetError {
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("image could not be encoded: {0}")]
    Encode(#[from] image::ImageError),
}

/// A decoded RGB image together with the format it was read from or will be written as.
///
/// An asset always has non-zero dimensions; both constructors enforce this.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pixels: RgbImage,
    format: ImageFormat,
}

impl ImageAsset {
    /// Decode an encoded image (JPEG, PNG or WebP). Alpha is dropped.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageAssetError> {
        let format =
            image::guess_format(bytes).map_err(|e| ImageAssetError::Decode(e.to_string()))?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ImageAssetError::Decode(e.to_string()))?;
        Self::from_rgb(decoded.into_rgb8(), format)
    }

    pub fn from_rgb(pixels: RgbImage, format: ImageFormat) -> Result<Self, ImageAssetError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageAssetError::Empty { width, height });
        }
        Ok(Self { pixels, format })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Width divided by height.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width()) / f64::from(self.height())
    }

    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    #[must_use]
    pub const fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    #[must_use]
    pub fn into_pixels(self) -> RgbImage {
        self.pixels
    }

    #[must_use]
    pub fn with_format(self, format: ImageFormat) -> Self {
        Self {
            pixels: self.pixels,
            format,
        }
    }

    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, ImageAssetError> {
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
            .encode_image(&self.pixels)?;
        Ok(buffer)
    }
}

impl fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAsset")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rejects_garbage_bytes() {
        let result = ImageAsset::decode(b"definitely not an image");
        assert!(matches!(result, Err(ImageAssetError::Decode(_))));
    }

    #[test]
    fn rejects_empty_buffer() {
        let result = ImageAsset::from_rgb(RgbImage::new(0, 10), ImageFormat::Png);
        assert!(matches!(
            result,
            Err(ImageAssetError::Empty {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn jpeg_encoding_decodes_back_to_same_size() -> Result<(), ImageAssetError> {
        let pixels = RgbImage::from_pixel(30, 40, Rgb([200, 10, 10]));
        let asset = ImageAsset::from_rgb(pixels, ImageFormat::Png)?;
        let bytes = asset.encode_jpeg(90)?;

        let decoded = ImageAsset::decode(&bytes)?;
        assert_eq!(decoded.dimensions(), (30, 40));
        assert_eq!(decoded.format(), ImageFormat::Jpeg);
        Ok(())
    }
}
