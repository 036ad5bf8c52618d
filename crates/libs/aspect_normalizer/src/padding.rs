use crate::NormalizeError;
use common_types::ImageAsset;
use image::{Rgb, RgbImage, imageops};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Neutral mid-gray; blends into the seam with the fewest synthesis artifacts.
pub const DEFAULT_FILL: Rgb<u8> = Rgb([128, 128, 128]);

/// Relative ratio difference below which no padding is applied (0.5%).
pub const DEFAULT_TOLERANCE: f64 = 0.005;

/// Largest side a padded frame may have.
pub const MAX_SIDE: u32 = 16_384;

/// Where the original image sits inside its padded frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaddingTransform {
    pub target_ratio: f64,
    pub original_width: u32,
    pub original_height: u32,
    pub pad_left: u32,
    pub pad_top: u32,
    pub pad_right: u32,
    pub pad_bottom: u32,
}

impl PaddingTransform {
    #[must_use]
    pub const fn identity(width: u32, height: u32, target_ratio: f64) -> Self {
        Self {
            target_ratio,
            original_width: width,
            original_height: height,
            pad_left: 0,
            pad_top: 0,
            pad_right: 0,
            pad_bottom: 0,
        }
    }

    #[must_use]
    pub const fn padded_width(&self) -> u32 {
        self.original_width + self.pad_left + self.pad_right
    }

    #[must_use]
    pub const fn padded_height(&self) -> u32 {
        self.original_height + self.pad_top + self.pad_bottom
    }

    #[must_use]
    pub const fn padded_dimensions(&self) -> (u32, u32) {
        (self.padded_width(), self.padded_height())
    }

    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.pad_left == 0 && self.pad_top == 0 && self.pad_right == 0 && self.pad_bottom == 0
    }

    /// Work out the padding for a `width` x `height` image without touching pixels.
    pub fn plan(
        width: u32,
        height: u32,
        target_ratio: f64,
        tolerance: f64,
    ) -> Result<Self, NormalizeError> {
        if width == 0 || height == 0 {
            return Err(NormalizeError::InvalidDimensions { width, height });
        }
        if !target_ratio.is_finite() || target_ratio <= 0.0 {
            return Err(NormalizeError::InvalidRatio(target_ratio));
        }

        let current = f64::from(width) / f64::from(height);
        if ((current - target_ratio) / target_ratio).abs() <= tolerance {
            return Ok(Self::identity(width, height, target_ratio));
        }

        let mut transform = Self::identity(width, height, target_ratio);
        if current < target_ratio {
            let ideal = (f64::from(height) * target_ratio).round();
            let padded_width = clamp_side(ideal, width)?;
            let total = padded_width - width;
            transform.pad_left = total / 2;
            transform.pad_right = total - transform.pad_left;
        } else {
            let ideal = (f64::from(width) / target_ratio).round();
            let padded_height = clamp_side(ideal, height)?;
            let total = padded_height - height;
            transform.pad_top = total / 2;
            transform.pad_bottom = total - transform.pad_top;
        }
        Ok(transform)
    }
}

fn clamp_side(ideal: f64, source: u32) -> Result<u32, NormalizeError> {
    if ideal > f64::from(MAX_SIDE) {
        return Err(NormalizeError::TooLarge {
            side: ideal as u32,
            max: MAX_SIDE,
        });
    }
    Ok((ideal as u32).max(source))
}

/// Pads images to a fixed aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct AspectNormalizer {
    target_ratio: f64,
    tolerance: f64,
    fill: Rgb<u8>,
}

impl AspectNormalizer {
    pub fn new(target_ratio: f64) -> Result<Self, NormalizeError> {
        if !target_ratio.is_finite() || target_ratio <= 0.0 {
            return Err(NormalizeError::InvalidRatio(target_ratio));
        }
        Ok(Self {
            target_ratio,
            tolerance: DEFAULT_TOLERANCE,
            fill: DEFAULT_FILL,
        })
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_fill(mut self, fill: Rgb<u8>) -> Self {
        self.fill = fill;
        self
    }

    #[must_use]
    pub const fn target_ratio(&self) -> f64 {
        self.target_ratio
    }

    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn normalize(
        &self,
        image: &ImageAsset,
    ) -> Result<(ImageAsset, PaddingTransform), NormalizeError> {
        let (width, height) = image.dimensions();
        let transform = PaddingTransform::plan(width, height, self.target_ratio, self.tolerance)?;
        if transform.is_identity() {
            return Ok((image.clone(), transform));
        }

        let (padded_width, padded_height) = transform.padded_dimensions();
        let mut canvas = RgbImage::from_pixel(padded_width, padded_height, self.fill);
        imageops::replace(
            &mut canvas,
            image.pixels(),
            i64::from(transform.pad_left),
            i64::from(transform.pad_top),
        );
        debug!(
            "Padded {width}x{height} to {padded_width}x{padded_height} (ratio {:.4})",
            self.target_ratio
        );

        let padded = ImageAsset::from_rgb(canvas, image.format())?;
        Ok((padded, transform))
    }
}

/// Pad `image` to `target_ratio` with the default tolerance and fill.
pub fn normalize(
    image: &ImageAsset,
    target_ratio: f64,
) -> Result<(ImageAsset, PaddingTransform), NormalizeError> {
    AspectNormalizer::new(target_ratio)?.normalize(image)
}

/// Crop the padding recorded in `transform` off `image`.
///
/// `image` must be exactly the padded frame the transform describes.
pub fn denormalize(
    image: &ImageAsset,
    transform: &PaddingTransform,
) -> Result<ImageAsset, NormalizeError> {
    let (expected_width, expected_height) = transform.padded_dimensions();
    let (actual_width, actual_height) = image.dimensions();
    if (expected_width, expected_height) != (actual_width, actual_height) {
        return Err(NormalizeError::DimensionMismatch {
            expected_width,
            expected_height,
            actual_width,
            actual_height,
        });
    }
    if transform.is_identity() {
        return Ok(image.clone());
    }

    let cropped = imageops::crop_imm(
        image.pixels(),
        transform.pad_left,
        transform.pad_top,
        transform.original_width,
        transform.original_height,
    )
    .to_image();
    Ok(ImageAsset::from_rgb(cropped, image.format())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageFormat;

    /// Position-dependent colors, so an off-by-one crop shows up.
    fn gradient(width: u32, height: u32) -> ImageAsset {
        let pixels = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 251) as u8, (y % 241) as u8, ((x * 7 + y * 13) % 256) as u8])
        });
        ImageAsset::from_rgb(pixels, ImageFormat::Jpeg).expect("non-empty test image")
    }

    #[test]
    fn portrait_two_by_three_pads_width_only() -> Result<(), NormalizeError> {
        let image = gradient(800, 1200);
        let (padded, transform) = normalize(&image, 0.75)?;

        assert_eq!(padded.dimensions(), (900, 1200));
        assert_eq!(transform.pad_left, 50);
        assert_eq!(transform.pad_right, 50);
        assert_eq!(transform.pad_top, 0);
        assert_eq!(transform.pad_bottom, 0);
        assert_eq!(*padded.pixels().get_pixel(0, 0), DEFAULT_FILL);
        assert_eq!(*padded.pixels().get_pixel(899, 600), DEFAULT_FILL);

        let restored = denormalize(&padded, &transform)?;
        assert_eq!(restored.dimensions(), (800, 1200));
        assert_eq!(restored, image);
        Ok(())
    }

    #[test]
    fn wide_image_pads_height() -> Result<(), NormalizeError> {
        let image = gradient(800, 600);
        let (padded, transform) = normalize(&image, 0.75)?;

        // 800 / 0.75 = 1066.67 -> 1067, 467 rows of padding.
        assert_eq!(padded.dimensions(), (800, 1067));
        assert_eq!(transform.pad_top, 233);
        assert_eq!(transform.pad_bottom, 234);
        assert_eq!(denormalize(&padded, &transform)?, image);
        Ok(())
    }

    #[test]
    fn odd_remainder_goes_right() -> Result<(), NormalizeError> {
        // 1000 * 0.75 = 750, so 749 columns of padding around a 1px wide strip.
        let transform = PaddingTransform::plan(1, 1000, 0.75, DEFAULT_TOLERANCE)?;
        assert_eq!(transform.pad_left, 374);
        assert_eq!(transform.pad_right, 375);
        Ok(())
    }

    #[test]
    fn round_trips_many_shapes() -> Result<(), NormalizeError> {
        let shapes = [(1, 1), (3, 7), (17, 5), (640, 480), (479, 641), (1000, 999)];
        for ratio in [0.75, 1.0, 16.0 / 9.0, 0.5625] {
            for (width, height) in shapes {
                let image = gradient(width, height);
                let (padded, transform) = normalize(&image, ratio)?;
                assert_eq!(padded.dimensions(), transform.padded_dimensions());
                assert_eq!(denormalize(&padded, &transform)?, image, "{width}x{height} @ {ratio}");
            }
        }
        Ok(())
    }

    #[test]
    fn matching_ratio_is_noop() -> Result<(), NormalizeError> {
        // 0.7519 is within 0.5% of 0.75.
        let image = gradient(600, 798);
        let (padded, transform) = normalize(&image, 0.75)?;
        assert!(transform.is_identity());
        assert_eq!(padded, image);
        assert_eq!(denormalize(&padded, &transform)?, image);
        Ok(())
    }

    #[test]
    fn mismatched_frame_is_rejected() -> Result<(), NormalizeError> {
        let (_, transform) = normalize(&gradient(800, 1200), 0.75)?;
        let wrong = gradient(768, 1024);
        let result = denormalize(&wrong, &transform);
        assert!(matches!(
            result,
            Err(NormalizeError::DimensionMismatch {
                expected_width: 900,
                expected_height: 1200,
                actual_width: 768,
                actual_height: 1024,
            })
        ));
        Ok(())
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            PaddingTransform::plan(0, 10, 0.75, DEFAULT_TOLERANCE),
            Err(NormalizeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            AspectNormalizer::new(f64::NAN),
            Err(NormalizeError::InvalidRatio(_))
        ));
        assert!(matches!(
            AspectNormalizer::new(-1.0),
            Err(NormalizeError::InvalidRatio(_))
        ));
        assert!(matches!(
            PaddingTransform::plan(1, 100_000, 1.0, DEFAULT_TOLERANCE),
            Err(NormalizeError::TooLarge { .. })
        ));
    }
}
