use common_types::ImageAssetError;
use fast_image_resize::{ImageBufferError, ResizeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("target ratio must be a positive finite number, got {0}")]
    InvalidRatio(f64),

    #[error("padded side of {side}px exceeds the {max}px limit")]
    TooLarge { side: u32, max: u32 },

    /// The image handed to `denormalize` is not the frame the transform was made for.
    #[error(
        "transform expects a {expected_width}x{expected_height} frame, got {actual_width}x{actual_height}"
    )]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("resize failed: {0}")]
    Resize(#[from] ResizeError),

    #[error("invalid pixel buffer: {0}")]
    Buffer(#[from] ImageBufferError),

    #[error(transparent)]
    Asset(#[from] ImageAssetError),
}
