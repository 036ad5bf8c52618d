use aspect_normalizer::NormalizeError;
use common_types::ImageAssetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TryOnError {
    #[error("malformed image: {0}")]
    MalformedImage(String),

    /// Shown to the user verbatim so they know what to reupload.
    #[error("{0}")]
    ValidationRejected(String),

    #[error("photo could not be validated: {0}")]
    ValidationIndeterminate(String),

    #[error("synthesized frame does not match its padding transform: {0}")]
    DimensionMismatch(String),

    #[error("unsupported garment category '{0}'")]
    UnsupportedCategory(String),

    #[error("synthesis service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    #[error("could not encode result: {0}")]
    Encode(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<NormalizeError> for TryOnError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::DimensionMismatch { .. } => Self::DimensionMismatch(err.to_string()),
            NormalizeError::InvalidDimensions { .. } | NormalizeError::TooLarge { .. } => {
                Self::MalformedImage(err.to_string())
            }
            NormalizeError::Asset(ImageAssetError::Encode(e)) => Self::Encode(e.to_string()),
            NormalizeError::Asset(e) => Self::MalformedImage(e.to_string()),
            NormalizeError::InvalidRatio(_)
            | NormalizeError::Resize(_)
            | NormalizeError::Buffer(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ImageAssetError> for TryOnError {
    fn from(err: ImageAssetError) -> Self {
        match err {
            ImageAssetError::Encode(e) => Self::Encode(e.to_string()),
            ImageAssetError::Decode(_) | ImageAssetError::Empty { .. } => {
                Self::MalformedImage(err.to_string())
            }
        }
    }
}
