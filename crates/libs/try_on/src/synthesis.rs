use crate::region::RegionHint;
use async_trait::async_trait;
use common_types::{GarmentCategory, ImageAsset, ImageAssetError};
use std::time::Duration;
use thiserror::Error;

/// Everything a synthesis service needs for one garment on one person.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Person photo, already padded to the target ratio.
    pub person: ImageAsset,
    pub garment: ImageAsset,
    pub category: GarmentCategory,
    pub region: RegionHint,
    /// Short garment description, the catalog name works well.
    pub description: String,
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("synthesis service answered {status}: {body}")]
    Api { status: u16, body: String },

    #[error("synthesis did not finish within {0:?}")]
    Timeout(Duration),

    #[error("synthesis output unusable: {0}")]
    MalformedOutput(String),

    #[error("synthesis failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Image(#[from] ImageAssetError),
}

impl SynthesisError {
    /// Worth one more attempt: the service might answer next time.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedOutput(_) | Self::Failed(_) | Self::Image(_) => false,
        }
    }
}

impl From<reqwest::Error> for SynthesisError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Api {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None if err.is_decode() => Self::MalformedOutput(err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

#[async_trait]
pub trait GarmentSynthesizer: Send + Sync {
    /// Dress the person in `request.garment`. The returned frame should keep the
    /// aspect ratio of `request.person`.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<ImageAsset, SynthesisError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_only_transient_failures() {
        assert!(SynthesisError::Transport("reset".into()).is_retryable());
        assert!(SynthesisError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(
            SynthesisError::Api {
                status: 503,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            SynthesisError::Api {
                status: 429,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !SynthesisError::Api {
                status: 422,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!SynthesisError::Failed("nsfw".into()).is_retryable());
        assert!(!SynthesisError::MalformedOutput("empty".into()).is_retryable());
    }
}
