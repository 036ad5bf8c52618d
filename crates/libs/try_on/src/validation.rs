use crate::vision::{CropBox, VisionJudge};
use common_types::ImageAsset;
use image::imageops;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

const DEFAULT_REJECT_REASON: &str =
    "Please upload a front-facing, full-body photo of exactly one person.";

#[derive(Debug, Error)]
pub enum ValidationError {
    /// The bytes are not a decodable image. Raised before any external call.
    #[error("malformed image: {0}")]
    MalformedImage(String),

    /// The vision capability could not give an answer at all.
    #[error("validation indeterminate: {0}")]
    Indeterminate(String),
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub accepted: bool,
    /// Human-readable reason, always present when `accepted` is false.
    pub reason: Option<String>,
    /// The photo to continue with, only on acceptance. Cropped when the judge
    /// suggested a usable crop.
    pub normalized_image: Option<ImageAsset>,
    pub cropped: bool,
}

/// Checks user photos before they are sent to synthesis.
#[derive(Clone)]
pub struct ValidationGate {
    judge: Arc<dyn VisionJudge>,
    timeout: Duration,
}

impl ValidationGate {
    #[must_use]
    pub fn new(judge: Arc<dyn VisionJudge>, timeout: Duration) -> Self {
        Self { judge, timeout }
    }

    /// Decode raw upload bytes, then validate.
    pub async fn validate_upload(&self, bytes: &[u8]) -> Result<ValidationResult, ValidationError> {
        let photo =
            ImageAsset::decode(bytes).map_err(|e| ValidationError::MalformedImage(e.to_string()))?;
        self.validate(&photo).await
    }

    #[instrument(skip_all, fields(width = photo.width(), height = photo.height()))]
    pub async fn validate(&self, photo: &ImageAsset) -> Result<ValidationResult, ValidationError> {
        let judgement = match tokio::time::timeout(self.timeout, self.judge.judge(photo)).await {
            Ok(Ok(judgement)) => judgement,
            Ok(Err(e)) => return Err(ValidationError::Indeterminate(e.to_string())),
            Err(_) => {
                return Err(ValidationError::Indeterminate(format!(
                    "vision service did not answer within {:?}",
                    self.timeout
                )));
            }
        };

        if !judgement.accepted {
            let reason = judgement
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECT_REASON.to_owned());
            info!("Photo rejected: {reason}");
            return Ok(ValidationResult {
                accepted: false,
                reason: Some(reason),
                normalized_image: None,
                cropped: false,
            });
        }

        let (photo, cropped) = match judgement.suggested_crop {
            Some(crop) => match apply_crop(photo, &crop) {
                Some(cropped) => (cropped, true),
                None => {
                    warn!("Ignoring unusable crop suggestion {crop:?}, keeping full photo");
                    (photo.clone(), false)
                }
            },
            None => (photo.clone(), false),
        };

        Ok(ValidationResult {
            accepted: true,
            reason: judgement.reason,
            normalized_image: Some(photo),
            cropped,
        })
    }
}

fn apply_crop(photo: &ImageAsset, crop: &CropBox) -> Option<ImageAsset> {
    let (x, y, width, height) = crop.to_pixels(photo.width(), photo.height())?;
    if (x, y, width, height) == (0, 0, photo.width(), photo.height()) {
        return Some(photo.clone());
    }
    let pixels = imageops::crop_imm(photo.pixels(), x, y, width, height).to_image();
    ImageAsset::from_rgb(pixels, photo.format()).ok()
}
