use crate::api::avatar::error::AvatarError;
use crate::api::upload::UploadedForm;
use app_state::ValidationPolicy;
use common_types::ImageAsset;
use try_on::{ValidationError, ValidationGate};
use tracing::warn;

/// Validate an uploaded avatar and return the (possibly cropped) photo as JPEG.
///
/// When the vision service cannot answer, `policy` decides: fail-open hands the
/// photo back unchanged, fail-closed refuses it.
pub async fn validate_avatar(
    gate: &ValidationGate,
    policy: ValidationPolicy,
    form: UploadedForm,
    jpeg_quality: u8,
) -> Result<Vec<u8>, AvatarError> {
    let bytes = form.photo.ok_or(AvatarError::MissingPhoto)?;
    let photo =
        ImageAsset::decode(&bytes).map_err(|e| AvatarError::MalformedImage(e.to_string()))?;

    let accepted = match gate.validate(&photo).await {
        Ok(result) if result.accepted => result.normalized_image.unwrap_or(photo),
        Ok(result) => {
            return Err(AvatarError::Rejected(result.reason.unwrap_or_default()));
        }
        Err(ValidationError::MalformedImage(e)) => return Err(AvatarError::MalformedImage(e)),
        Err(ValidationError::Indeterminate(e)) => match policy {
            ValidationPolicy::FailOpen => {
                warn!("Validation indeterminate ({e}), accepting avatar unchecked");
                photo
            }
            ValidationPolicy::FailClosed => return Err(AvatarError::Indeterminate(e)),
        },
    };

    accepted
        .encode_jpeg(jpeg_quality)
        .map_err(|e| AvatarError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;
    use try_on::mock::MockVisionJudge;

    fn form_with_png() -> UploadedForm {
        let mut png = Vec::new();
        RgbImage::from_pixel(30, 60, Rgb([90, 90, 90]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .expect("encode");
        UploadedForm {
            photo: Some(png),
            ..UploadedForm::default()
        }
    }

    fn gate(judge: MockVisionJudge) -> ValidationGate {
        ValidationGate::new(Arc::new(judge), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn accepted_avatar_comes_back_as_jpeg() {
        let jpeg = validate_avatar(
            &gate(MockVisionJudge::accepting()),
            ValidationPolicy::FailOpen,
            form_with_png(),
            90,
        )
        .await
        .expect("accepted");
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));
    }

    #[tokio::test]
    async fn rejection_carries_reason() {
        let result = validate_avatar(
            &gate(MockVisionJudge::rejecting(Some("Please step back."))),
            ValidationPolicy::FailOpen,
            form_with_png(),
            90,
        )
        .await;
        assert!(matches!(result, Err(AvatarError::Rejected(r)) if r == "Please step back."));
    }

    #[tokio::test]
    async fn indeterminate_follows_policy() {
        let open = validate_avatar(
            &gate(MockVisionJudge::failing()),
            ValidationPolicy::FailOpen,
            form_with_png(),
            90,
        )
        .await;
        assert!(open.is_ok());

        let closed = validate_avatar(
            &gate(MockVisionJudge::failing()),
            ValidationPolicy::FailClosed,
            form_with_png(),
            90,
        )
        .await;
        assert!(matches!(closed, Err(AvatarError::Indeterminate(_))));
    }

    #[tokio::test]
    async fn garbage_upload_is_malformed() {
        let judge = Arc::new(MockVisionJudge::accepting());
        let gate = ValidationGate::new(judge.clone(), Duration::from_secs(5));
        let form = UploadedForm {
            photo: Some(b"not an image".to_vec()),
            ..UploadedForm::default()
        };
        let result = validate_avatar(&gate, ValidationPolicy::FailOpen, form, 90).await;
        assert!(matches!(result, Err(AvatarError::MalformedImage(_))));
        assert_eq!(judge.calls(), 0);
    }
}
