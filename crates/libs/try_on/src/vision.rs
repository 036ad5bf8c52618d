use async_trait::async_trait;
use common_types::ImageAsset;
use language_model::{LlmClient, LlmError, extract_json_object};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("vision service request failed: {0}")]
    Transport(#[from] LlmError),

    #[error("vision service returned an unusable answer: {0}")]
    Malformed(String),

    #[error("photo could not be encoded for the vision service: {0}")]
    Encode(String),
}

/// A crop suggestion in fractions of the frame (`0.0..=1.0`, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CropBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl CropBox {
    /// Pixel rectangle `(x, y, width, height)` inside a `width` x `height` frame,
    /// or `None` when the box is out of range or degenerate.
    #[must_use]
    pub fn to_pixels(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let in_range = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if ![self.left, self.top, self.right, self.bottom]
            .into_iter()
            .all(in_range)
        {
            return None;
        }
        let x0 = (self.left * width as f32).round() as u32;
        let y0 = (self.top * height as f32).round() as u32;
        let x1 = ((self.right * width as f32).round() as u32).min(width);
        let y1 = ((self.bottom * height as f32).round() as u32).min(height);
        (x1 > x0 && y1 > y0).then(|| (x0, y0, x1 - x0, y1 - y0))
    }
}

/// Verdict of the external vision capability on a user photo.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionJudgement {
    pub accepted: bool,
    pub reason: Option<String>,
    pub suggested_crop: Option<CropBox>,
}

#[async_trait]
pub trait VisionJudge: Send + Sync {
    /// Judge whether `photo` shows exactly one person, front-facing, full body.
    async fn judge(&self, photo: &ImageAsset) -> Result<VisionJudgement, VisionError>;
}

const JUDGE_PROMPT: &str = "You check photos uploaded for a virtual fitting room. \
The photo is usable only if it shows exactly one person, facing the camera, with the \
whole body visible from head to feet. Count the people, decide whether the person faces \
the camera and whether the full body is in frame. If the photo is usable, suggest a crop \
box (fractions of the width and height) that keeps the whole person with a small margin, \
or null to keep the full frame. If it is not usable, explain in one short sentence what \
the user should change.";

#[derive(Debug, Deserialize)]
struct RawJudgement {
    person_count: u32,
    front_facing: bool,
    full_body: bool,
    reason: Option<String>,
    crop: Option<CropBox>,
}

impl From<RawJudgement> for VisionJudgement {
    fn from(raw: RawJudgement) -> Self {
        let problem = if raw.person_count != 1 {
            Some(format!(
                "Please upload a photo with exactly one person (found {}).",
                raw.person_count
            ))
        } else if !raw.front_facing {
            Some("Please face the camera in your photo.".to_owned())
        } else if !raw.full_body {
            Some("Please upload a full-body photo, from head to feet.".to_owned())
        } else {
            None
        };
        let reason = raw.reason.filter(|r| !r.trim().is_empty());

        match problem {
            None => Self {
                accepted: true,
                reason,
                suggested_crop: raw.crop,
            },
            Some(problem) => Self {
                accepted: false,
                reason: reason.or(Some(problem)),
                suggested_crop: None,
            },
        }
    }
}

/// `VisionJudge` backed by a multimodal chat model.
pub struct LlmVisionJudge {
    client: LlmClient,
}

impl LlmVisionJudge {
    #[must_use]
    pub const fn new(client: LlmClient) -> Self {
        Self { client }
    }

    fn schema() -> serde_json::Value {
        let fraction = json!({ "type": "number", "minimum": 0, "maximum": 1 });
        json!({
            "type": "object",
            "properties": {
                "person_count": { "type": "integer", "minimum": 0 },
                "front_facing": { "type": "boolean" },
                "full_body": { "type": "boolean" },
                "reason": { "type": ["string", "null"] },
                "crop": {
                    "type": ["object", "null"],
                    "properties": {
                        "left": fraction,
                        "top": fraction,
                        "right": fraction,
                        "bottom": fraction
                    },
                    "required": ["left", "top", "right", "bottom"],
                    "additionalProperties": false
                }
            },
            "required": ["person_count", "front_facing", "full_body", "reason", "crop"],
            "additionalProperties": false
        })
    }
}

#[async_trait]
impl VisionJudge for LlmVisionJudge {
    async fn judge(&self, photo: &ImageAsset) -> Result<VisionJudgement, VisionError> {
        let jpeg = photo
            .encode_jpeg(85)
            .map_err(|e| VisionError::Encode(e.to_string()))?;
        let answer = self
            .client
            .chat(JUDGE_PROMPT)
            .images(&[jpeg.as_slice()])
            .schema(Self::schema())
            .call()
            .await?;
        debug!("Vision judge answered: {answer}");
        parse_judgement(&answer)
    }
}

fn parse_judgement(answer: &str) -> Result<VisionJudgement, VisionError> {
    let json = extract_json_object(answer)
        .ok_or_else(|| VisionError::Malformed(format!("no JSON object in '{answer}'")))?;
    let raw: RawJudgement =
        serde_json::from_str(json).map_err(|e| VisionError::Malformed(e.to_string()))?;
    Ok(raw.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_front_facing_full_body() -> Result<(), VisionError> {
        let judgement = parse_judgement(
            r#"{"person_count": 1, "front_facing": true, "full_body": true, "reason": null,
                "crop": {"left": 0.1, "top": 0.0, "right": 0.9, "bottom": 1.0}}"#,
        )?;
        assert!(judgement.accepted);
        assert_eq!(judgement.reason, None);
        assert!(judgement.suggested_crop.is_some());
        Ok(())
    }

    #[test]
    fn group_photo_is_rejected_with_reason() -> Result<(), VisionError> {
        let judgement = parse_judgement(
            r#"```json
            {"person_count": 3, "front_facing": true, "full_body": true, "reason": "", "crop": null}
            ```"#,
        )?;
        assert!(!judgement.accepted);
        assert_eq!(
            judgement.reason.as_deref(),
            Some("Please upload a photo with exactly one person (found 3).")
        );
        Ok(())
    }

    #[test]
    fn model_reason_wins_over_generic_one() -> Result<(), VisionError> {
        let judgement = parse_judgement(
            r#"{"person_count": 1, "front_facing": true, "full_body": false,
                "reason": "Your feet are cut off.", "crop": null}"#,
        )?;
        assert!(!judgement.accepted);
        assert_eq!(judgement.reason.as_deref(), Some("Your feet are cut off."));
        Ok(())
    }

    #[test]
    fn prose_answer_is_malformed() {
        assert!(matches!(
            parse_judgement("Looks great to me!"),
            Err(VisionError::Malformed(_))
        ));
        assert!(matches!(
            parse_judgement(r#"{"accepted": true}"#),
            Err(VisionError::Malformed(_))
        ));
    }

    #[test]
    fn crop_box_to_pixels() {
        let crop = CropBox {
            left: 0.25,
            top: 0.0,
            right: 0.75,
            bottom: 1.0,
        };
        assert_eq!(crop.to_pixels(800, 1200), Some((200, 0, 400, 1200)));

        let inverted = CropBox {
            left: 0.8,
            top: 0.0,
            right: 0.2,
            bottom: 1.0,
        };
        assert_eq!(inverted.to_pixels(800, 1200), None);

        let outside = CropBox {
            left: -0.1,
            top: 0.0,
            right: 0.5,
            bottom: 1.0,
        };
        assert_eq!(outside.to_pixels(800, 1200), None);
    }
}
