use crate::Gender;
use serde::{Deserialize, Serialize};

/// Body attributes and taste of the person asking for a recommendation.
/// Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub height_cm: f32,
    pub weight_kg: Option<f32>,
    pub gender_preference: Gender,
    pub style_preference_text: Option<String>,
}

impl UserProfile {
    #[must_use]
    pub const fn new(height_cm: f32, gender_preference: Gender) -> Self {
        Self {
            height_cm,
            weight_kg: None,
            gender_preference,
            style_preference_text: None,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style_preference_text = Some(style.into());
        self
    }

    /// The style preference, if it holds anything besides whitespace.
    #[must_use]
    pub fn style_preference(&self) -> Option<&str> {
        self.style_preference_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
