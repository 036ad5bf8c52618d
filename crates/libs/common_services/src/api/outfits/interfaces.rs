use common_types::GarmentItem;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecommendOutfitParams {
    /// Body height in cm.
    pub height: f32,
    /// Body weight in kg. Accepted but not used for matching.
    pub weight: Option<f32>,
    /// `male`, `female` or `neutral` (default).
    pub gender: Option<String>,
    /// Free-text style wish, e.g. "casual summer".
    pub style_preference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendOutfitResponse {
    /// Best first. Each outfit is a top with a bottom, or one dress.
    pub outfits: Vec<Vec<GarmentItem>>,
}
