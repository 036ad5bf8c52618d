use crate::api::outfits::error::OutfitsError;
use crate::api::outfits::interfaces::{RecommendOutfitParams, RecommendOutfitResponse};
use crate::catalog::JsonCatalog;
use common_types::{Gender, UserProfile};
use recommendation::Recommender;

pub fn build_profile(params: &RecommendOutfitParams) -> Result<UserProfile, OutfitsError> {
    if !params.height.is_finite() || params.height <= 0.0 {
        return Err(OutfitsError::InvalidQuery(format!(
            "height must be a positive number of cm, got {}",
            params.height
        )));
    }
    let gender = match params.gender.as_deref().map(str::trim) {
        None | Some("") => Gender::Neutral,
        Some(text) => text
            .parse()
            .map_err(|_| OutfitsError::InvalidQuery(format!("'{text}' is not a known gender")))?,
    };

    Ok(UserProfile {
        height_cm: params.height,
        weight_kg: params.weight,
        gender_preference: gender,
        style_preference_text: params.style_preference.clone(),
    })
}

pub async fn recommend_outfits(
    catalog: &JsonCatalog,
    recommender: &Recommender,
    params: &RecommendOutfitParams,
) -> Result<RecommendOutfitResponse, OutfitsError> {
    let profile = build_profile(params)?;
    let outfits = recommender
        .recommend(&profile, catalog.items())
        .await
        .into_iter()
        .map(|outfit| outfit.items.iter().map(JsonCatalog::public_item).collect())
        .collect();
    Ok(RecommendOutfitResponse { outfits })
}
