use axum::Json;
use axum::extract::{Query, State};
use common_services::api::outfits::error::OutfitsError;
use common_services::api::outfits::interfaces::{RecommendOutfitParams, RecommendOutfitResponse};
use common_services::api::outfits::service::recommend_outfits;
use common_services::catalog::JsonCatalog;
use recommendation::Recommender;
use tracing::instrument;

/// Recommend outfits for a body profile.
///
/// Outfits are a top with a bottom, or a dress alone. With a style preference
/// they are ranked by how well they match it, otherwise ordered by catalog id.
/// No fitting garments gives an empty list.
#[utoipa::path(
    get,
    path = "/recommend-outfit",
    tag = "Recommendation",
    params(RecommendOutfitParams),
    responses(
        (status = 200, description = "Outfits, best first.", body = RecommendOutfitResponse),
        (status = 400, description = "Invalid height or gender."),
    )
)]
#[instrument(skip(catalog, recommender), err(Debug))]
pub async fn recommend_outfit_handler(
    State(catalog): State<JsonCatalog>,
    State(recommender): State<Recommender>,
    Query(params): Query<RecommendOutfitParams>,
) -> Result<Json<RecommendOutfitResponse>, OutfitsError> {
    Ok(Json(
        recommend_outfits(&catalog, &recommender, &params).await?,
    ))
}
