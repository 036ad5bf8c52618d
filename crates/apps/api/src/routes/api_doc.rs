use crate::routes::{avatar, clothes, outfits, root, try_on};
use common_services::api::avatar::interfaces::AvatarUpload;
use common_services::api::outfits::interfaces::RecommendOutfitResponse;
use common_services::api::try_on::interfaces::TryOnUpload;
use common_types::{GarmentItem, HeightRange};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::health_check,
        // Catalog
        clothes::handlers::list_clothes_handler,
        clothes::handlers::get_clothing_handler,
        // Try-on
        avatar::handlers::validate_avatar_handler,
        try_on::handlers::try_on_handler,
        // Recommendation
        outfits::handlers::recommend_outfit_handler,
    ),
    components(
        schemas(GarmentItem, HeightRange, AvatarUpload, TryOnUpload, RecommendOutfitResponse),
    ),
    tags(
        (name = "System", description = "Health and docs"),
        (name = "Clothes", description = "Browse the garment catalog"),
        (name = "Try-on", description = "Validate photos and composite garments onto them"),
        (name = "Recommendation", description = "Outfit suggestions from body attributes and style"),
    )
)]
pub struct ApiDoc;
