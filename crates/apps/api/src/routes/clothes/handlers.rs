use axum::Json;
use axum::extract::{Path, Query, State};
use common_services::api::clothes::error::ClothesError;
use common_services::api::clothes::interfaces::ListClothesParams;
use common_services::api::clothes::service::{get_clothing, list_clothes};
use common_services::catalog::JsonCatalog;
use common_types::GarmentItem;
use tracing::instrument;

/// List catalog garments.
///
/// Filters by body height and gender with the same rules the outfit
/// recommendation uses. Without filters the whole catalog is returned.
#[utoipa::path(
    get,
    path = "/clothes",
    tag = "Clothes",
    params(ListClothesParams),
    responses(
        (status = 200, description = "Matching garments.", body = [GarmentItem]),
        (status = 400, description = "Unparseable height or gender."),
    )
)]
#[instrument(skip(catalog), err(Debug))]
pub async fn list_clothes_handler(
    State(catalog): State<JsonCatalog>,
    Query(params): Query<ListClothesParams>,
) -> Result<Json<Vec<GarmentItem>>, ClothesError> {
    Ok(Json(list_clothes(&catalog, &params)?))
}

/// Get one garment by id.
#[utoipa::path(
    get,
    path = "/clothes/{id}",
    tag = "Clothes",
    params(("id" = String, Path, description = "Catalog id")),
    responses(
        (status = 200, description = "The garment.", body = GarmentItem),
        (status = 404, description = "No garment with this id."),
    )
)]
#[instrument(skip(catalog), err(Debug))]
pub async fn get_clothing_handler(
    State(catalog): State<JsonCatalog>,
    Path(id): Path<String>,
) -> Result<Json<GarmentItem>, ClothesError> {
    Ok(Json(get_clothing(&catalog, &id)?))
}
