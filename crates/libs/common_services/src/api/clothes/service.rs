use crate::api::clothes::error::ClothesError;
use crate::api::clothes::interfaces::ListClothesParams;
use crate::catalog::JsonCatalog;
use common_types::{GarmentItem, Gender};
use recommendation::filter_catalog;

/// Parse a height like `170`, `170.5` or `170cm`.
pub fn parse_height(text: &str) -> Result<f32, ClothesError> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix("cm").unwrap_or(trimmed).trim();
    number
        .parse::<f32>()
        .ok()
        .filter(|h| h.is_finite() && *h > 0.0)
        .ok_or_else(|| ClothesError::InvalidQuery(format!("'{text}' is not a height in cm")))
}

pub fn parse_gender(text: &str) -> Result<Gender, ClothesError> {
    text.parse()
        .map_err(|_| ClothesError::InvalidQuery(format!("'{text}' is not a known gender")))
}

/// Catalog items matching the optional height and gender filters.
pub fn list_clothes(
    catalog: &JsonCatalog,
    params: &ListClothesParams,
) -> Result<Vec<GarmentItem>, ClothesError> {
    let height = params
        .height
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .map(parse_height)
        .transpose()?;
    let gender = params
        .gender
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .map(parse_gender)
        .transpose()?;

    Ok(filter_catalog(catalog.items(), height, gender)
        .map(JsonCatalog::public_item)
        .collect())
}

pub fn get_clothing(catalog: &JsonCatalog, id: &str) -> Result<GarmentItem, ClothesError> {
    catalog
        .find(id)
        .map(JsonCatalog::public_item)
        .ok_or_else(|| ClothesError::NotFound(id.to_owned()))
}
