use crate::api::try_on::error::TryOnServiceError;
use crate::api::upload::UploadedForm;
use crate::catalog::JsonCatalog;
use common_types::ImageAsset;
use try_on::{TryOnError, TryOnOrchestrator, TryOnRequest, TryOnResult};

const GARMENT_ID_FIELDS: [&str; 2] = ["clothes_id", "garment_id"];

/// Resolve the form into a try-on request and run it.
///
/// The photo is decoded before anything else so a broken upload never costs an
/// external call.
pub async fn run_try_on(
    catalog: &JsonCatalog,
    orchestrator: &TryOnOrchestrator,
    form: UploadedForm,
) -> Result<TryOnResult, TryOnServiceError> {
    let garment_id = form
        .field(&GARMENT_ID_FIELDS)
        .ok_or(TryOnServiceError::MissingField("clothes_id"))?
        .to_owned();
    let bytes = form
        .photo
        .ok_or(TryOnServiceError::MissingField("file"))?;
    let user_photo = ImageAsset::decode(&bytes).map_err(TryOnError::from)?;

    let garment = catalog
        .find(&garment_id)
        .ok_or(TryOnServiceError::GarmentNotFound(garment_id))?
        .clone();
    let garment_image = catalog.load_image(&garment).await?;

    let result = orchestrator
        .try_on(TryOnRequest {
            user_photo,
            garment,
            garment_image,
        })
        .await?;
    Ok(result)
}
