use crate::api_state::ApiContext;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common_services::api::avatar::error::AvatarError;
use common_services::api::avatar::interfaces::AvatarUpload;
use common_services::api::avatar::service::validate_avatar;
use common_services::api::upload::UploadedForm;
use tracing::instrument;

/// Check a user photo before try-on.
///
/// Accepts the photo only if it shows exactly one person, front-facing and
/// full body. On acceptance the photo comes back as JPEG, cropped when the
/// vision service suggested a crop.
#[utoipa::path(
    post,
    path = "/validate-avatar",
    tag = "Try-on",
    request_body(content = AvatarUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Accepted photo.", content_type = "image/jpeg"),
        (status = 400, description = "Unreadable or rejected photo, `message` says why."),
        (status = 503, description = "Photo could not be checked."),
    )
)]
#[instrument(skip(context, multipart), err(Debug))]
pub async fn validate_avatar_handler(
    State(context): State<ApiContext>,
    multipart: Multipart,
) -> Result<Response, AvatarError> {
    let form = UploadedForm::read(multipart).await?;
    let try_on = &context.settings.try_on;
    let jpeg = validate_avatar(
        &context.gate,
        try_on.validation_policy,
        form,
        try_on.jpeg_quality,
    )
    .await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response())
}
