use crate::api_state::ApiContext;
use axum::extract::{Multipart, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use common_services::api::try_on::error::TryOnServiceError;
use common_services::api::try_on::interfaces::{FALLBACK_HEADER, TryOnUpload};
use common_services::api::try_on::service::run_try_on;
use common_services::api::upload::UploadedForm;
use tracing::{instrument, warn};

/// Dress the uploaded photo in a catalog garment.
///
/// Returns the composited JPEG at the size of the uploaded photo. When the
/// synthesis service is down the image is a local placeholder and the
/// `X-Try-On-Fallback` header is `true`.
#[utoipa::path(
    post,
    path = "/try-on",
    tag = "Try-on",
    request_body(content = TryOnUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Composited photo.", content_type = "image/jpeg",
            headers(("x-try-on-fallback" = bool, description = "Whether the image is a placeholder"))),
        (status = 400, description = "Unreadable or rejected photo, `message` says why."),
        (status = 404, description = "Unknown garment."),
        (status = 422, description = "Garment category not supported for try-on."),
        (status = 503, description = "Synthesis service unavailable."),
    )
)]
#[instrument(skip(context, multipart), err(Debug))]
pub async fn try_on_handler(
    State(context): State<ApiContext>,
    multipart: Multipart,
) -> Result<Response, TryOnServiceError> {
    let form = UploadedForm::read(multipart).await?;
    let result = run_try_on(&context.catalog, &context.orchestrator, form).await?;
    if result.used_fallback {
        warn!("Serving placeholder try-on result");
    }

    let fallback = if result.used_fallback {
        HeaderValue::from_static("true")
    } else {
        HeaderValue::from_static("false")
    };
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (HeaderName::from_static(FALLBACK_HEADER), fallback),
        ],
        result.jpeg,
    )
        .into_response())
}
