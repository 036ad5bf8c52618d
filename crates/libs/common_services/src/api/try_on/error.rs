use crate::catalog::CatalogError;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use try_on::TryOnError;

#[derive(Debug, Error)]
pub enum TryOnServiceError {
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Garment not found: {0}")]
    GarmentNotFound(String),

    #[error("Garment image unavailable: {0}")]
    GarmentImage(#[from] CatalogError),

    #[error(transparent)]
    TryOn(#[from] TryOnError),
}

impl IntoResponse for TryOnServiceError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MissingField(_) | Self::Multipart(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::GarmentNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::GarmentImage(CatalogError::ImageIo { .. } | CatalogError::InvalidImagePath(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Self::GarmentImage(CatalogError::Fetch(_)) => {
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            Self::GarmentImage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The garment image could not be read.".to_owned(),
            ),
            Self::TryOn(err) => match err {
                TryOnError::MalformedImage(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                TryOnError::ValidationRejected(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
                TryOnError::UnsupportedCategory(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
                }
                TryOnError::ValidationIndeterminate(_)
                | TryOnError::ExternalServiceUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The try-on service is unavailable, please try again later.".to_owned(),
                ),
                TryOnError::DimensionMismatch(_)
                | TryOnError::Encode(_)
                | TryOnError::Internal(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected internal error occurred.".to_owned(),
                ),
            },
        };

        if status.is_server_error() {
            error!("Try-on failed: {self}");
        } else if matches!(self, Self::TryOn(TryOnError::ValidationRejected(_))) {
            info!("Try-on photo rejected: {self}");
        } else {
            warn!("Try-on request refused: {self}");
        }
        (status, Json(json!({ "message": message }))).into_response()
    }
}
