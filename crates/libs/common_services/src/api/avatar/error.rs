use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("No photo was uploaded.")]
    MissingPhoto,

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("The uploaded file is not a readable image: {0}")]
    MalformedImage(String),

    /// The reason is meant for the user.
    #[error("{0}")]
    Rejected(String),

    #[error("The photo could not be checked right now, please try again.")]
    Indeterminate(String),

    #[error("Could not encode the processed photo.")]
    Encode(String),
}

impl IntoResponse for AvatarError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingPhoto | Self::Multipart(_) | Self::MalformedImage(_) => {
                warn!("Avatar upload refused: {self}");
                StatusCode::BAD_REQUEST
            }
            Self::Rejected(reason) => {
                info!("Avatar rejected: {reason}");
                StatusCode::BAD_REQUEST
            }
            Self::Indeterminate(detail) => {
                warn!("Avatar validation indeterminate: {detail}");
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Encode(detail) => {
                error!("Avatar encode failed: {detail}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
