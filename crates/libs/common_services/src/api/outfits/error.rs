use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum OutfitsError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl IntoResponse for OutfitsError {
    fn into_response(self) -> Response {
        warn!("Outfit recommendation refused: {self}");
        let status = match self {
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
