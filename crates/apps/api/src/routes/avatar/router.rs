use crate::api_state::ApiContext;
use crate::avatar::handlers::validate_avatar_handler;
use axum::{Router, routing::post};

pub fn avatar_router() -> Router<ApiContext> {
    Router::new().route("/validate-avatar", post(validate_avatar_handler))
}
