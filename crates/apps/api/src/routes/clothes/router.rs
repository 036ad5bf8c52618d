use crate::api_state::ApiContext;
use crate::clothes::handlers::{get_clothing_handler, list_clothes_handler};
use axum::{Router, routing::get};

pub fn clothes_router() -> Router<ApiContext> {
    Router::new()
        .route("/clothes", get(list_clothes_handler))
        .route("/clothes/{id}", get(get_clothing_handler))
}
