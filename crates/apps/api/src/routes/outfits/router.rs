use crate::api_state::ApiContext;
use crate::outfits::handlers::recommend_outfit_handler;
use axum::{Router, routing::get};

pub fn outfits_router() -> Router<ApiContext> {
    Router::new().route("/recommend-outfit", get(recommend_outfit_handler))
}
