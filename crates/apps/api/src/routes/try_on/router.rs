use crate::api_state::ApiContext;
use crate::try_on::handlers::try_on_handler;
use axum::{Router, routing::post};

pub fn try_on_router() -> Router<ApiContext> {
    Router::new().route("/try-on", post(try_on_handler))
}
