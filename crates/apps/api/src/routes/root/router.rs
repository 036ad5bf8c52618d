use crate::api_state::ApiContext;
use crate::root::handlers::health_check;
use axum::{Router, routing::get};

pub fn root_router() -> Router<ApiContext> {
    Router::new().route("/health", get(health_check))
}
