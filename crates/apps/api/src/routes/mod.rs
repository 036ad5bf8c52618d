mod api_doc;
pub mod avatar;
pub mod clothes;
pub mod outfits;
pub mod root;
pub mod try_on;

use crate::api_state::ApiContext;
use crate::avatar::router::avatar_router;
use crate::clothes::router::clothes_router;
use crate::outfits::router::outfits_router;
use crate::root::router::root_router;
use crate::routes::api_doc::ApiDoc;
use crate::try_on::router::try_on_router;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    let upload_limit = api_state.settings.api.max_upload_bytes;
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(root_router())
        .merge(clothes_router())
        .merge(avatar_router())
        .merge(try_on_router())
        .merge(outfits_router())
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(api_state)
}
