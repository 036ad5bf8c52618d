use common_services::catalog::JsonCatalog;
use axum::extract::State;
use tracing::debug;

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "API is up and the catalog is loaded", body = String),
    )
)]
pub async fn health_check(State(catalog): State<JsonCatalog>) -> &'static str {
    debug!("Health check, {} garments in catalog", catalog.len());
    "OK"
}
