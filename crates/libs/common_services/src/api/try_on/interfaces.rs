use utoipa::ToSchema;

/// Response header telling whether the image is a local placeholder.
pub const FALLBACK_HEADER: &str = "x-try-on-fallback";

/// Multipart body of `POST /try-on`.
#[derive(ToSchema)]
pub struct TryOnUpload {
    /// Full-body photo of the user.
    #[schema(format = Binary)]
    pub file: String,
    /// Catalog id of the garment (`garment_id` is accepted too).
    pub clothes_id: String,
}
