use utoipa::ToSchema;

/// Multipart body of `POST /validate-avatar`.
#[derive(ToSchema)]
pub struct AvatarUpload {
    /// Full-body photo of the user.
    #[schema(format = Binary)]
    pub file: String,
}
