use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    /// Where the garment catalog document and its images live.
    pub catalog: CatalogSettings,
    pub try_on: RawTryOnSettings,
    pub vision: VisionSettings,
    pub synthesis: RawSynthesisSettings,
    pub recommendation: RecommendationSettings,
    pub secrets: SecretSettings,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u32,
    pub allowed_origins: Vec<String>,
    pub public_url: String,
    /// Upper bound for multipart uploads (user photos).
    pub max_upload_bytes: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSettings {
    /// JSON array of garment records.
    pub data_file: PathBuf,
    /// Folder with garment images, served under `/images`.
    pub image_folder: PathBuf,
    /// Upper bound on fetching one remote garment image.
    #[serde(default = "default_image_fetch_timeout_secs")]
    pub image_fetch_timeout_secs: u64,
}

const fn default_image_fetch_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawTryOnSettings {
    pub target_ratio_width: u32,
    pub target_ratio_height: u32,
    /// Relative tolerance under which a photo counts as already having the target ratio.
    pub ratio_tolerance: f64,
    pub synthesis_timeout_secs: u64,
    pub validation_timeout_secs: u64,
    /// Upper bound on in-flight calls to the synthesis service.
    pub max_concurrent_synthesis: usize,
    /// JPEG quality 1..=100 for the final composite.
    pub jpeg_quality: u8,
    pub validation_policy: ValidationPolicy,
    pub fallback_policy: FallbackPolicy,
}

/// What to do when the vision judge cannot give a verdict.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Continue with the unvalidated photo.
    FailOpen,
    /// Treat the photo as rejected.
    FailClosed,
}

/// What to do when both synthesis attempts fail.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Return a locally generated composite, flagged as a fallback.
    Placeholder,
    /// Surface `ExternalServiceUnavailable` to the caller.
    Disabled,
}

/// OpenAI-compatible vision model used to judge user photos and score styles.
#[derive(Debug, Deserialize, Clone)]
pub struct VisionSettings {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawSynthesisSettings {
    pub base_url: String,
    /// Replicate model version hash of the try-on model.
    pub model_version: String,
    pub poll_interval_ms: u64,
    pub denoise_steps: u32,
    pub seed: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationSettings {
    /// Items per category group used when no style preference is given.
    pub top_n: usize,
    /// Items per category group kept after style scoring.
    pub scored_top_n: usize,
    pub max_outfits: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecretSettings {
    pub vision_api_key: String,
    pub replicate_api_token: String,
}
