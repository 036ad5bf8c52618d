use crate::{
    ApiSettings, CatalogSettings, FallbackPolicy, LoggingSettings, RawSettings,
    RecommendationSettings, SecretSettings, ValidationPolicy, VisionSettings,
};
use std::path::absolute;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub catalog: CatalogSettings,
    pub try_on: TryOnSettings,
    pub vision: VisionSettings,
    pub synthesis: SynthesisSettings,
    pub recommendation: RecommendationSettings,
    pub secrets: SecretSettings,
}

#[derive(Debug, Clone)]
pub struct TryOnSettings {
    /// Width / height the synthesis model requires.
    pub target_ratio: f64,
    pub ratio_tolerance: f64,
    pub synthesis_timeout: Duration,
    pub validation_timeout: Duration,
    pub max_concurrent_synthesis: usize,
    pub jpeg_quality: u8,
    pub validation_policy: ValidationPolicy,
    pub fallback_policy: FallbackPolicy,
}

#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub base_url: String,
    pub model_version: String,
    pub poll_interval: Duration,
    pub denoise_steps: u32,
    pub seed: i64,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        let catalog = CatalogSettings {
            data_file: absolute(&raw.catalog.data_file).expect("Invalid catalog data_file"),
            image_folder: absolute(&raw.catalog.image_folder)
                .expect("Invalid catalog image_folder"),
            image_fetch_timeout_secs: raw.catalog.image_fetch_timeout_secs,
        };

        let ratio = &raw.try_on;
        assert!(
            ratio.target_ratio_width > 0 && ratio.target_ratio_height > 0,
            "try_on target ratio must be positive, got {}:{}",
            ratio.target_ratio_width,
            ratio.target_ratio_height
        );
        let try_on = TryOnSettings {
            target_ratio: f64::from(ratio.target_ratio_width)
                / f64::from(ratio.target_ratio_height),
            ratio_tolerance: ratio.ratio_tolerance,
            synthesis_timeout: Duration::from_secs(ratio.synthesis_timeout_secs),
            validation_timeout: Duration::from_secs(ratio.validation_timeout_secs),
            max_concurrent_synthesis: ratio.max_concurrent_synthesis.max(1),
            jpeg_quality: ratio.jpeg_quality.clamp(1, 100),
            validation_policy: ratio.validation_policy,
            fallback_policy: ratio.fallback_policy,
        };

        let synthesis = SynthesisSettings {
            base_url: raw.synthesis.base_url.trim_end_matches('/').to_owned(),
            model_version: raw.synthesis.model_version,
            poll_interval: Duration::from_millis(raw.synthesis.poll_interval_ms),
            denoise_steps: raw.synthesis.denoise_steps,
            seed: raw.synthesis.seed,
        };

        Self {
            api: raw.api,
            logging: raw.logging,
            catalog,
            try_on,
            vision: raw.vision,
            synthesis,
            recommendation: raw.recommendation,
            secrets: raw.secrets,
        }
    }
}

impl Default for TryOnSettings {
    fn default() -> Self {
        Self {
            target_ratio: 0.75,
            ratio_tolerance: 0.005,
            synthesis_timeout: Duration::from_secs(60),
            validation_timeout: Duration::from_secs(20),
            max_concurrent_synthesis: 4,
            jpeg_quality: 90,
            validation_policy: ValidationPolicy::FailOpen,
            fallback_policy: FallbackPolicy::Placeholder,
        }
    }
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            top_n: 3,
            scored_top_n: 5,
            max_outfits: 10,
        }
    }
}
