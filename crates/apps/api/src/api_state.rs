use app_state::AppSettings;
use axum::extract::FromRef;
use color_eyre::Result;
use common_services::catalog::JsonCatalog;
use language_model::LlmClient;
use recommendation::{LlmStyleScorer, Recommender, StyleScorer};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use try_on::{
    GarmentSynthesizer, LlmVisionJudge, ReplicateSynthesizer, TryOnError, TryOnOrchestrator,
    TryOnPolicy, ValidationGate, VisionJudge,
};

#[derive(Clone)]
pub struct ApiContext {
    pub settings: AppSettings,
    pub catalog: JsonCatalog,
    pub gate: ValidationGate,
    pub orchestrator: TryOnOrchestrator,
    pub recommender: Recommender,
}

impl ApiContext {
    /// Wire the pipeline around the given capabilities.
    pub fn new(
        settings: AppSettings,
        catalog: JsonCatalog,
        judge: Arc<dyn VisionJudge>,
        synthesizer: Arc<dyn GarmentSynthesizer>,
        scorer: Option<Arc<dyn StyleScorer>>,
    ) -> Result<Self, TryOnError> {
        let gate = ValidationGate::new(judge, settings.try_on.validation_timeout);
        let orchestrator = TryOnOrchestrator::new(
            gate.clone(),
            synthesizer,
            TryOnPolicy::from(&settings.try_on),
        )?;
        let recommender = Recommender::new(&settings.recommendation, scorer);
        Ok(Self {
            settings,
            catalog,
            gate,
            orchestrator,
            recommender,
        })
    }

    /// Load the catalog and connect the remote vision and synthesis services.
    pub async fn from_settings(settings: AppSettings) -> Result<Self> {
        let catalog = JsonCatalog::load(&settings.catalog).await?;

        let llm = vision_client(&settings)?;
        let judge = Arc::new(LlmVisionJudge::new(llm.clone()));
        let scorer: Option<Arc<dyn StyleScorer>> = if settings.secrets.vision_api_key.is_empty() {
            warn!("No vision api key configured, style matching uses keyword overlap only.");
            None
        } else {
            Some(Arc::new(LlmStyleScorer::new(llm)))
        };

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let synthesis = &settings.synthesis;
        let synthesizer = Arc::new(
            ReplicateSynthesizer::builder()
                .http(http)
                .base_url(&synthesis.base_url)
                .api_token(settings.secrets.replicate_api_token.clone())
                .model_version(synthesis.model_version.clone())
                .poll_interval(synthesis.poll_interval)
                .denoise_steps(synthesis.denoise_steps)
                .seed(synthesis.seed)
                .max_concurrent(settings.try_on.max_concurrent_synthesis)
                .build(),
        );
        info!(
            "Synthesis via {} (at most {} concurrent calls)",
            synthesis.base_url, settings.try_on.max_concurrent_synthesis
        );

        Ok(Self::new(settings, catalog, judge, synthesizer, scorer)?)
    }
}

/// Client for the vision model, shared by the photo judge and the style scorer.
fn vision_client(settings: &AppSettings) -> Result<LlmClient> {
    Ok(LlmClient::with_base_url(&settings.vision.base_url)
        .model(settings.vision.model.clone())
        .api_key(settings.secrets.vision_api_key.clone())
        .timeout(settings.try_on.validation_timeout)
        .build()?)
}

impl FromRef<ApiContext> for AppSettings {
    fn from_ref(state: &ApiContext) -> Self {
        state.settings.clone()
    }
}

impl FromRef<ApiContext> for JsonCatalog {
    fn from_ref(state: &ApiContext) -> Self {
        state.catalog.clone()
    }
}

impl FromRef<ApiContext> for Recommender {
    fn from_ref(state: &ApiContext) -> Self {
        state.recommender.clone()
    }
}
