use crate::test_constants::{CATALOG, REJECT_REASON};
use crate::test_helpers::png_bytes;
use api::api_state::ApiContext;
use api::create_router;
use app_state::{
    ApiSettings, AppSettings, CatalogSettings, LoggingSettings, RecommendationSettings,
    SecretSettings, SynthesisSettings, TryOnSettings, VisionSettings,
};
use color_eyre::eyre::{Result, eyre};
use common_services::catalog::JsonCatalog;
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use try_on::CropBox;
use try_on::mock::{MockSynthesizer, MockVisionJudge, SynthesisErrorKind, SynthesisOutcome};

/// Scripted stand-ins for the vision and synthesis services.
pub struct Capabilities {
    pub judge: Arc<MockVisionJudge>,
    pub synthesizer: Arc<MockSynthesizer>,
}

impl Capabilities {
    /// Accepts every photo. The first synthesis call echoes the photo, the
    /// next two fail with a server error, after that it echoes again.
    pub fn lenient() -> Self {
        Self {
            judge: Arc::new(MockVisionJudge::accepting()),
            synthesizer: Arc::new(MockSynthesizer::new([
                SynthesisOutcome::Echo,
                SynthesisOutcome::Fail(SynthesisErrorKind::ServerError),
                SynthesisOutcome::Fail(SynthesisErrorKind::ServerError),
            ])),
        }
    }

    /// Rejects every photo.
    pub fn strict() -> Self {
        Self {
            judge: Arc::new(MockVisionJudge::rejecting(Some(REJECT_REASON))),
            synthesizer: Arc::new(MockSynthesizer::echo()),
        }
    }

    /// Accepts every photo and suggests its middle half.
    pub fn cropping() -> Self {
        let crop = CropBox {
            left: 0.25,
            top: 0.0,
            right: 0.75,
            bottom: 1.0,
        };
        Self {
            judge: Arc::new(MockVisionJudge::accepting().with_crop(crop)),
            synthesizer: Arc::new(MockSynthesizer::echo()),
        }
    }
}

/// The main context for our integration tests.
#[allow(dead_code)]
pub struct TestContext {
    pub settings: AppSettings,
    pub http_client: Client,
    pub judge: Arc<MockVisionJudge>,
    pub synthesizer: Arc<MockSynthesizer>,
    // Kept so the catalog folder lives as long as the server.
    model_dir: TempDir,
    api_handle: JoinHandle<()>,
}

impl TestContext {
    /// Write a catalog to a temp folder and serve the API on a free port.
    pub async fn new(capabilities: Capabilities) -> Result<Self> {
        info!("Setting up test environment...");

        let model_dir = tempfile::tempdir()?;
        Self::write_catalog(&model_dir)?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let settings = create_test_settings(&model_dir, addr);

        let catalog = JsonCatalog::load(&settings.catalog).await?;
        let api_state = ApiContext::new(
            settings.clone(),
            catalog,
            capabilities.judge.clone(),
            capabilities.synthesizer.clone(),
            None,
        )?;
        let app = create_router(api_state);
        let api_handle = tokio::spawn(async move {
            if let Err(e) =
                axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                    .await
            {
                error!("API server failed: {}", e);
            }
        });

        let http_client = Client::new();
        Self::wait_for_healthy_api(&settings, &http_client).await?;

        info!("Test environment is ready.");
        Ok(Self {
            settings,
            http_client,
            judge: capabilities.judge,
            synthesizer: capabilities.synthesizer,
            model_dir,
            api_handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.api.public_url)
    }

    fn write_catalog(model_dir: &TempDir) -> Result<()> {
        let folder = model_dir.path();
        std::fs::write(folder.join("clothes.json"), CATALOG)?;
        for (file, color) in [
            ("1.jpg", [250, 250, 250]),
            ("skirt.png", [30, 30, 90]),
            ("3.jpg", [10, 10, 10]),
            ("10.jpg", [60, 90, 160]),
            ("11.jpg", [180, 160, 120]),
            ("20.jpg", [90, 60, 30]),
        ] {
            std::fs::write(folder.join(file), png_bytes(120, 160, color)?)?;
        }
        Ok(())
    }

    /// Polls the `/health` endpoint until it receives a successful response or times out.
    async fn wait_for_healthy_api(settings: &AppSettings, http_client: &Client) -> Result<()> {
        for attempt in 1..=20 {
            info!("Health check attempt {}...", attempt);
            let health_url = format!("{}/health", &settings.api.public_url);
            match http_client.get(&health_url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("API is healthy!");
                    return Ok(());
                }
                Ok(response) => {
                    warn!(
                        "API health check returned non-success status: {}",
                        response.status()
                    );
                }
                Err(e) => {
                    warn!("API health check failed: {:?}. Retrying...", e);
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err(eyre!(
            "API did not become healthy within the timeout period."
        ))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.api_handle.abort();
        info!("Teardown complete.");
    }
}

fn create_test_settings(model_dir: &TempDir, addr: SocketAddr) -> AppSettings {
    AppSettings {
        api: ApiSettings {
            host: addr.ip().to_string(),
            port: u32::from(addr.port()),
            allowed_origins: vec![],
            public_url: format!("http://{addr}"),
            max_upload_bytes: 10 * 1024 * 1024,
        },
        logging: LoggingSettings {
            level: "debug".to_owned(),
        },
        catalog: CatalogSettings {
            data_file: model_dir.path().join("clothes.json"),
            image_folder: model_dir.path().to_path_buf(),
            image_fetch_timeout_secs: 5,
        },
        try_on: TryOnSettings {
            synthesis_timeout: Duration::from_secs(5),
            validation_timeout: Duration::from_secs(5),
            ..TryOnSettings::default()
        },
        vision: VisionSettings {
            base_url: "http://127.0.0.1:9".to_owned(),
            model: "unused".to_owned(),
        },
        synthesis: SynthesisSettings {
            base_url: "http://127.0.0.1:9".to_owned(),
            model_version: "unused".to_owned(),
            poll_interval: Duration::from_millis(100),
            denoise_steps: 30,
            seed: 42,
        },
        recommendation: RecommendationSettings::default(),
        secrets: SecretSettings {
            vision_api_key: String::new(),
            replicate_api_token: String::new(),
        },
    }
}
