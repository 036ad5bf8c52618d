use crate::region::RegionHint;
use crate::synthesis::{GarmentSynthesizer, SynthesisError, SynthesisRequest};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bon::bon;
use common_types::ImageAsset;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

const UPLOAD_JPEG_QUALITY: u8 = 95;

/// `GarmentSynthesizer` running a virtual try-on model on Replicate's prediction API.
#[derive(Clone)]
pub struct ReplicateSynthesizer {
    http: Client,
    base_url: String,
    api_token: String,
    model_version: String,
    poll_interval: Duration,
    denoise_steps: u32,
    seed: i64,
    permits: Arc<Semaphore>,
}

#[derive(Serialize, Debug)]
struct PredictionRequest<'a> {
    version: &'a str,
    input: ModelInput,
}

#[derive(Serialize, Debug, PartialEq)]
struct ModelInput {
    human_img: String,
    garm_img: String,
    garment_des: String,
    category: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mask_region: Option<MaskRegion>,
    crop: bool,
    steps: u32,
    seed: i64,
}

/// Vertical band of the frame the model may repaint.
#[derive(Serialize, Debug, PartialEq)]
struct MaskRegion {
    top: f32,
    bottom: f32,
}

#[derive(Deserialize, Debug)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    urls: PredictionUrls,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Deserialize, Debug)]
struct PredictionUrls {
    get: String,
    cancel: String,
}

/// Cancels the remote prediction unless disarmed, so a timed-out request
/// stops burning GPU time on the other end.
struct CancelOnDrop {
    http: Client,
    url: String,
    token: String,
    armed: bool,
}

impl CancelOnDrop {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let request = self
            .http
            .post(std::mem::take(&mut self.url))
            .bearer_auth(std::mem::take(&mut self.token));
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) => debug!("Cancelled prediction: {}", response.status()),
                Err(e) => warn!("Could not cancel prediction: {e}"),
            }
        });
    }
}

#[bon]
impl ReplicateSynthesizer {
    #[builder]
    pub fn new(
        http: Option<Client>,
        base_url: &str,
        api_token: String,
        model_version: String,
        #[builder(default = Duration::from_secs(1))] poll_interval: Duration,
        #[builder(default = 30)] denoise_steps: u32,
        #[builder(default = 42)] seed: i64,
        #[builder(default = 4)] max_concurrent: usize,
    ) -> Self {
        Self {
            http: http.unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_token,
            model_version,
            poll_interval,
            denoise_steps,
            seed,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }
}

impl ReplicateSynthesizer {
    fn build_input(&self, request: &SynthesisRequest) -> Result<ModelInput, SynthesisError> {
        let mask_region = match request.region {
            RegionHint::LowerHalf => {
                let (top, bottom) = request.region.frame_band();
                Some(MaskRegion { top, bottom })
            }
            RegionHint::UpperBody | RegionHint::FullBody => None,
        };
        Ok(ModelInput {
            human_img: to_data_url(&request.person)?,
            garm_img: to_data_url(&request.garment)?,
            garment_des: request.description.clone(),
            category: request.region.model_category(),
            mask_region,
            crop: false,
            steps: self.denoise_steps,
            seed: self.seed,
        })
    }

    /// Answers as soon as the prediction is queued, so the id is known before
    /// the caller can time out.
    async fn create_prediction(&self, input: ModelInput) -> Result<Prediction, SynthesisError> {
        let url = format!("{}/v1/predictions", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_token)
            .json(&PredictionRequest {
                version: &self.model_version,
                input,
            })
            .send()
            .await?;
        read_prediction(response).await
    }

    async fn poll(&self, url: &str) -> Result<Prediction, SynthesisError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        read_prediction(response).await
    }

    async fn download(&self, output: &Value) -> Result<ImageAsset, SynthesisError> {
        let url = output_url(output).ok_or_else(|| {
            SynthesisError::MalformedOutput(format!("no image url in output {output}"))
        })?;
        let bytes = if let Some(encoded) = url.strip_prefix("data:") {
            let (_, b64) = encoded
                .split_once(";base64,")
                .ok_or_else(|| SynthesisError::MalformedOutput("bad data url".to_owned()))?;
            general_purpose::STANDARD
                .decode(b64)
                .map_err(|e| SynthesisError::MalformedOutput(e.to_string()))?
        } else {
            let response = self.http.get(url).send().await?.error_for_status()?;
            response.bytes().await?.to_vec()
        };
        Ok(ImageAsset::decode(&bytes)?)
    }
}

#[async_trait]
impl GarmentSynthesizer for ReplicateSynthesizer {
    #[instrument(skip_all, fields(category = %request.category, region = ?request.region))]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<ImageAsset, SynthesisError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| SynthesisError::Failed(e.to_string()))?;

        let input = self.build_input(request)?;
        let mut prediction = self.create_prediction(input).await?;
        info!("Started prediction {}", prediction.id);

        let mut guard = CancelOnDrop {
            http: self.http.clone(),
            url: prediction.urls.cancel.clone(),
            token: self.api_token.clone(),
            armed: true,
        };

        loop {
            match prediction.status {
                PredictionStatus::Succeeded => break,
                PredictionStatus::Failed | PredictionStatus::Canceled => {
                    guard.disarm();
                    let message = prediction
                        .error
                        .map_or_else(|| format!("{:?}", prediction.status), |e| e.to_string());
                    return Err(SynthesisError::Failed(message));
                }
                PredictionStatus::Starting | PredictionStatus::Processing => {
                    tokio::time::sleep(self.poll_interval).await;
                    prediction = self.poll(&prediction.urls.get).await?;
                }
            }
        }
        guard.disarm();

        let output = prediction
            .output
            .ok_or_else(|| SynthesisError::MalformedOutput("prediction has no output".to_owned()))?;
        debug!("Prediction {} succeeded", prediction.id);
        self.download(&output).await
    }
}

async fn read_prediction(response: reqwest::Response) -> Result<Prediction, SynthesisError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SynthesisError::Api {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response.json().await?)
}

fn to_data_url(image: &ImageAsset) -> Result<String, SynthesisError> {
    let jpeg = image.encode_jpeg(UPLOAD_JPEG_QUALITY)?;
    let b64 = general_purpose::STANDARD.encode(jpeg);
    Ok(format!("data:image/jpeg;base64,{b64}"))
}

/// Models answer with a single url or a list of them. The first one is the result.
fn output_url(output: &Value) -> Option<&str> {
    match output {
        Value::String(url) => Some(url),
        Value::Array(items) => items.iter().find_map(Value::as_str),
        _ => None,
    }
}
