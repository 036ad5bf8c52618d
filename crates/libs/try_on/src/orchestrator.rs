use crate::placeholder::compose_placeholder;
use crate::region::{region_hint, resolve_category};
use crate::synthesis::{GarmentSynthesizer, SynthesisError, SynthesisRequest};
use crate::validation::{ValidationError, ValidationGate};
use crate::TryOnError;
use app_state::{FallbackPolicy, TryOnSettings, ValidationPolicy};
use aspect_normalizer::{AspectNormalizer, denormalize, fit_to_padded};
use common_types::{GarmentItem, ImageAsset};
use image::ImageFormat;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TryOnState {
    Idle,
    Validating,
    Normalizing,
    Synthesizing,
    DeNormalizing,
    PostProcessing,
    Done,
    Failed,
}

impl TryOnState {
    /// The pipeline only moves forward one step at a time, or into `Failed`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        use TryOnState::{
            DeNormalizing, Done, Failed, Idle, Normalizing, PostProcessing, Synthesizing,
            Validating,
        };
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, Normalizing)
                | (Normalizing, Synthesizing)
                | (Synthesizing, DeNormalizing)
                | (DeNormalizing, PostProcessing)
                | (PostProcessing, Done)
        ) || (matches!(next, Failed) && !matches!(self, Done | Failed))
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Records the states one try-on request went through.
#[derive(Debug, Clone)]
struct StateTrace {
    history: Vec<TryOnState>,
}

impl StateTrace {
    fn new() -> Self {
        Self {
            history: vec![TryOnState::Idle],
        }
    }

    fn current(&self) -> TryOnState {
        self.history.last().copied().unwrap_or(TryOnState::Idle)
    }

    fn advance(&mut self, next: TryOnState) -> Result<(), TryOnError> {
        let current = self.current();
        if !current.can_advance_to(next) {
            return Err(TryOnError::Internal(format!(
                "illegal transition {current:?} -> {next:?}"
            )));
        }
        debug!("Try-on state {current:?} -> {next:?}");
        self.history.push(next);
        Ok(())
    }

    fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.history.push(TryOnState::Failed);
        }
    }
}

/// Knobs the orchestrator consults when something goes wrong.
#[derive(Debug, Clone, Copy)]
pub struct TryOnPolicy {
    pub target_ratio: f64,
    pub ratio_tolerance: f64,
    /// Bound on one synthesis attempt. There are at most two attempts.
    pub synthesis_timeout: Duration,
    pub validation: ValidationPolicy,
    pub fallback: FallbackPolicy,
    pub jpeg_quality: u8,
}

impl Default for TryOnPolicy {
    fn default() -> Self {
        Self::from(&TryOnSettings::default())
    }
}

impl From<&TryOnSettings> for TryOnPolicy {
    fn from(settings: &TryOnSettings) -> Self {
        Self {
            target_ratio: settings.target_ratio,
            ratio_tolerance: settings.ratio_tolerance,
            synthesis_timeout: settings.synthesis_timeout,
            validation: settings.validation_policy,
            fallback: settings.fallback_policy,
            jpeg_quality: settings.jpeg_quality,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TryOnRequest {
    pub user_photo: ImageAsset,
    pub garment: GarmentItem,
    /// Decoded catalog image of `garment`.
    pub garment_image: ImageAsset,
}

#[derive(Debug, Clone)]
pub struct TryOnResult {
    /// Same dimensions as the validated user photo.
    pub composited_image: ImageAsset,
    pub jpeg: Vec<u8>,
    /// The synthesis service failed and `composited_image` is a local placeholder.
    pub used_fallback: bool,
    pub transitions: Vec<TryOnState>,
}

/// Runs one try-on request from the uploaded photo to the composited JPEG.
#[derive(Clone)]
pub struct TryOnOrchestrator {
    gate: ValidationGate,
    normalizer: AspectNormalizer,
    synthesizer: Arc<dyn GarmentSynthesizer>,
    policy: TryOnPolicy,
}

impl TryOnOrchestrator {
    pub fn new(
        gate: ValidationGate,
        synthesizer: Arc<dyn GarmentSynthesizer>,
        policy: TryOnPolicy,
    ) -> Result<Self, TryOnError> {
        let normalizer =
            AspectNormalizer::new(policy.target_ratio)?.with_tolerance(policy.ratio_tolerance);
        Ok(Self {
            gate,
            normalizer,
            synthesizer,
            policy,
        })
    }

    #[must_use]
    pub const fn policy(&self) -> &TryOnPolicy {
        &self.policy
    }

    #[instrument(skip_all, fields(garment = %request.garment.id), err(Debug))]
    pub async fn try_on(&self, request: TryOnRequest) -> Result<TryOnResult, TryOnError> {
        let mut trace = StateTrace::new();
        match self.run(request, &mut trace).await {
            Ok(result) => Ok(result),
            Err(e) => {
                let failed_in = trace.current();
                trace.fail();
                info!("Try-on failed while {failed_in:?}");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: TryOnRequest,
        trace: &mut StateTrace,
    ) -> Result<TryOnResult, TryOnError> {
        let TryOnRequest {
            user_photo,
            garment,
            garment_image,
        } = request;
        // Before validation: a bad catalog record must not cost an external call.
        let category = resolve_category(&garment.category)?;

        trace.advance(TryOnState::Validating)?;
        let photo = match self.gate.validate(&user_photo).await {
            Ok(result) if result.accepted => result.normalized_image.unwrap_or(user_photo),
            Ok(result) => {
                return Err(TryOnError::ValidationRejected(
                    result.reason.unwrap_or_default(),
                ));
            }
            Err(ValidationError::MalformedImage(message)) => {
                return Err(TryOnError::MalformedImage(message));
            }
            Err(ValidationError::Indeterminate(message)) => match self.policy.validation {
                ValidationPolicy::FailOpen => {
                    warn!("Validation indeterminate ({message}), continuing with unvalidated photo");
                    user_photo
                }
                ValidationPolicy::FailClosed => {
                    return Err(TryOnError::ValidationIndeterminate(message));
                }
            },
        };

        trace.advance(TryOnState::Normalizing)?;
        let (padded, transform) = self.normalizer.normalize(&photo)?;

        trace.advance(TryOnState::Synthesizing)?;
        let synthesis = SynthesisRequest {
            person: padded,
            garment: garment_image,
            category,
            region: region_hint(category),
            description: garment_description(&garment),
        };
        let (frame, used_fallback) = match self.synthesize_with_retry(&synthesis).await {
            Ok(frame) => (frame, false),
            Err(e) => match self.policy.fallback {
                FallbackPolicy::Placeholder => {
                    warn!("Synthesis unavailable ({e}), returning placeholder composite");
                    (compose_placeholder(&synthesis)?, true)
                }
                FallbackPolicy::Disabled => {
                    return Err(TryOnError::ExternalServiceUnavailable(e.to_string()));
                }
            },
        };

        trace.advance(TryOnState::DeNormalizing)?;
        let frame = fit_to_padded(&frame, &transform, self.policy.ratio_tolerance)?;
        let composited = denormalize(&frame, &transform)?;

        trace.advance(TryOnState::PostProcessing)?;
        let composited = composited.with_format(ImageFormat::Jpeg);
        let jpeg = composited.encode_jpeg(self.policy.jpeg_quality)?;

        trace.advance(TryOnState::Done)?;
        Ok(TryOnResult {
            composited_image: composited,
            jpeg,
            used_fallback,
            transitions: trace.history.clone(),
        })
    }

    /// One attempt, plus a single retry with identical inputs for transient failures.
    async fn synthesize_with_retry(
        &self,
        request: &SynthesisRequest,
    ) -> Result<ImageAsset, SynthesisError> {
        match self.attempt(request).await {
            Ok(frame) => Ok(frame),
            Err(e) if e.is_retryable() => {
                warn!("Synthesis attempt failed ({e}), retrying once");
                self.attempt(request).await
            }
            Err(e) => Err(e),
        }
    }

    async fn attempt(&self, request: &SynthesisRequest) -> Result<ImageAsset, SynthesisError> {
        let timeout = self.policy.synthesis_timeout;
        tokio::time::timeout(timeout, self.synthesizer.synthesize(request))
            .await
            .unwrap_or(Err(SynthesisError::Timeout(timeout)))
    }
}

fn garment_description(garment: &GarmentItem) -> String {
    let name = garment.name.trim();
    if name.is_empty() {
        garment.category.to_string()
    } else {
        name.to_owned()
    }
}
