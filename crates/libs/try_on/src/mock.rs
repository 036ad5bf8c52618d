//! Scripted capabilities for deterministic tests.

use crate::region::RegionHint;
use crate::synthesis::{GarmentSynthesizer, SynthesisError, SynthesisRequest};
use crate::vision::{CropBox, VisionError, VisionJudge, VisionJudgement};
use async_trait::async_trait;
use common_types::{GarmentCategory, ImageAsset};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
enum JudgeBehavior {
    Answer(VisionJudgement),
    Fail,
    Hang,
}

/// `VisionJudge` that always gives the same answer.
#[derive(Debug)]
pub struct MockVisionJudge {
    behavior: JudgeBehavior,
    calls: AtomicUsize,
}

impl MockVisionJudge {
    fn with_behavior(behavior: JudgeBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn accepting() -> Self {
        Self::with_behavior(JudgeBehavior::Answer(VisionJudgement {
            accepted: true,
            reason: None,
            suggested_crop: None,
        }))
    }

    #[must_use]
    pub fn rejecting(reason: Option<&str>) -> Self {
        Self::with_behavior(JudgeBehavior::Answer(VisionJudgement {
            accepted: false,
            reason: reason.map(str::to_owned),
            suggested_crop: None,
        }))
    }

    /// Every call fails like an unreachable service.
    #[must_use]
    pub fn failing() -> Self {
        Self::with_behavior(JudgeBehavior::Fail)
    }

    /// Every call waits forever.
    #[must_use]
    pub fn hanging() -> Self {
        Self::with_behavior(JudgeBehavior::Hang)
    }

    #[must_use]
    pub fn with_crop(mut self, crop: CropBox) -> Self {
        if let JudgeBehavior::Answer(judgement) = &mut self.behavior {
            judgement.suggested_crop = Some(crop);
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionJudge for MockVisionJudge {
    async fn judge(&self, _photo: &ImageAsset) -> Result<VisionJudgement, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            JudgeBehavior::Answer(judgement) => Ok(judgement.clone()),
            JudgeBehavior::Fail => Err(VisionError::Malformed("scripted failure".to_owned())),
            JudgeBehavior::Hang => std::future::pending().await,
        }
    }
}

/// One scripted answer of `MockSynthesizer`.
#[derive(Debug, Clone)]
pub enum SynthesisOutcome {
    /// Return this frame.
    Succeed(ImageAsset),
    /// Return the person frame unchanged.
    Echo,
    Fail(SynthesisErrorKind),
    /// Never answer; the caller's timeout has to fire.
    Hang,
}

#[derive(Debug, Clone, Copy)]
pub enum SynthesisErrorKind {
    Transport,
    ServerError,
    Rejected,
}

impl SynthesisErrorKind {
    fn to_error(self) -> SynthesisError {
        match self {
            Self::Transport => SynthesisError::Transport("connection reset".to_owned()),
            Self::ServerError => SynthesisError::Api {
                status: 502,
                body: "bad gateway".to_owned(),
            },
            Self::Rejected => SynthesisError::Failed("input rejected".to_owned()),
        }
    }
}

/// What `MockSynthesizer` was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSynthesis {
    pub category: GarmentCategory,
    pub region: RegionHint,
    pub person_dimensions: (u32, u32),
    pub description: String,
}

/// `GarmentSynthesizer` replaying a queue of outcomes. Once the queue is
/// drained it keeps echoing the person frame.
#[derive(Debug, Default)]
pub struct MockSynthesizer {
    outcomes: Mutex<VecDeque<SynthesisOutcome>>,
    calls: Mutex<Vec<RecordedSynthesis>>,
}

impl MockSynthesizer {
    #[must_use]
    pub fn new(outcomes: impl IntoIterator<Item = SynthesisOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::default(),
        }
    }

    #[must_use]
    pub fn echo() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedSynthesis> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GarmentSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<ImageAsset, SynthesisError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedSynthesis {
                category: request.category,
                region: request.region,
                person_dimensions: request.person.dimensions(),
                description: request.description.clone(),
            });
        }
        let outcome = self
            .outcomes
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(SynthesisOutcome::Echo);

        match outcome {
            SynthesisOutcome::Succeed(image) => Ok(image),
            SynthesisOutcome::Echo => Ok(request.person.clone()),
            SynthesisOutcome::Fail(kind) => Err(kind.to_error()),
            SynthesisOutcome::Hang => std::future::pending().await,
        }
    }
}
