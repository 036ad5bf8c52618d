use crate::scorer::{ScoreError, StyleScorer};
use async_trait::async_trait;
use common_types::GarmentItem;
use std::collections::HashMap;

/// `StyleScorer` with fixed answers.
#[derive(Debug, Clone, Default)]
pub struct StaticStyleScorer {
    scores: HashMap<String, f32>,
    default: f32,
    fail: bool,
}

impl StaticStyleScorer {
    /// Every item gets `score`.
    #[must_use]
    pub fn uniform(score: f32) -> Self {
        Self {
            default: score,
            ..Self::default()
        }
    }

    /// Listed ids get their score, the rest 0.
    #[must_use]
    pub fn by_id<'a>(scores: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        Self {
            scores: scores
                .into_iter()
                .map(|(id, score)| (id.to_owned(), score))
                .collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl StyleScorer for StaticStyleScorer {
    async fn score(&self, _preference: &str, items: &[&GarmentItem]) -> Result<Vec<f32>, ScoreError> {
        if self.fail {
            return Err(ScoreError::Malformed("scripted failure".to_owned()));
        }
        Ok(items
            .iter()
            .map(|item| self.scores.get(&item.id).copied().unwrap_or(self.default))
            .collect())
    }
}
