use crate::eligibility::{compare_ids, is_eligible};
use crate::scorer::{KeywordScorer, StyleScorer};
use app_state::RecommendationSettings;
use common_types::{CategoryGroup, GarmentItem, OutfitRecommendation, UserProfile};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Builds outfits out of catalog items that fit a user profile.
#[derive(Clone)]
pub struct Recommender {
    scorer: Option<Arc<dyn StyleScorer>>,
    top_n: usize,
    scored_top_n: usize,
    max_outfits: usize,
}

/// Eligible items split by where they are worn.
#[derive(Default)]
struct Groups<'a> {
    upper: Vec<&'a GarmentItem>,
    lower: Vec<&'a GarmentItem>,
    full: Vec<&'a GarmentItem>,
}

impl<'a> Groups<'a> {
    fn partition(profile: &UserProfile, catalog: &'a [GarmentItem]) -> Self {
        let mut groups = Self::default();
        for item in catalog.iter().filter(|item| is_eligible(item, profile)) {
            match item.category.group() {
                Some(CategoryGroup::UpperBody) => groups.upper.push(item),
                Some(CategoryGroup::LowerBody) => groups.lower.push(item),
                Some(CategoryGroup::FullBody) => groups.full.push(item),
                None => debug!("Skipping item {} with unknown category", item.id),
            }
        }
        groups
    }

    fn is_empty(&self) -> bool {
        self.full.is_empty() && (self.upper.is_empty() || self.lower.is_empty())
    }

    fn all(&self) -> Vec<&'a GarmentItem> {
        self.upper
            .iter()
            .chain(&self.lower)
            .chain(&self.full)
            .copied()
            .collect()
    }

    fn for_each_group(&mut self, mut f: impl FnMut(&mut Vec<&'a GarmentItem>)) {
        f(&mut self.upper);
        f(&mut self.lower);
        f(&mut self.full);
    }

    /// Upper x lower pairs, then every full-body item on its own.
    fn outfits(&self) -> Vec<Vec<&'a GarmentItem>> {
        let pairs = self
            .upper
            .iter()
            .flat_map(|top| self.lower.iter().map(move |bottom| vec![*top, *bottom]));
        let dresses = self.full.iter().map(|dress| vec![*dress]);
        pairs.chain(dresses).collect()
    }
}

fn compare_outfits(a: &[&GarmentItem], b: &[&GarmentItem]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_ids(&x.id, &y.id))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

impl Recommender {
    #[must_use]
    pub fn new(settings: &RecommendationSettings, scorer: Option<Arc<dyn StyleScorer>>) -> Self {
        Self {
            scorer,
            top_n: settings.top_n.max(1),
            scored_top_n: settings.scored_top_n.max(1),
            max_outfits: settings.max_outfits.max(1),
        }
    }

    /// Outfits for `profile`, best first. An empty result means nothing fits.
    #[instrument(skip_all, fields(height = profile.height_cm, gender = ?profile.gender_preference))]
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        catalog: &[GarmentItem],
    ) -> Vec<OutfitRecommendation> {
        let mut groups = Groups::partition(profile, catalog);
        if groups.is_empty() {
            debug!("No eligible combination");
            return vec![];
        }

        let outfits = match profile.style_preference() {
            Some(preference) => self.ranked(preference, groups).await,
            None => {
                let top_n = self.top_n;
                groups.for_each_group(|group| {
                    group.sort_by(|a, b| compare_ids(&a.id, &b.id));
                    group.truncate(top_n);
                });
                let mut outfits = groups.outfits();
                outfits.sort_by(|a, b| compare_outfits(a, b));
                outfits
                    .into_iter()
                    .map(|items| OutfitRecommendation {
                        items: items.into_iter().cloned().collect(),
                        score: None,
                    })
                    .collect()
            }
        };
        outfits.into_iter().take(self.max_outfits).collect()
    }

    async fn ranked(
        &self,
        preference: &str,
        mut groups: Groups<'_>,
    ) -> Vec<OutfitRecommendation> {
        let items = groups.all();
        let scores = self.score(preference, &items).await;
        let score_of: HashMap<&str, f32> = items
            .iter()
            .zip(scores)
            .map(|(item, score)| (item.id.as_str(), score))
            .collect();
        let score = |item: &GarmentItem| score_of.get(item.id.as_str()).copied().unwrap_or(0.0);

        let keep = self.scored_top_n;
        groups.for_each_group(|group| {
            group.sort_by(|a, b| {
                score(*b)
                    .total_cmp(&score(*a))
                    .then_with(|| compare_ids(&a.id, &b.id))
            });
            group.truncate(keep);
        });

        let mut outfits: Vec<_> = groups
            .outfits()
            .into_iter()
            .map(|items| {
                let mean = items.iter().map(|item| score(*item)).sum::<f32>() / items.len() as f32;
                (items, mean)
            })
            .collect();
        outfits.sort_by(|(a, sa), (b, sb)| sb.total_cmp(sa).then_with(|| compare_outfits(a, b)));

        outfits
            .into_iter()
            .map(|(items, mean)| OutfitRecommendation {
                items: items.into_iter().cloned().collect(),
                score: Some(mean),
            })
            .collect()
    }

    async fn score(&self, preference: &str, items: &[&GarmentItem]) -> Vec<f32> {
        if let Some(scorer) = &self.scorer {
            match scorer.score(preference, items).await {
                Ok(scores) if scores.len() == items.len() => return scores,
                Ok(scores) => warn!(
                    "Style scorer returned {} scores for {} items, using keyword overlap",
                    scores.len(),
                    items.len()
                ),
                Err(e) => warn!("Style scorer failed ({e}), using keyword overlap"),
            }
        }
        items
            .iter()
            .map(|item| KeywordScorer::score_item(preference, item))
            .collect()
    }
}
