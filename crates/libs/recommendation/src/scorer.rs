use async_trait::async_trait;
use common_types::GarmentItem;
use language_model::{LlmClient, LlmError, extract_json_object};
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("style scoring request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("style scorer returned an unusable answer: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait StyleScorer: Send + Sync {
    /// One score in `[0, 1]` per item, in the order of `items`.
    async fn score(&self, preference: &str, items: &[&GarmentItem]) -> Result<Vec<f32>, ScoreError>;
}

/// Share of the preference's terms that also describe the item.
///
/// Latin text is split into lowercase words. Runs of CJK characters become
/// overlapping bigrams, so "休闲风格" matches a "休闲" tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordScorer;

impl KeywordScorer {
    #[must_use]
    pub fn score_item(preference: &str, item: &GarmentItem) -> f32 {
        let wanted = terms(preference);
        if wanted.is_empty() {
            return 0.0;
        }
        let mut described = terms(&item.name);
        for tag in &item.style_tags {
            described.extend(terms(tag));
        }
        let hits = wanted.intersection(&described).count();
        hits as f32 / wanted.len() as f32
    }
}

#[async_trait]
impl StyleScorer for KeywordScorer {
    async fn score(&self, preference: &str, items: &[&GarmentItem]) -> Result<Vec<f32>, ScoreError> {
        Ok(items
            .iter()
            .map(|item| Self::score_item(preference, item))
            .collect())
    }
}

const fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}')
}

fn terms(text: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut word = String::new();
    let mut cjk_run: Vec<char> = Vec::new();

    let flush_cjk = |run: &mut Vec<char>, out: &mut HashSet<String>| {
        match run.len() {
            0 => {}
            1 => {
                out.insert(run[0].to_string());
            }
            _ => {
                for pair in run.windows(2) {
                    out.insert(pair.iter().collect());
                }
            }
        }
        run.clear();
    };

    for c in text.chars() {
        if is_cjk(c) {
            if !word.is_empty() {
                out.insert(std::mem::take(&mut word));
            }
            cjk_run.push(c);
        } else if c.is_alphanumeric() {
            flush_cjk(&mut cjk_run, &mut out);
            word.extend(c.to_lowercase());
        } else {
            flush_cjk(&mut cjk_run, &mut out);
            if !word.is_empty() {
                out.insert(std::mem::take(&mut word));
            }
        }
    }
    flush_cjk(&mut cjk_run, &mut out);
    if !word.is_empty() {
        out.insert(word);
    }
    out
}

const SCORE_PROMPT: &str = "You are a fashion stylist. Rate how well each garment matches \
the customer's style preference, from 0 (not at all) to 1 (perfect match). \
Answer with one score per garment id.";

#[derive(Deserialize)]
struct ScoreAnswer {
    scores: Vec<ItemScore>,
}

#[derive(Deserialize)]
struct ItemScore {
    id: String,
    score: f32,
}

/// `StyleScorer` asking a chat model to rate the items.
pub struct LlmStyleScorer {
    client: LlmClient,
}

impl LlmStyleScorer {
    #[must_use]
    pub const fn new(client: LlmClient) -> Self {
        Self { client }
    }

    fn prompt(preference: &str, items: &[&GarmentItem]) -> String {
        let garments: Vec<_> = items
            .iter()
            .map(|item| {
                json!({
                    "id": item.id,
                    "name": item.name,
                    "category": item.category.to_string(),
                    "style": item.style_tags,
                })
            })
            .collect();
        format!(
            "{SCORE_PROMPT}\n\nStyle preference: {preference}\n\nGarments:\n{}",
            serde_json::Value::Array(garments)
        )
    }

    fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "scores": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "score": { "type": "number", "minimum": 0, "maximum": 1 }
                        },
                        "required": ["id", "score"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["scores"],
            "additionalProperties": false
        })
    }
}

#[async_trait]
impl StyleScorer for LlmStyleScorer {
    async fn score(&self, preference: &str, items: &[&GarmentItem]) -> Result<Vec<f32>, ScoreError> {
        if items.is_empty() {
            return Ok(vec![]);
        }
        let answer = self
            .client
            .chat(&Self::prompt(preference, items))
            .schema(Self::schema())
            .call()
            .await?;
        debug!("Style scorer answered for {} items", items.len());
        parse_scores(&answer, items)
    }
}

/// Items the model skipped score 0.
fn parse_scores(answer: &str, items: &[&GarmentItem]) -> Result<Vec<f32>, ScoreError> {
    let json = extract_json_object(answer)
        .ok_or_else(|| ScoreError::Malformed("no JSON object in answer".to_owned()))?;
    let parsed: ScoreAnswer =
        serde_json::from_str(json).map_err(|e| ScoreError::Malformed(e.to_string()))?;
    let by_id: HashMap<_, _> = parsed
        .scores
        .into_iter()
        .map(|s| (s.id, s.score))
        .collect();
    Ok(items
        .iter()
        .map(|item| {
            by_id
                .get(&item.id)
                .copied()
                .filter(|s| s.is_finite())
                .map_or(0.0, |s| s.clamp(0.0, 1.0))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::{GarmentCategory, Gender, HeightRange};

    fn item(id: &str, name: &str, tags: &[&str]) -> GarmentItem {
        GarmentItem {
            id: id.to_owned(),
            name: name.to_owned(),
            category: GarmentCategory::UpperBody.into(),
            gender_tag: Gender::Neutral,
            height_range: HeightRange::new(150.0, 190.0).expect("ordered"),
            style_tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            image_url: None,
        }
    }

    #[test]
    fn words_overlap() {
        let shirt = item("1", "Linen shirt", &["casual", "summer"]);
        assert!((KeywordScorer::score_item("Casual summer look", &shirt) - 2.0 / 3.0).abs() < 1e-6);
        assert!(KeywordScorer::score_item("formal", &shirt).abs() < f32::EPSILON);
    }

    #[test]
    fn cjk_bigrams_overlap() {
        let shirt = item("1", "衬衫", &["休闲"]);
        // 休闲风格 -> 休闲, 闲风, 风格
        let score = KeywordScorer::score_item("休闲风格", &shirt);
        assert!((score - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn model_scores_follow_item_order() -> Result<(), ScoreError> {
        let a = item("a", "A", &[]);
        let b = item("b", "B", &[]);
        let c = item("c", "C", &[]);
        let scores = parse_scores(
            r#"{"scores": [{"id": "b", "score": 0.9}, {"id": "a", "score": 1.7}]}"#,
            &[&a, &b, &c],
        )?;
        assert_eq!(scores, vec![1.0, 0.9, 0.0]);
        Ok(())
    }

    #[test]
    fn unparseable_model_answer_is_malformed() {
        let a = item("a", "A", &[]);
        assert!(matches!(
            parse_scores("I like all of them", &[&a]),
            Err(ScoreError::Malformed(_))
        ));
    }
}
