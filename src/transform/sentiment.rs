//! Sentiment scoring.
//!
//! Scores the polarity of `text` and of the quoted record's text
//! independently, each in `[-1.0, 1.0]`, using a fixed valence
//! lexicon. No example of a quoted record being optional exists in the
//! source procedures, so an absent `quoted_status` is fatal to the
//! worker rather than filtered.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::json;

use crate::error::{Result, ShardmillError};
use crate::record::Record;

use super::{Outcome, Transform};

/// Valence lexicon on a [-4, 4] scale, AFINN style.
const VALENCE: &[(&str, f64)] = &[
    ("amazing", 4.0),
    ("awesome", 4.0),
    ("best", 3.0),
    ("breakthrough", 3.0),
    ("brilliant", 4.0),
    ("cool", 1.0),
    ("excellent", 3.0),
    ("excited", 3.0),
    ("exciting", 3.0),
    ("good", 3.0),
    ("great", 3.0),
    ("happy", 3.0),
    ("impressive", 3.0),
    ("improve", 2.0),
    ("innovative", 2.0),
    ("interesting", 2.0),
    ("like", 2.0),
    ("love", 3.0),
    ("nice", 3.0),
    ("powerful", 2.0),
    ("promising", 2.0),
    ("smart", 1.0),
    ("success", 2.0),
    ("useful", 2.0),
    ("win", 4.0),
    ("wins", 4.0),
    ("angry", -3.0),
    ("awful", -3.0),
    ("bad", -3.0),
    ("boring", -3.0),
    ("broken", -1.0),
    ("creepy", -2.0),
    ("disappointing", -2.0),
    ("fail", -2.0),
    ("failure", -2.0),
    ("fear", -2.0),
    ("hate", -3.0),
    ("hype", -1.0),
    ("problem", -2.0),
    ("risk", -2.0),
    ("sad", -2.0),
    ("scam", -2.0),
    ("scary", -2.0),
    ("terrible", -3.0),
    ("threat", -2.0),
    ("useless", -2.0),
    ("worst", -3.0),
    ("wrong", -2.0),
];

fn lexicon() -> &'static HashMap<&'static str, f64> {
    static LEXICON: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    LEXICON.get_or_init(|| VALENCE.iter().copied().collect())
}

/// Polarity of a text in `[-1.0, 1.0]`: mean valence of the scored
/// words, rescaled from the lexicon's [-4, 4] range. Text with no
/// scored words is neutral.
pub fn polarity(text: &str) -> f64 {
    let lexicon = lexicon();
    let mut sum = 0.0;
    let mut scored = 0usize;
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if let Some(valence) = lexicon.get(word.to_lowercase().as_str()) {
            sum += valence;
            scored += 1;
        }
    }
    if scored == 0 {
        return 0.0;
    }
    (sum / (4.0 * scored as f64)).clamp(-1.0, 1.0)
}

/// Emits polarity scores for a record's text and its quoted text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScore;

impl Transform for SentimentScore {
    fn name(&self) -> &'static str {
        "score_sentiment"
    }

    fn projection(&self) -> Option<Vec<String>> {
        Some(vec![
            "id".to_string(),
            "user.id".to_string(),
            "text".to_string(),
            "quoted_status.text".to_string(),
            "quoted_status.user.id".to_string(),
        ])
    }

    fn required_paths(&self) -> Vec<String> {
        vec![
            "id".to_string(),
            "user.id".to_string(),
            "text".to_string(),
            "quoted_status.text".to_string(),
        ]
    }

    fn apply(&self, record: &Record) -> Result<Outcome> {
        let id = record.id_at("id")?;
        let user_id = record.id_at("user.id")?;
        let text = record
            .str_at("text")
            .ok_or_else(|| ShardmillError::malformed("text is not a string"))?;
        let quoted_text = record
            .str_at("quoted_status.text")
            .ok_or_else(|| ShardmillError::malformed("quoted_status.text is not a string"))?;
        let quoted_user_id = record.i64_at("quoted_status.user.id");

        Ok(Outcome::Emit(json!({
            "id": id,
            "user_id": user_id,
            "text_polarity": polarity(text),
            "quoted_polarity": polarity(quoted_text),
            "quoted_user_id": quoted_user_id,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_polarity_sign_and_range() {
        let positive = polarity("what an amazing, brilliant breakthrough");
        let negative = polarity("terrible awful failure");
        let neutral = polarity("the quarterly report is attached");
        assert!(positive > 0.0 && positive <= 1.0);
        assert!(negative < 0.0 && negative >= -1.0);
        assert_eq!(neutral, 0.0);
    }

    #[test]
    fn test_polarity_is_case_insensitive() {
        assert_eq!(polarity("GREAT"), polarity("great"));
    }

    #[test]
    fn test_scores_text_and_quote_independently() {
        let record = Record::new(json!({
            "id": 1,
            "user": {"id": 2},
            "text": "love this",
            "quoted_status": {"text": "worst idea", "user": {"id": 3}},
        }));
        match SentimentScore.apply(&record).unwrap() {
            Outcome::Emit(value) => {
                assert!(value["text_polarity"].as_f64().unwrap() > 0.0);
                assert!(value["quoted_polarity"].as_f64().unwrap() < 0.0);
                assert_eq!(value["quoted_user_id"], json!(3));
            }
            Outcome::Filtered => panic!("expected an emitted record"),
        }
    }

    #[test]
    fn test_missing_quote_is_fatal_policy() {
        use super::super::FieldPolicy;
        assert_eq!(SentimentScore.missing_field_policy(), FieldPolicy::Fatal);
    }
}
