//! Intent matching over a table of categories.
//!
//! For every example, in table order: an exact match (case-insensitive,
//! trimmed) scores 1.0 and ends the search; containment either way scores
//! 0.8; otherwise the similarity of the preprocessed texts is used. The best
//! category wins only when its score is strictly above the threshold.
use super::similarity::Similarity;
use super::text::preprocess;
use rand::seq::SliceRandom;
use serde::Serialize;

pub const EXACT_SCORE: f64 = 1.0;
pub const CONTAINS_SCORE: f64 = 0.8;

/// A category with example phrases and candidate answers.
pub trait Intent {
    fn category(&self) -> &str;
    fn examples(&self) -> Vec<&str>;
    fn responses(&self) -> Vec<&str>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub index: Option<usize>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentMatch {
    pub category: String,
    pub response: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct IntentMatcher {
    pub threshold: f64,
}

impl IntentMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub async fn score<I: Intent + Sync>(
        &self,
        similarity: &dyn Similarity,
        input: &str,
        intents: &[I],
    ) -> MatchScore {
        let lowered = input.trim().to_lowercase();
        let processed = preprocess(input);
        let mut best = MatchScore {
            index: None,
            score: 0.0,
        };

        'search: for (index, intent) in intents.iter().enumerate() {
            for example in intent.examples() {
                let example_lowered = example.trim().to_lowercase();
                if lowered == example_lowered {
                    best = MatchScore {
                        index: Some(index),
                        score: EXACT_SCORE,
                    };
                    break 'search;
                }

                let contains = !example_lowered.is_empty()
                    && (lowered.contains(&example_lowered) || example_lowered.contains(&lowered));
                if contains && CONTAINS_SCORE > best.score {
                    best = MatchScore {
                        index: Some(index),
                        score: CONTAINS_SCORE,
                    };
                }

                let score = similarity
                    .similarity(&processed, &preprocess(example))
                    .await;
                if score > best.score {
                    best = MatchScore {
                        index: Some(index),
                        score,
                    };
                }
            }
        }
        best
    }

    /// Best category above the threshold with one of its responses picked at random.
    pub async fn find<I: Intent + Sync>(
        &self,
        similarity: &dyn Similarity,
        input: &str,
        intents: &[I],
    ) -> Option<IntentMatch> {
        let best = self.score(similarity, input, intents).await;
        if best.score <= self.threshold {
            return None;
        }
        let intent = intents.get(best.index?)?;
        let response = intent.responses().choose(&mut rand::thread_rng())?.to_string();
        Some(IntentMatch {
            category: intent.category().to_string(),
            response,
            confidence: best.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chatbot::knowledge_base::{StaticIntent, KNOWLEDGE_BASE_AR, KNOWLEDGE_BASE_EN};
    use crate::chatbot::similarity::JaccardSimilarity;

    fn matcher() -> IntentMatcher {
        IntentMatcher::new(0.4)
    }

    #[tokio::test]
    async fn test_verbatim_example_returns_its_category() {
        for table in [KNOWLEDGE_BASE_AR, KNOWLEDGE_BASE_EN] {
            for intent in table {
                for example in intent.examples {
                    let found = matcher()
                        .find(&JaccardSimilarity, example, table)
                        .await
                        .unwrap();
                    assert_eq!(found.category, intent.category, "{}", example);
                    assert_eq!(found.confidence, EXACT_SCORE);
                    assert!(intent.responses.contains(&found.response.as_str()));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_exact_match_ignores_case_and_padding() {
        let found = matcher()
            .find(&JaccardSimilarity, "  PLACE BID ", KNOWLEDGE_BASE_EN)
            .await
            .unwrap();
        assert_eq!(found.category, "bidding");
    }

    #[tokio::test]
    async fn test_containment_scores_point_eight() {
        let found = matcher()
            .find(&JaccardSimilarity, "show me current auctions now", KNOWLEDGE_BASE_EN)
            .await
            .unwrap();
        assert_eq!(found.category, "auctions");
        assert_eq!(found.confidence, CONTAINS_SCORE);
    }

    #[tokio::test]
    async fn test_threshold_is_strict() {
        let strict = IntentMatcher::new(CONTAINS_SCORE);
        let found = strict
            .find(&JaccardSimilarity, "show me current auctions now", KNOWLEDGE_BASE_EN)
            .await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_unrelated_input_has_no_match() {
        let found = matcher()
            .find(&JaccardSimilarity, "zzz qqq", KNOWLEDGE_BASE_EN)
            .await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_exact_match_beats_earlier_full_overlap() {
        let intents = [
            StaticIntent {
                category: "first",
                examples: &["bid place"],
                responses: &["one"],
            },
            StaticIntent {
                category: "second",
                examples: &["place bid"],
                responses: &["two"],
            },
        ];
        let found = matcher()
            .find(&JaccardSimilarity, "place bid", &intents)
            .await
            .unwrap();
        assert_eq!(found.category, "second");
        assert_eq!(found.response, "two");
    }
}
