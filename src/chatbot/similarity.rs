// region:    --- Imports
use super::text::preprocess;
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;
// endregion: --- Imports

/// Scores how close the user's text `a` is to example `b`, in `[0, 1]`.
#[async_trait]
pub trait Similarity: Send + Sync {
    async fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Token-set overlap of the preprocessed texts.
#[derive(Debug, Default, Clone, Copy)]
pub struct JaccardSimilarity;

impl JaccardSimilarity {
    pub fn score(a: &str, b: &str) -> f64 {
        let a = preprocess(a);
        let b = preprocess(b);
        let left: HashSet<&str> = a.split_whitespace().collect();
        let right: HashSet<&str> = b.split_whitespace().collect();
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        let shared = left.intersection(&right).count();
        let total = left.union(&right).count();
        shared as f64 / total as f64
    }
}

#[async_trait]
impl Similarity for JaccardSimilarity {
    async fn similarity(&self, a: &str, b: &str) -> f64 {
        Self::score(a, b)
    }
}

pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

// region:    --- Embeddings

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f64>,
}

/// Reference vectors kept before the cache stops growing.
pub const MAX_REFERENCE_VECTORS: usize = 4096;
const EMBEDDING_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// The user's text; only the latest one is kept.
    Query,
    /// Knowledge-base examples.
    Reference,
}

#[derive(Debug, Default)]
struct VectorCache {
    references: HashMap<String, Vec<f64>>,
    query: Option<(String, Vec<f64>)>,
}

impl VectorCache {
    fn get(&self, role: Role, text: &str) -> Option<Vec<f64>> {
        match role {
            Role::Query => self
                .query
                .as_ref()
                .filter(|(cached, _)| cached == text)
                .map(|(_, vector)| vector.clone()),
            Role::Reference => self.references.get(text).cloned(),
        }
    }

    fn put(&mut self, role: Role, text: &str, vector: Vec<f64>) {
        match role {
            Role::Query => self.query = Some((text.to_string(), vector)),
            Role::Reference => {
                if self.references.len() < MAX_REFERENCE_VECTORS {
                    self.references.insert(text.to_string(), vector);
                }
            }
        }
    }
}

/// Cosine similarity of vectors from an embeddings endpoint
/// (`{"model", "input"}` in, `{"data": [{"embedding"}]}` out).
/// The first argument is the user's text, the second a knowledge-base example.
/// Any failure falls back to [`JaccardSimilarity`].
pub struct EmbeddingSimilarity {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    cache: Mutex<VectorCache>,
}

impl EmbeddingSimilarity {
    pub fn new(url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            api_key,
            model,
            cache: Mutex::new(VectorCache::default()),
        }
    }

    fn cached(&self, role: Role, text: &str) -> Option<Vec<f64>> {
        self.cache.lock().ok()?.get(role, text)
    }

    async fn embed(&self, role: Role, text: &str) -> AppResult<Vec<f64>> {
        if let Some(vector) = self.cached(role, text) {
            return Ok(vector);
        }

        let mut request = self
            .http
            .post(&self.url)
            .timeout(EMBEDDING_TIMEOUT)
            .json(&json!({ "model": self.model, "input": text }));
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::ExternalService(e.to_string()))?;
        let body = response
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;
        let vector = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::ExternalService("empty embedding response".to_string()))?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(role, text, vector.clone());
        }
        Ok(vector)
    }
}

#[async_trait]
impl Similarity for EmbeddingSimilarity {
    async fn similarity(&self, a: &str, b: &str) -> f64 {
        let vectors = match self.embed(Role::Query, a).await {
            Ok(left) => self.embed(Role::Reference, b).await.map(|right| (left, right)),
            Err(e) => Err(e),
        };
        match vectors {
            Ok((left, right)) => cosine(&left, &right).clamp(0.0, 1.0),
            Err(e) => {
                warn!("{:<12} --> Embedding failed, using word overlap: {}", "Chatbot", e);
                JaccardSimilarity::score(a, b)
            }
        }
    }
}

// endregion: --- Embeddings

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard() {
        assert_eq!(JaccardSimilarity::score("place bid", "place bid"), 1.0);
        assert_eq!(JaccardSimilarity::score("bidding process", "payment process"), 1.0 / 3.0);
        assert_eq!(JaccardSimilarity::score("the", "bid"), 0.0);
        assert_eq!(JaccardSimilarity::score("", ""), 0.0);
    }

    #[test]
    fn test_cosine() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_vector_cache_keeps_one_query_and_bounded_references() {
        let mut cache = VectorCache::default();
        cache.put(Role::Query, "first question", vec![1.0]);
        cache.put(Role::Query, "second question", vec![2.0]);
        assert_eq!(cache.get(Role::Query, "first question"), None);
        assert_eq!(cache.get(Role::Query, "second question"), Some(vec![2.0]));
        assert_eq!(cache.get(Role::Reference, "second question"), None);

        for i in 0..MAX_REFERENCE_VECTORS + 10 {
            cache.put(Role::Reference, &format!("example {}", i), vec![i as f64]);
        }
        assert_eq!(cache.references.len(), MAX_REFERENCE_VECTORS);
        assert_eq!(cache.get(Role::Reference, "example 0"), Some(vec![0.0]));
        assert_eq!(
            cache.get(Role::Reference, &format!("example {}", MAX_REFERENCE_VECTORS)),
            None
        );
    }

    #[tokio::test]
    async fn test_unreachable_embeddings_fall_back_to_overlap() {
        let embedder = EmbeddingSimilarity::new(
            "http://127.0.0.1:9/embeddings".to_string(),
            String::new(),
            "test".to_string(),
        );
        let score = embedder.similarity("place bid", "place bid").await;
        assert_eq!(score, 1.0);
    }
}
