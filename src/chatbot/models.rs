//! Process-wide model handles, created on first use.
use super::llm::LanguageModel;
use super::similarity::{EmbeddingSimilarity, JaccardSimilarity, Similarity};
use crate::config::ChatbotConfig;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

pub struct ChatModels {
    config: ChatbotConfig,
    language_model: OnceCell<Option<Arc<LanguageModel>>>,
    similarity: OnceCell<Arc<dyn Similarity>>,
}

impl ChatModels {
    pub fn new(config: ChatbotConfig) -> Self {
        Self {
            config,
            language_model: OnceCell::new(),
            similarity: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ChatbotConfig {
        &self.config
    }

    /// `None` when no API key is configured.
    pub async fn language_model(&self) -> Option<Arc<LanguageModel>> {
        self.language_model
            .get_or_init(|| async {
                if self.config.llm_api_key.trim().is_empty() {
                    warn!("{:<12} --> No LLM_API_KEY, model fallback disabled", "Chatbot");
                    return None;
                }
                info!("{:<12} --> Language model {}", "Chatbot", self.config.llm_model);
                Some(Arc::new(LanguageModel::new(
                    self.config.llm_api_url.clone(),
                    self.config.llm_api_key.clone(),
                    self.config.llm_model.clone(),
                )))
            })
            .await
            .clone()
    }

    /// Embeddings when an endpoint is configured, word overlap otherwise.
    pub async fn similarity(&self) -> Arc<dyn Similarity> {
        self.similarity
            .get_or_init(|| async {
                match &self.config.embedding_api_url {
                    Some(url) => {
                        info!("{:<12} --> Embeddings from {}", "Chatbot", url);
                        Arc::new(EmbeddingSimilarity::new(
                            url.clone(),
                            self.config.embedding_api_key.clone(),
                            self.config.embedding_model.clone(),
                        )) as Arc<dyn Similarity>
                    }
                    None => Arc::new(JaccardSimilarity) as Arc<dyn Similarity>,
                }
            })
            .await
            .clone()
    }

    pub async fn is_available(&self) -> bool {
        self.language_model().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_means_no_model() {
        let models = ChatModels::new(ChatbotConfig::default());
        assert!(!models.is_available().await);
        assert_eq!(models.similarity().await.similarity("place bid", "place bid").await, 1.0);
    }

    #[tokio::test]
    async fn test_model_is_created_once() {
        let config = ChatbotConfig {
            llm_api_key: "key".to_string(),
            ..ChatbotConfig::default()
        };
        let models = ChatModels::new(config);
        let first = models.language_model().await.unwrap();
        let second = models.language_model().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
