//! services/api/src/services/flashcards.rs
//!
//! Flashcard generation: prompt the model, parse its reply, and remember the result
//! for identical input text.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use study_cards_core::domain::Flashcard;
use study_cards_core::flashcards::{flashcard_prompt, parse_flashcards, truncate_cards};
use study_cards_core::ports::{PortError, TextGenerationService};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum FlashcardError {
    #[error("Please enter study notes.")]
    EmptyInput,
    #[error("Text generation provider is not configured.")]
    ProviderUnavailable,
    #[error("Error: {0}")]
    Provider(#[from] PortError),
    #[error("No flashcards found. Try different input.")]
    NoCardsFound,
}

//=========================================================================================
// FlashcardCache
//=========================================================================================

/// Generated batches keyed by the exact input text.
///
/// Unbounded unless a capacity is given, in which case the oldest inserted key
/// is evicted first. Re-inserting an existing key replaces its cards in place.
pub struct FlashcardCache {
    capacity: Option<usize>,
    inner: RwLock<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, Vec<Flashcard>>,
    insertion_order: VecDeque<String>,
}

impl FlashcardCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            capacity: capacity.filter(|c| *c > 0),
            inner: RwLock::new(CacheInner::default()),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub async fn get(&self, text: &str) -> Option<Vec<Flashcard>> {
        self.inner.read().await.entries.get(text).cloned()
    }

    pub async fn insert(&self, text: String, cards: Vec<Flashcard>) {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.entries.get_mut(&text) {
            *existing = cards;
            return;
        }

        if let Some(capacity) = self.capacity {
            while inner.entries.len() >= capacity {
                let Some(oldest) = inner.insertion_order.pop_front() else {
                    break;
                };
                inner.entries.remove(&oldest);
            }
        }
        inner.insertion_order.push_back(text.clone());
        inner.entries.insert(text, cards);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

//=========================================================================================
// FlashcardService
//=========================================================================================

pub struct FlashcardService {
    llm: Option<Arc<dyn TextGenerationService>>,
    cache: FlashcardCache,
}

impl FlashcardService {
    /// `llm` is `None` when the provider could not be set up at startup.
    pub fn new(llm: Option<Arc<dyn TextGenerationService>>, cache: FlashcardCache) -> Self {
        Self { llm, cache }
    }

    /// Returns cards for `text`, keeping at most `count` of them when `count` is positive.
    pub async fn generate(
        &self,
        text: &str,
        count: Option<usize>,
    ) -> Result<Vec<Flashcard>, FlashcardError> {
        if text.trim().is_empty() {
            return Err(FlashcardError::EmptyInput);
        }
        let llm = self
            .llm
            .as_ref()
            .ok_or(FlashcardError::ProviderUnavailable)?;

        let cards = match self.cache.get(text).await {
            Some(cards) => {
                debug!(cards = cards.len(), "Flashcard cache hit");
                cards
            }
            None => {
                let reply = llm
                    .generate_text(&flashcard_prompt(text))
                    .await
                    .map_err(|e| {
                        error!("Flashcard generation failed: {}", e);
                        FlashcardError::Provider(e)
                    })?;

                let cards = parse_flashcards(&reply);
                if cards.is_empty() {
                    info!(reply_chars = reply.len(), "LLM reply contained no flashcards");
                    return Err(FlashcardError::NoCardsFound);
                }
                self.cache.insert(text.to_string(), cards.clone()).await;
                cards
            }
        };

        Ok(truncate_cards(cards, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;

    const FIVE_CARDS: &str = "Question: What is photosynthesis?\nAnswer: Turning light into chemical energy.\n\
Question: Where does it happen?\nAnswer: In the chloroplasts.\n\
Question: What gas is absorbed?\nAnswer: Carbon dioxide.\n\
Question: What gas is released?\nAnswer: Oxygen gas.\n\
Question: What pigment is involved?\nAnswer: Chlorophyll.";

    fn service_with(llm: &Arc<ScriptedLlm>) -> FlashcardService {
        FlashcardService::new(Some(llm.clone()), FlashcardCache::unbounded())
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_the_provider() {
        let llm = Arc::new(ScriptedLlm::replying(FIVE_CARDS));
        let service = service_with(&llm);

        let err = service.generate("   \n", Some(5)).await.unwrap_err();

        assert!(matches!(err, FlashcardError::EmptyInput));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn missing_provider_is_reported() {
        let service = FlashcardService::new(None, FlashcardCache::unbounded());
        let err = service.generate("Plants need light.", Some(5)).await.unwrap_err();
        assert!(matches!(err, FlashcardError::ProviderUnavailable));
    }

    #[tokio::test]
    async fn prompt_carries_the_input_text() {
        let llm = Arc::new(ScriptedLlm::replying(FIVE_CARDS));
        let service = service_with(&llm);

        service.generate("Plants need light.", None).await.unwrap();

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.ends_with("Content:\nPlants need light."));
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let llm = Arc::new(ScriptedLlm::replying(FIVE_CARDS));
        let service = service_with(&llm);

        let first = service.generate("same text", Some(5)).await.unwrap();
        let second = service.generate("same text", Some(5)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn cache_key_is_the_exact_text() {
        let llm = Arc::new(ScriptedLlm::replying(FIVE_CARDS));
        let service = service_with(&llm);

        service.generate("same text", None).await.unwrap();
        service.generate("same text ", None).await.unwrap();
        service.generate("Same text", None).await.unwrap();

        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn count_limits_the_result_but_not_the_cache() {
        let llm = Arc::new(ScriptedLlm::replying(FIVE_CARDS));
        let service = service_with(&llm);

        let two = service.generate("notes", Some(2)).await.unwrap();
        assert_eq!(two.len(), 2);
        assert_eq!(two[1].id, 2);

        let all = service.generate("notes", Some(0)).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn unparsable_reply_is_no_cards_found_and_not_cached() {
        let llm = Arc::new(ScriptedLlm::replying("Sorry, I can't do that."));
        let service = service_with(&llm);

        let err = service.generate("notes", Some(5)).await.unwrap_err();
        assert!(matches!(err, FlashcardError::NoCardsFound));

        service.generate("notes", Some(5)).await.unwrap_err();
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn provider_failure_is_surfaced() {
        let llm = Arc::new(ScriptedLlm::failing());
        let service = service_with(&llm);

        let err = service.generate("notes", Some(5)).await.unwrap_err();

        assert!(matches!(err, FlashcardError::Provider(PortError::Network(_))));
        assert!(err.to_string().starts_with("Error: "));
    }

    #[tokio::test]
    async fn bounded_cache_evicts_oldest_entry() {
        let cache = FlashcardCache::new(Some(2));
        let card = Flashcard {
            id: 1,
            question: "What is a cell?".to_string(),
            answer: "The basic unit of life.".to_string(),
        };

        cache.insert("a".to_string(), vec![card.clone()]).await;
        cache.insert("b".to_string(), vec![card.clone()]).await;
        cache.insert("a".to_string(), vec![card.clone()]).await;
        assert_eq!(cache.len().await, 2);

        cache.insert("c".to_string(), vec![card]).await;
        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());
        assert!(cache.get("c").await.is_some());
    }
}
