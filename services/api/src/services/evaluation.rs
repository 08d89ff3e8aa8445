//! services/api/src/services/evaluation.rs
//!
//! Grades a typed answer by asking the model for a yes/no semantic match.

use std::sync::Arc;
use study_cards_core::evaluation::{evaluation_prompt, is_affirmative};
use study_cards_core::ports::TextGenerationService;
use tracing::warn;

pub struct EvaluationService {
    llm: Option<Arc<dyn TextGenerationService>>,
}

impl EvaluationService {
    pub fn new(llm: Option<Arc<dyn TextGenerationService>>) -> Self {
        Self { llm }
    }

    /// Fails closed: empty input, a missing provider or a provider error all grade as `false`.
    pub async fn evaluate(&self, user_answer: &str, correct_answer: &str) -> bool {
        if user_answer.is_empty() || correct_answer.is_empty() {
            return false;
        }
        let Some(llm) = self.llm.as_ref() else {
            warn!("Answer evaluation requested but no LLM is configured");
            return false;
        };

        match llm
            .generate_text(&evaluation_prompt(user_answer, correct_answer))
            .await
        {
            Ok(reply) => is_affirmative(&reply),
            Err(e) => {
                warn!("Answer evaluation failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;

    #[tokio::test]
    async fn empty_answers_are_wrong_without_asking_the_model() {
        let llm = Arc::new(ScriptedLlm::replying("yes"));
        let service = EvaluationService::new(Some(llm.clone()));

        assert!(!service.evaluate("", "Water").await);
        assert!(!service.evaluate("H2O", "").await);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn yes_reply_grades_as_correct() {
        let llm = Arc::new(ScriptedLlm::replying("Yes."));
        let service = EvaluationService::new(Some(llm.clone()));

        assert!(service.evaluate("H2O", "Water").await);
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Correct Answer: Water"));
        assert!(prompt.contains("User Answer: H2O"));
    }

    #[tokio::test]
    async fn no_reply_grades_as_wrong() {
        let llm = Arc::new(ScriptedLlm::replying("no"));
        let service = EvaluationService::new(Some(llm));
        assert!(!service.evaluate("Fire", "Water").await);
    }

    #[tokio::test]
    async fn provider_errors_fail_closed() {
        let service = EvaluationService::new(Some(Arc::new(ScriptedLlm::failing())));
        assert!(!service.evaluate("H2O", "Water").await);

        let service = EvaluationService::new(None);
        assert!(!service.evaluate("H2O", "Water").await);
    }
}
