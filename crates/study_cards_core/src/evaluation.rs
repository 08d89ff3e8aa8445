//! crates/study_cards_core/src/evaluation.rs
//!
//! Prompt and verdict rule for checking a typed answer against the expected one.

const PROMPT_TEMPLATE: &str = "You are a smart evaluator. Compare the user's answer to the correct answer.\n\
Correct Answer: {correct}\n\
User Answer: {user}\n\
Is the user's answer semantically correct? Reply only 'yes' or 'no'.";

/// Builds the yes/no semantic-match prompt.
pub fn evaluation_prompt(user_answer: &str, correct_answer: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{correct}", correct_answer)
        .replace("{user}", user_answer)
}

/// Reduces a model reply to a verdict: any occurrence of "yes", in any case, counts.
pub fn is_affirmative(reply: &str) -> bool {
    reply.trim().to_lowercase().contains("yes")
}
