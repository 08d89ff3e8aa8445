//! crates/study_cards_core/src/flashcards.rs
//!
//! The prompt sent to the generative model and the parser that turns its
//! free-text reply into structured flashcards.

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::Flashcard;

/// Cards whose question or answer is shorter than this (in characters) are dropped.
pub const MIN_FIELD_CHARS: usize = 6;

/// Number of cards returned when a request does not say otherwise.
pub const DEFAULT_CARD_COUNT: usize = 5;

const PROMPT_TEMPLATE: &str = "Generate informative flashcards from this content.\n\
Format each flashcard as:\n\
Question: <question>\nAnswer: <answer>\n\
No other output.\n\n\
Content:\n{text}";

// A new card starts wherever a line begins with a question marker.
static CARD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\nQuestion[:>]").expect("card boundary pattern is valid"));

static CARD_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)Question[:>]\s*(.+?)\s*Answer[:>]\s*(.+)").expect("card pair pattern is valid")
});

/// Builds the generation prompt for a block of study text.
pub fn flashcard_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replace("{text}", text)
}

/// Extracts `Question:`/`Answer:` pairs from a model reply.
///
/// Markers are case-insensitive and may use `>` instead of `:`. Answers may span
/// several lines; they end where the next line opens with a question marker.
/// Ids are assigned 1..n over the cards that survive the length filter.
pub fn parse_flashcards(reply: &str) -> Vec<Flashcard> {
    let reply = reply.trim();

    let mut bounds = vec![0];
    bounds.extend(CARD_BOUNDARY.find_iter(reply).map(|m| m.start()));
    bounds.push(reply.len());

    let mut cards = Vec::new();
    for window in bounds.windows(2) {
        let block = &reply[window[0]..window[1]];
        let Some(caps) = CARD_PAIR.captures(block) else {
            continue;
        };

        let question = caps[1].trim();
        let answer = caps[2].trim();
        if question.chars().count() < MIN_FIELD_CHARS || answer.chars().count() < MIN_FIELD_CHARS {
            continue;
        }

        cards.push(Flashcard {
            id: cards.len() + 1,
            question: question.to_string(),
            answer: answer.to_string(),
        });
    }
    cards
}

/// Keeps at most `count` cards when `count` is a positive number.
pub fn truncate_cards(mut cards: Vec<Flashcard>, count: Option<usize>) -> Vec<Flashcard> {
    if let Some(n) = count.filter(|n| *n > 0) {
        cards.truncate(n);
    }
    cards
}
