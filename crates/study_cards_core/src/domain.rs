//! crates/study_cards_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a registered user - used throughout the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

// Only used internally for login/registration - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// The identity a valid auth session resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
}

/// A single question/answer pair derived from study text.
///
/// `id` is the 1-based ordinal of the card within its generation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub id: usize,
    pub question: String,
    pub answer: String,
}
