//! services/api/src/services/mod.rs
//!
//! Service objects that sit between the web handlers and the core ports. Each one
//! owns its port handles explicitly; there is no module-level client or cache.

pub mod auth;
pub mod evaluation;
pub mod flashcards;
pub mod transcription;

pub use auth::{AuthError, AuthService};
pub use evaluation::EvaluationService;
pub use flashcards::{FlashcardCache, FlashcardError, FlashcardService};
pub use transcription::{TranscriptionError, TranscriptionService};
