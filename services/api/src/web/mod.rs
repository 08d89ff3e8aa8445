pub mod auth;
pub mod envelope;
pub mod middleware;
pub mod rest;
pub mod routes;
pub mod state;

pub use middleware::require_auth;
pub use rest::{evaluate_answer_handler, generate_flashcards_handler, transcribe_audio_handler};
pub use routes::build_router;
