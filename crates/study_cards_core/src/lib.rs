pub mod domain;
pub mod evaluation;
pub mod flashcards;
pub mod ports;

pub use domain::{AuthSession, Flashcard, SessionUser, User, UserCredentials};
pub use ports::{
    DatabaseService, PortError, PortResult, SpeechToTextService, TextGenerationService,
};
