pub mod db;
pub mod llm;
pub mod sst;

pub use db::DbAdapter;
pub use llm::OpenAiTextAdapter;
pub use sst::OpenAiSstAdapter;

use async_openai::error::OpenAIError;
use study_cards_core::ports::PortError;

/// Maps a client error onto the port error space, keeping transport failures distinct.
pub(crate) fn provider_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::Reqwest(err) => PortError::Network(err.to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}
