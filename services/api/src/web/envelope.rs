//! services/api/src/web/envelope.rs
//!
//! The uniform JSON envelope every endpoint answers with:
//! `{"status": "success" | "error", ...payload}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::web::rest::FlashcardDto;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Body of endpoints whose only payload is the status.
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
        }
    }
}

/// Body of every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    /// Present (and empty) on flashcard generation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashcards: Option<Vec<FlashcardDto>>,
}

/// A failed request: HTTP status plus the error envelope.
#[derive(Debug)]
pub struct ErrorEnvelope {
    code: StatusCode,
    body: ErrorResponse,
}

impl ErrorEnvelope {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            body: ErrorResponse {
                status: STATUS_ERROR.to_string(),
                message: message.into(),
                flashcards: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Adds the empty `flashcards` list the generation endpoint promises on failure.
    pub fn with_empty_flashcards(mut self) -> Self {
        self.body.flashcards = Some(Vec::new());
        self
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (self.code, Json(self.body)).into_response()
    }
}
