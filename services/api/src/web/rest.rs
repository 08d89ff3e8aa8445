//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the study endpoints (flashcards, transcription,
//! answer evaluation) and the master definition for the OpenAPI specification.

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use study_cards_core::domain::{Flashcard, SessionUser};
use study_cards_core::flashcards::DEFAULT_CARD_COUNT;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::services::FlashcardError;
use crate::web::{
    auth::{LoginRequest, MeResponse, RegisterRequest, UserDto},
    envelope::{ErrorEnvelope, ErrorResponse, StatusResponse, STATUS_SUCCESS},
    state::AppState,
};

/// Name of the multipart part carrying the recording.
pub const AUDIO_FIELD: &str = "audio";

const NO_AUDIO_MESSAGE: &str = "No audio uploaded";

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        crate::web::auth::me_handler,
        generate_flashcards_handler,
        transcribe_audio_handler,
        evaluate_answer_handler,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, UserDto, MeResponse, StatusResponse, ErrorResponse,
            GenerateFlashcardsRequest, GenerateFlashcardsResponse, FlashcardDto,
            TranscriptResponse, EvaluateAnswerRequest, EvaluateAnswerResponse
        )
    ),
    tags(
        (name = "Study Cards API", description = "Flashcard generation, transcription and answer grading.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FlashcardDto {
    pub id: usize,
    pub question: String,
    pub answer: String,
}

impl From<Flashcard> for FlashcardDto {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            question: card.question,
            answer: card.answer,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateFlashcardsRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Maximum number of cards to return; only positive integers are honored.
    /// An absent field means 5, an explicit `null` means no limit.
    #[serde(default = "default_count")]
    #[schema(value_type = Option<u32>, default = 5)]
    pub count: Value,
}

fn default_count() -> Value {
    Value::from(DEFAULT_CARD_COUNT)
}

#[derive(Serialize, ToSchema)]
pub struct GenerateFlashcardsResponse {
    pub status: String,
    pub flashcards: Vec<FlashcardDto>,
}

#[derive(Serialize, ToSchema)]
pub struct TranscriptResponse {
    pub status: String,
    pub transcript: String,
}

#[derive(Deserialize, ToSchema)]
pub struct EvaluateAnswerRequest {
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EvaluateAnswerResponse {
    pub correct: bool,
}

/// Anything but a positive integer means "all cards".
fn requested_count(count: &Value) -> Option<usize> {
    count
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate flashcards from study notes.
///
/// Requires a valid session cookie.
#[utoipa::path(
    post,
    path = "/api/generate_flashcards",
    request_body = GenerateFlashcardsRequest,
    responses(
        (status = 200, description = "Flashcards generated", body = GenerateFlashcardsResponse),
        (status = 400, description = "Empty or unreadable input, provider failure or nothing parsable", body = ErrorResponse),
        (status = 401, description = "Login required", body = ErrorResponse)
    )
)]
pub async fn generate_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    body: Result<Json<GenerateFlashcardsRequest>, JsonRejection>,
) -> Result<Json<GenerateFlashcardsResponse>, ErrorEnvelope> {
    let Json(req) = body.map_err(|rejection| {
        warn!("Rejected flashcard request body: {}", rejection.body_text());
        ErrorEnvelope::bad_request(FlashcardError::EmptyInput.to_string()).with_empty_flashcards()
    })?;

    let text = req.text.as_deref().unwrap_or_default().trim();
    let count = requested_count(&req.count);
    info!(user_id = %user.user_id, text_chars = text.len(), ?count, "Generating flashcards");

    let cards = state
        .flashcards
        .generate(text, count)
        .await
        .map_err(|e| ErrorEnvelope::bad_request(e.to_string()).with_empty_flashcards())?;

    Ok(Json(GenerateFlashcardsResponse {
        status: STATUS_SUCCESS.to_string(),
        flashcards: cards.into_iter().map(FlashcardDto::from).collect(),
    }))
}

/// Transcribe an uploaded recording.
///
/// Accepts a multipart/form-data request with an `audio` file part.
#[utoipa::path(
    post,
    path = "/api/transcribe_audio",
    request_body(content_type = "multipart/form-data", description = "The recording, in a part named `audio`."),
    responses(
        (status = 200, description = "Transcript produced", body = TranscriptResponse),
        (status = 400, description = "No audio uploaded or transcription failed", body = ErrorResponse)
    )
)]
pub async fn transcribe_audio_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscriptResponse>, ErrorEnvelope> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Rejected upload: {}", rejection.body_text());
        ErrorEnvelope::bad_request(NO_AUDIO_MESSAGE)
    })?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Failed to read multipart data: {}", e);
        ErrorEnvelope::bad_request(format!("Failed to read multipart data: {}", e))
    })? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map_err(|e| {
            ErrorEnvelope::bad_request(format!("Failed to read audio bytes: {}", e))
        })?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| ErrorEnvelope::bad_request(NO_AUDIO_MESSAGE))?;

    let transcript = state
        .transcription
        .transcribe(&data, file_name.as_deref())
        .await
        .map_err(|e| ErrorEnvelope::bad_request(e.to_string()))?;

    Ok(Json(TranscriptResponse {
        status: STATUS_SUCCESS.to_string(),
        transcript,
    }))
}

/// Grade a typed answer against the expected one.
#[utoipa::path(
    post,
    path = "/api/evaluate_answer",
    request_body = EvaluateAnswerRequest,
    responses(
        (status = 200, description = "Verdict; false on empty or unreadable input or provider failure", body = EvaluateAnswerResponse)
    )
)]
pub async fn evaluate_answer_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EvaluateAnswerRequest>, JsonRejection>,
) -> Json<EvaluateAnswerResponse> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            warn!("Rejected evaluation body: {}", rejection.body_text());
            return Json(EvaluateAnswerResponse { correct: false });
        }
    };

    let correct = state
        .evaluation
        .evaluate(
            req.user_answer.as_deref().unwrap_or_default().trim(),
            req.correct_answer.as_deref().unwrap_or_default().trim(),
        )
        .await;
    Json(EvaluateAnswerResponse { correct })
}
